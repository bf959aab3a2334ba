//! This module re-exports a bunch of utilities used across this crate.

#![allow(unused_imports)]

pub use tap::prelude::*;

pub use indexmap::{IndexMap, IndexSet};
pub use itertools::Itertools;
pub use thiserror::Error;

pub use log::debug;
pub use log::error;
pub use log::info;
pub use log::warn;

pub use crate::structs::error::{
	AppError, AppResult, ExecutionError, ExecutionResult, ScriptError, ScriptResult, TokenizeError, TokenizeResult,
};
pub use crate::structs::config::{ScriptSettings, Version};
pub use crate::util::notice::Notice;
pub use crate::util::notice::NoticePreset;

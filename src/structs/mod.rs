//! This is the parent module over the structs shared across Omodcrab, such as *ScriptSettings* or *ScriptReturnData*.

pub mod config;
pub mod error;
pub mod plan;

//! This is the parent module over small utilities that don't belong to any one part of Omodcrab.

pub mod misc;
pub mod notice;

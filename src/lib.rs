//! Omodcrab runs the install scripts that ship inside OBMM's OMOD packages.
//! A script is loaded into a *Script*, then executed against the OMOD's files to build a *ScriptReturnData*,
//! which describes everything the install should do.

pub mod console;
pub mod omod;
pub mod prelude;
pub mod script;
pub mod structs;
pub mod util;

#[cfg(test)]
mod tests;

//! This is the parent module over the OBMM script interpreter.
//! Text goes through the *lexer* and *parser* to become a *Script*, which the *engine* then runs.

pub mod engine;
pub mod expr;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod token;

mod instructions;

pub use engine::{run_script, Completion, ScriptOutcome, ScriptRunner};
pub use functions::{DialogResult, ExternalScriptFunctions, SelectPrompt};
pub use parser::Script;

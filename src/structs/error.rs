//! This module contains the errors used all over this codebase.

use std::{fmt::Display, io};

use crate::prelude::*;

/// Convenience wrapper around *Result<T, AppError>*.
pub type AppResult<T> = Result<T, AppError>;

/// Convenience wrapper around *Result<T, ScriptError>*.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Convenience wrapper around *Result<T, TokenizeError>*.
pub type TokenizeResult<T> = Result<T, TokenizeError>;

/// Convenience wrapper around *Result<T, ExecutionError>*.
pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Error returned by the functions the command line tool runs.
#[derive(Error, Debug)]
pub enum AppError {
	/// Error returned by failing IO operations.
	/// Most of these will occur while reading scripts or scanning extracted folders.
	#[error(transparent)]
	IO(#[from] io::Error),

	/// Error returned when failing to (de)serialize type using Serde and Bincode.
	#[error(transparent)]
	Bincode(#[from] bincode::Error),

	/// Error returned by a failed script run.
	#[error(transparent)]
	Script(#[from] ScriptError),

	/// Custom error that simply wraps a *Notice*.
	#[error("{0}")]
	Custom(Notice),

	/// Error converted from any error that does not have a matching *AppError* variant.
	#[error(transparent)]
	Unknown(#[from] anyhow::Error),
}

/// The typed outcome of a script run that did not finish normally.
/// Normal completion and an early 'Return' are both successes, so they are not listed here.
#[derive(Error, Debug)]
pub enum ScriptError {
	/// The script could not be loaded, so nothing was executed.
	#[error(transparent)]
	Tokenize(#[from] TokenizeError),

	/// The script broke while it was running.
	#[error(transparent)]
	Execution(#[from] ExecutionError),

	/// The script's author aborted the install with 'FatalError'.
	#[error("The script aborted the install with 'FatalError' on line {line}.")]
	Fatal {
		/// The line holding the 'FatalError' statement.
		line: usize,
	},

	/// The user pressed cancel on one of the script's dialogs.
	#[error("The install was cancelled by the user on line {line}.")]
	Cancelled {
		/// The line holding the dialog that was cancelled.
		line: usize,
	},
}

impl ScriptError {
	/// Returns true if this error is an expected outcome rather than a broken script.
	/// Both 'FatalError' and a cancelled dialog count as expected.
	pub fn is_expected(&self) -> bool {
		matches!(self, ScriptError::Fatal { .. } | ScriptError::Cancelled { .. })
	}
}

/// An error found while turning script text into tokens.
/// These are always reported before the script starts running.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
	/// A quoted argument was never closed.
	#[error("Line {line} has an unterminated quote: {text}")]
	UnterminatedQuote { line: usize, text: String },

	/// The first word of a line is not a known statement.
	#[error("Line {line} starts with the unknown statement '{keyword}'.")]
	UnknownKeyword { line: usize, keyword: String },

	/// A statement was given too few or too many arguments.
	#[error("Line {line} passes {found} arguments to '{keyword}', but it expects {}: {text}", describe_arity(.min, .max))]
	WrongArgumentCount {
		line: usize,
		text: String,
		keyword: &'static str,
		min: usize,
		max: Option<usize>,
		found: usize,
	},

	/// An 'If' or 'IfNot' statement names a condition that doesn't exist.
	#[error("Line {line} uses the unknown condition '{condition}'.")]
	UnknownCondition { line: usize, condition: String },

	/// A 'For' statement names a loop kind that doesn't exist.
	#[error("Line {line} uses the unknown loop kind '{kind}'.")]
	UnknownEnumeration { line: usize, kind: String },

	/// A select statement's options don't divide evenly into items, previews, and descriptions.
	#[error("Line {line} has {found} option arguments, which isn't a multiple of {per_option}: {text}")]
	MalformedSelect {
		line: usize,
		text: String,
		per_option: usize,
		found: usize,
	},

	/// A conflict statement has an argument shape that matches none of the supported forms.
	#[error("Line {line} has a conflict declaration with an invalid number of arguments: {text}")]
	MalformedConflict { line: usize, text: String },

	/// A structural statement appears somewhere it cannot be, like an 'EndIf' with no 'If'.
	#[error("Line {line} has a '{keyword}' that is not inside {expected}.")]
	UnexpectedToken {
		line: usize,
		keyword: &'static str,
		expected: &'static str,
	},

	/// A block was opened but never closed.
	#[error("The '{keyword}' on line {line} is never closed.")]
	UnclosedBlock { line: usize, keyword: &'static str },

	/// Two labels share a name.
	#[error("Line {line} declares the label '{label}' a second time.")]
	DuplicateLabel { line: usize, label: String },

	/// A 'Goto' points at a label that doesn't exist.
	#[error("Line {line} jumps to the label '{label}', which doesn't exist.")]
	UnknownLabel { line: usize, label: String },

	/// A 'Goto' points at a label inside a block it is not already in.
	#[error("Line {line} jumps into a block through the label '{label}'.")]
	GotoIntoBlock { line: usize, label: String },
}

/// Builds the human-readable form of a (min, max) argument contract.
fn describe_arity(min: &usize, max: &Option<usize>) -> String {
	match max {
		Some(max) if max == min => format!("exactly {min}"),
		Some(max) => format!("between {min} and {max}"),
		None => format!("at least {min}"),
	}
}

/// The two file sets an OMOD carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
	Data,
	Plugin,
}

impl Display for FileKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			FileKind::Data => write!(f, "data file"),
			FileKind::Plugin => write!(f, "plugin"),
		}
	}
}

/// An error raised while a script is running.
/// Any of these aborts the run, and the partial install plan is thrown away.
#[derive(Error, Debug)]
pub enum ExecutionError {
	/// An argument referenced a variable that was never set.
	#[error("Line {line} references the undefined variable '{name}'.")]
	UndefinedVariable { line: usize, name: String },

	/// A statement named a file that isn't part of the OMOD.
	#[error("Line {line} references the {kind} '{name}', which is not part of this OMOD.")]
	MissingFile { line: usize, kind: FileKind, name: String },

	/// A statement named a folder with no files in the OMOD.
	#[error("Line {line} references the folder '{name}', which holds no files in this OMOD.")]
	MissingFolder { line: usize, name: String },

	/// An argument that should be a number isn't one.
	#[error("Line {line} expected a number, but found '{value}'.")]
	InvalidNumber { line: usize, value: String },

	/// An argument that should be a version isn't one.
	#[error("Line {line} expected a version, but found '{value}'.")]
	InvalidVersion { line: usize, value: String },

	/// An argument is not one of the values its statement accepts.
	#[error("Line {line} expected {expected}, but found '{value}'.")]
	InvalidArgument {
		line: usize,
		value: String,
		expected: &'static str,
	},

	/// An output path tries to leave the game's data folder.
	#[error("Line {line} uses the invalid output path '{path}'.")]
	InvalidPath { line: usize, path: String },

	/// A regex conflict or wildcard pattern does not compile.
	#[error("Line {line} has the invalid pattern '{pattern}': {source}")]
	InvalidPattern {
		line: usize,
		pattern: String,
		source: regex::Error,
	},

	/// An 'iSet' or 'fSet' expression could not be evaluated.
	#[error("Line {line} has an invalid expression '{expression}': {reason}")]
	MalformedExpression {
		line: usize,
		expression: String,
		reason: String,
	},

	/// A string function was given a range outside of its input.
	#[error("Line {line} asks for characters {start}..{end} of a {length} character string.")]
	OutOfRange {
		line: usize,
		start: usize,
		end: usize,
		length: usize,
	},

	/// The host returned an unusable selection.
	#[error("Line {line} received an invalid selection: {reason}")]
	InvalidSelection { line: usize, reason: String },

	/// A structural statement was reached in a state the loader should have ruled out.
	#[error("Line {line} reached '{keyword}' outside of its enclosing block.")]
	BadNesting { line: usize, keyword: &'static str },

	/// The text given to 'ExecLines' failed to tokenize.
	#[error("Line {line} passes lines to 'ExecLines' that fail to load: {source}")]
	Nested { line: usize, source: Box<TokenizeError> },

	/// 'ExecLines' ran 'ExecLines' more times in a row than the engine allows.
	#[error("Line {line} nests 'ExecLines' deeper than {limit} levels.")]
	NestedTooDeep { line: usize, limit: usize },

	/// One of the host's functions failed.
	#[error("Line {line} failed while calling into the host: {source}")]
	Host { line: usize, source: anyhow::Error },

	/// Reading the extracted OMOD folders failed.
	#[error("Line {line} failed to read the extracted files: {source}")]
	IO { line: usize, source: io::Error },
}

impl ExecutionError {
	/// Returns the script line this error points at.
	pub fn line(&self) -> usize {
		match self {
			ExecutionError::UndefinedVariable { line, .. }
			| ExecutionError::MissingFile { line, .. }
			| ExecutionError::MissingFolder { line, .. }
			| ExecutionError::InvalidNumber { line, .. }
			| ExecutionError::InvalidVersion { line, .. }
			| ExecutionError::InvalidArgument { line, .. }
			| ExecutionError::InvalidPath { line, .. }
			| ExecutionError::InvalidPattern { line, .. }
			| ExecutionError::MalformedExpression { line, .. }
			| ExecutionError::OutOfRange { line, .. }
			| ExecutionError::InvalidSelection { line, .. }
			| ExecutionError::BadNesting { line, .. }
			| ExecutionError::Nested { line, .. }
			| ExecutionError::NestedTooDeep { line, .. }
			| ExecutionError::Host { line, .. }
			| ExecutionError::IO { line, .. } => *line,
		}
	}
}

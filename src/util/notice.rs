//! This module provides the *Notice* struct, which is used for pretty-printing warnings, errors, or other messages to users.

use std::{fmt::Display, io};

use crate::{prelude::*, structs::error::FileKind};

/// The ANSI escape code to reset all styles and colors.
const ANSI_RESET: &str = "\x1B[0m";

/// The ANSI escape code for bold text.
const ANSI_BOLD: &str = "\x1B[1m";

/// The colors a notice's title and labels can be printed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NoticeColor {
	Red,
	Yellow,
	Green,
	Cyan,
	Magenta,
}

impl NoticeColor {
	fn ansi(&self) -> &'static str {
		match self {
			NoticeColor::Red => "\x1B[31m",
			NoticeColor::Yellow => "\x1B[33m",
			NoticeColor::Green => "\x1B[32m",
			NoticeColor::Cyan => "\x1B[36m",
			NoticeColor::Magenta => "\x1B[35m",
		}
	}

	/// Wraps some text in this color and bold styling.
	fn paint(&self, text: &str) -> String {
		format!("{ANSI_BOLD}{}{text}{ANSI_RESET}", self.ansi())
	}
}

/// Notices allow you to easily pretty-print warning, errors, and other various information.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Notice {
	color: NoticeColor,
	prefix: String,
	header: String,
	fields: Vec<(String, String)>,
}

/// Presets to use while making a notice, allowing you to quickly recreate common forms of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NoticePreset {
	/// A red notice with the prefix "ERROR".
	Error,

	/// A yellow notice with the prefix "WARN".
	Warning,

	/// A green notice with the prefix "DONE".
	Success,

	/// A cyan notice with the prefix "STATS".
	Statistics,

	/// A magenta notice with the prefix "SCRIPT", used for anything a script shows the user.
	Script,
}

impl Notice {
	/// Builds a new notice from raw components.
	pub fn new(color: NoticeColor, prefix: &str, header: &str) -> Self {
		Self {
			color,
			prefix: prefix.to_owned(),
			header: header.to_owned(),
			fields: Vec::new(),
		}
	}

	/// Builds a new notice from a preset and a header.
	pub fn from_preset(preset: NoticePreset, header: &str) -> Self {
		match preset {
			NoticePreset::Error => Notice::new(NoticeColor::Red, "ERROR", header),
			NoticePreset::Warning => Notice::new(NoticeColor::Yellow, "WARN", header),
			NoticePreset::Success => Notice::new(NoticeColor::Green, "DONE", header),
			NoticePreset::Statistics => Notice::new(NoticeColor::Cyan, "STATS", header),
			NoticePreset::Script => Notice::new(NoticeColor::Magenta, "SCRIPT", header),
		}
	}

	/// Adds a new field to this notice, which will be printed after any other fields.
	/// A field will be presented in the form of `"{label}: {content}"`.
	pub fn add_field(mut self, label: &str, content: &str) -> Self {
		self.fields.push((label.to_owned(), content.to_owned()));
		self
	}

	/// Returns the content of the first field with this label.
	pub fn field(&self, label: &str) -> Option<&str> {
		self.fields.iter()
			.find(|(l, _)| l == label)
			.map(|(_, content)| content.as_str())
	}

	/// Convenience method to allow printing a notice at the end of a dot-call chain.
	pub fn print(self) {
		println!("{self}");
	}
}

impl Display for Notice {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		writeln!(f, "{}", self.color.paint(&format!("[{} - {}]", self.prefix, self.header)))?;

		for (label, content) in self.fields.iter() {
			writeln!(f, "{}{content}", self.color.paint(&format!("  {label}: ")))?;
		}

		Ok(())
	}
}

// Beyond this point is just conversions between errors and notices.

impl From<AppError> for Notice {
	fn from(value: AppError) -> Self {
		match value {
			AppError::IO(error) => error.into(),
			AppError::Script(error) => error.into(),
			AppError::Custom(notice) => notice,

			AppError::Bincode(error) => Notice::from_preset(NoticePreset::Error, "(De)serialization")
				.add_field("Description", "Failed to save or load an install plan.")
				.add_field("Details", &error.to_string()),

			AppError::Unknown(error) => Notice::from_preset(NoticePreset::Error, "Unknown")
				.add_field("Message", "An unknown error has occurred!")
				.add_field("Details", &error.to_string()),
		}
	}
}

impl From<io::Error> for Notice {
	fn from(value: io::Error) -> Self {
		let notice = Notice::from_preset(NoticePreset::Error, "IO");

		match value.kind() {
			io::ErrorKind::NotFound => notice
				.add_field("Description", "Omodcrab tried to access a file that doesn't exist.")
				.add_field("Suggestion", "Check the paths you passed, and make sure the OMOD was fully extracted."),

			io::ErrorKind::PermissionDenied => notice
				.add_field("Description", "Omodcrab tried to access a file, but it didn't have the right permissions.")
				.add_field("Suggestion", "Ensure you can read the script and the extracted OMOD folders."),

			_ => notice
				.add_field("Description", "An unknown error has occurred!")
				.add_field("Details", &value.to_string()),
		}
	}
}

impl From<ScriptError> for Notice {
	fn from(value: ScriptError) -> Self {
		match value {
			ScriptError::Tokenize(error) => error.into(),
			ScriptError::Execution(error) => error.into(),

			ScriptError::Fatal { line } => Notice::from_preset(NoticePreset::Warning, "Install Aborted")
				.add_field("Description", "The script stopped the install with 'FatalError'.")
				.add_field("Line", &line.to_string())
				.add_field("Note", "This was requested by the mod's author; nothing will be installed."),

			ScriptError::Cancelled { line } => Notice::from_preset(NoticePreset::Warning, "Install Cancelled")
				.add_field("Description", "A dialog was cancelled, so the install was stopped.")
				.add_field("Line", &line.to_string()),
		}
	}
}

impl From<TokenizeError> for Notice {
	fn from(value: TokenizeError) -> Self {
		let notice = Notice::from_preset(NoticePreset::Error, "Script Syntax")
			.add_field("Description", &value.to_string());

		match value {
			TokenizeError::UnknownKeyword { .. } | TokenizeError::UnknownCondition { .. } => notice
				.add_field("Suggestion", "Check the spelling; keywords are not case-sensitive, but they must be exact."),

			TokenizeError::UnterminatedQuote { .. } => notice
				.add_field("Suggestion", "Close the quote, or end the line with '\\' to continue it on the next line."),

			TokenizeError::MalformedSelect { per_option, .. } => notice
				.add_field("Suggestion", &format!("Every option needs exactly {per_option} arguments.")),

			_ => notice,
		}
	}
}

impl From<ExecutionError> for Notice {
	fn from(value: ExecutionError) -> Self {
		let notice = Notice::from_preset(NoticePreset::Error, "Script Execution")
			.add_field("Description", &value.to_string())
			.add_field("Line", &value.line().to_string());

		match value {
			ExecutionError::UndefinedVariable { name, .. } => notice
				.add_field("Suggestion", &format!("Set '{name}' with 'SetVar' before it is used.")),

			ExecutionError::MissingFile { kind: FileKind::Plugin, .. } => notice
				.add_field("Suggestion", "Make sure the OMOD was extracted completely, including its plugins."),

			ExecutionError::MissingFile { kind: FileKind::Data, .. } | ExecutionError::MissingFolder { .. } => notice
				.add_field("Suggestion", "Make sure the OMOD was extracted completely, including its data files."),

			_ => notice,
		}
	}
}

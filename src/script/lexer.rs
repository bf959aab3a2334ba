//! This module splits raw script text into logical lines and their words.

use std::mem;

use crate::prelude::*;

/// A logical script line, after continuations have been joined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLine {
	/// The 1-based physical line this logical line starts on.
	pub number: usize,

	/// The joined text of the line, trimmed.
	pub text: String,
}

impl SourceLine {
	/// Returns the comment text if this line is a comment.
	pub fn comment(&self) -> Option<&str> {
		self.text.strip_prefix(';').map(str::trim)
	}
}

/// Joins physical lines into logical ones.
/// A trailing '\' continues a line onto the next one, and the two halves are joined with a single space.
/// Blank lines are dropped.
pub fn logical_lines(script: &str) -> Vec<SourceLine> {
	let script = script.strip_prefix('\u{feff}').unwrap_or(script);

	let mut lines = Vec::new();
	let mut pending: Option<SourceLine> = None;

	for (index, raw) in script.lines().enumerate() {
		let mut text = raw.trim();
		let continues = text.ends_with('\\');
		if continues {
			text = text[..text.len() - 1].trim_end();
		}

		let line = match pending.take() {
			Some(mut open) => {
				if !open.text.is_empty() && !text.is_empty() { open.text.push(' '); }
				open.text.push_str(text);
				open
			},
			None => SourceLine { number: index + 1, text: text.to_owned() },
		};

		if continues {
			pending = Some(line);
		} else if !line.text.is_empty() {
			lines.push(line);
		}
	}

	// A continuation on the very last line has nothing to join with, so it ends there.
	if let Some(line) = pending.filter(|l| !l.text.is_empty()) {
		lines.push(line);
	}

	lines
}

/// Splits a logical line into its words.
/// Whitespace separates words unless it is inside double quotes, and '""' is an empty word.
pub fn split_words(line: &SourceLine) -> TokenizeResult<Vec<String>> {
	let mut words = Vec::new();
	let mut current = String::new();
	let mut in_word = false;
	let mut in_quotes = false;

	for c in line.text.chars() {
		match c {
			'"' => {
				in_quotes = !in_quotes;
				in_word = true;
			},
			c if c.is_whitespace() && !in_quotes => {
				if in_word {
					words.push(mem::take(&mut current));
					in_word = false;
				}
			},
			c => {
				current.push(c);
				in_word = true;
			},
		}
	}

	if in_quotes {
		return Err(TokenizeError::UnterminatedQuote { line: line.number, text: line.text.clone() });
	}

	if in_word {
		words.push(current);
	}

	Ok(words)
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn words(text: &str) -> Vec<String> {
		split_words(&SourceLine { number: 1, text: text.to_owned() }).unwrap()
	}

	#[test]
	fn quotes_keep_spaces_and_allow_empty_words() {
		assert_eq!(words("SetVar X \"a b\""), vec!["SetVar", "X", "a b"]);
		assert_eq!(words("SetVar X \"\""), vec!["SetVar", "X", ""]);
		assert_eq!(words("  Message   hi  "), vec!["Message", "hi"]);
	}

	#[test]
	fn unterminated_quotes_fail() {
		let line = SourceLine { number: 4, text: "Message \"oops".to_owned() };
		assert_eq!(
			split_words(&line),
			Err(TokenizeError::UnterminatedQuote { line: 4, text: "Message \"oops".to_owned() })
		);
	}

	#[test]
	fn continuations_join_with_one_space() {
		let joined = logical_lines("Message \"Hello \\\nWorld\"");
		let single = logical_lines("Message \"Hello World\"");

		assert_eq!(joined, single);
		assert_eq!(joined[0].number, 1);
	}

	#[test]
	fn blank_lines_are_dropped_and_numbers_kept() {
		let lines = logical_lines("\r\n; note\r\n\r\nReturn\r\n");

		assert_eq!(lines.len(), 2);
		assert_eq!(lines[0].comment(), Some("note"));
		assert_eq!(lines[1], SourceLine { number: 4, text: "Return".to_owned() });
	}

	#[test]
	fn paths_with_inner_backslashes_do_not_continue() {
		let lines = logical_lines("InstallDataFile textures\\a.dds\nReturn");
		assert_eq!(lines.len(), 2);
	}
}

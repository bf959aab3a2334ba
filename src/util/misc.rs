//! This module is the general place for utilities that don't need their own module.

use std::{fmt::Display, fs, io::{BufRead, Write}, path::Path};

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Allows a struct to easily be saved and loaded using a file.
/// This is powered via Serde and Bincode.
pub trait SaveLoad {
	/// Attempts to save (serialize) this struct to the file provided.
	fn save(&self, path: impl AsRef<Path>) -> AppResult<()>;

	/// Attempts to load (deserialize) this struct from the file provided.
	fn load(path: impl AsRef<Path>) -> AppResult<Self>
	where
		Self: Sized;
}

impl<T> SaveLoad for T
where
	T: Serialize + for<'de> Deserialize<'de>,
{
	fn save(&self, path: impl AsRef<Path>) -> AppResult<()> {
		let bin = bincode::serialize(self)?;
		fs::write(&path, bin)?;

		debug!("Saved {} bytes to '{}'.", fs::metadata(&path)?.len(), path.as_ref().display());
		Ok(())
	}

	fn load(path: impl AsRef<Path>) -> AppResult<Self>
	where
		Self: Sized,
	{
		let bin = fs::read(path)?;

		let item: T = bincode::deserialize(&bin[..])?;
		Ok(item)
	}
}

/// Helper function to generate a pretty string based on a slice's contents.
pub fn display_slice<T: Display>(slice: &[T]) -> String {
	slice.iter().join(", ")
}

/// Writes a prompt, then reads a single line of input with its line ending removed.
/// Returns *None* once the input is closed.
pub fn prompt_line(input: &mut impl BufRead, output: &mut impl Write, msg: impl AsRef<str>) -> AppResult<Option<String>> {
	// Writes and manually flushes the output so the cursor is at the end.
	output.write_all(msg.as_ref().as_bytes())?;
	output.flush()?;

	let mut line = String::new();
	if input.read_line(&mut line)? == 0 {
		return Ok(None);
	}

	Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use super::*;

	#[test]
	fn prompts_read_one_line_at_a_time() {
		let mut input = Cursor::new("first\r\nsecond\n");
		let mut output = Vec::new();

		assert_eq!(prompt_line(&mut input, &mut output, "> ").unwrap().as_deref(), Some("first"));
		assert_eq!(prompt_line(&mut input, &mut output, "> ").unwrap().as_deref(), Some("second"));
		assert_eq!(prompt_line(&mut input, &mut output, "> ").unwrap(), None);
		assert_eq!(output, b"> > > ");
	}

	#[test]
	fn slices_are_comma_separated() {
		assert_eq!(display_slice(&["a.esp", "b.esp"]), "a.esp, b.esp");
		assert_eq!(display_slice::<String>(&[]), "");
	}
}

//! This module defines the boundary between the engine and whatever is hosting it.
//!
//! Every dialog, prompt, and question about the user's game goes through *ExternalScriptFunctions*,
//! so the engine itself never touches the screen or the game folder.

use std::path::{Path, PathBuf};

use anyhow::bail;

use crate::prelude::*;

/// The answer to a yes/no dialog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogResult {
	Yes,
	No,

	/// The user closed the dialog, which cancels the whole install.
	Cancel,
}

/// Everything a host needs to show one of the select statements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectPrompt {
	pub title: String,

	/// The options, with any leading '|' already stripped.
	pub items: Vec<String>,

	/// Image shown next to each option, resolved against the extracted data folder.
	pub previews: Option<Vec<Option<PathBuf>>>,
	pub descriptions: Option<Vec<String>>,

	/// Indices of the options the script marked as selected by default.
	pub preselected: Vec<usize>,
	pub is_multi: bool,
}

impl SelectPrompt {
	/// Builds a prompt from a select statement's substituted options.
	/// Options starting with '|' are preselected, and previews named "" or "None" are left out.
	pub fn new(
		title: String,
		items: Vec<String>,
		previews: Option<Vec<String>>,
		descriptions: Option<Vec<String>>,
		is_multi: bool,
		data_path: &Path,
	) -> Self {
		let mut preselected = Vec::new();
		let items = items.into_iter()
			.enumerate()
			.map(|(i, item)| match item.strip_prefix('|') {
				Some(stripped) => {
					preselected.push(i);
					stripped.to_owned()
				},
				None => item,
			})
			.collect();

		let previews = previews.map(|list| list.into_iter()
			.map(|p| (!p.is_empty() && !p.eq_ignore_ascii_case("None")).then(|| data_path.join(p.replace('\\', "/"))))
			.collect());

		Self { title, items, previews, descriptions, preselected, is_multi }
	}
}

/// The functions a script can call on its host.
/// Each call blocks the script until it returns, and any error aborts the run.
pub trait ExternalScriptFunctions {
	/// Shows a message, with an optional window title.
	fn message(&mut self, message: &str, title: Option<&str>) -> anyhow::Result<()>;

	/// Asks a yes/no question.
	fn dialog_yes_no(&mut self, message: &str, title: Option<&str>) -> anyhow::Result<DialogResult>;

	/// Lets the user pick from a list, returning the indices they chose.
	/// Single selects must return exactly one index.
	fn select(&mut self, prompt: &SelectPrompt) -> anyhow::Result<Vec<usize>>;

	/// Asks the user for a line of text.
	fn input_string(&mut self, title: Option<&str>, initial: &str) -> anyhow::Result<String>;

	/// Shows an image that was extracted from the OMOD.
	fn display_image(&mut self, path: &Path, title: Option<&str>) -> anyhow::Result<()>;

	/// Shows a block of text, like a readme.
	fn display_text(&mut self, text: &str, title: Option<&str>) -> anyhow::Result<()>;

	/// Checks if a file exists in the game's data folder, including inside registered BSAs.
	fn data_file_exists(&mut self, path: &str) -> anyhow::Result<bool>;

	/// Returns the installed script extender's version, if there is one.
	fn script_extender_version(&mut self) -> anyhow::Result<Option<Version>>;

	/// Returns the installed graphics extender's version, if there is one.
	fn graphics_extender_version(&mut self) -> anyhow::Result<Option<Version>>;

	/// Returns the version of the game itself.
	fn oblivion_version(&mut self) -> anyhow::Result<Version>;

	/// Reads a value from the game's INI file.
	fn read_ini(&mut self, section: &str, key: &str) -> anyhow::Result<String>;

	/// Reads a value from the game's renderer info file.
	fn read_renderer_info(&mut self, key: &str) -> anyhow::Result<String>;

	/// Returns the version of a binary in the game's folder, like a script extender plugin.
	fn plugin_version(&mut self, _name: &str) -> anyhow::Result<Option<Version>> {
		Ok(None)
	}

	/// Extracts a file from the game's BSAs, optionally from one specific archive.
	fn extract_bsa_file(&mut self, archive: Option<&str>, path: &str) -> anyhow::Result<Vec<u8>> {
		match archive {
			Some(archive) => bail!("Can't read '{path}' from '{archive}': this host has no BSA support."),
			None => bail!("Can't read '{path}' from the game's BSAs: this host has no BSA support."),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn prompts_strip_preselection_markers() {
		let prompt = SelectPrompt::new(
			"Pick".to_owned(),
			vec!["|A".to_owned(), "B".to_owned()],
			Some(vec!["a.png".to_owned(), "None".to_owned()]),
			None,
			true,
			Path::new("/omod/data"),
		);

		assert_eq!(prompt.items, vec!["A", "B"]);
		assert_eq!(prompt.preselected, vec![0]);
		assert_eq!(prompt.previews, Some(vec![Some(PathBuf::from("/omod/data/a.png")), None]));
	}
}

//! This module provides *ConsoleFunctions*, a terminal host for scripts.
//!
//! Dialogs and prompts are answered on standard input, while facts about the user's game
//! (extender versions, INI values, and so on) come from whatever the command line was given.

use std::{
	fs,
	io::{self, BufRead, Write},
	path::{Path, PathBuf},
};

use anyhow::{bail, Context};

use crate::{
	prelude::*,
	script::functions::{DialogResult, ExternalScriptFunctions, SelectPrompt},
	structs::config::DEFAULT_OBLIVION_VERSION,
	util::misc::prompt_line,
};

/// What the console knows about the game a script is installing into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameFacts {
	/// The game's data folder, used to answer 'DataFileExists'.
	pub data_folder: Option<PathBuf>,

	pub script_extender: Option<Version>,
	pub graphics_extender: Option<Version>,
	pub oblivion: Version,

	/// The contents of Oblivion.ini.
	pub ini: Option<String>,

	/// The contents of RendererInfo.txt.
	pub renderer_info: Option<String>,
}

impl Default for GameFacts {
	fn default() -> Self {
		Self {
			data_folder: None,
			script_extender: None,
			graphics_extender: None,
			oblivion: DEFAULT_OBLIVION_VERSION,
			ini: None,
			renderer_info: None,
		}
	}
}

impl GameFacts {
	/// Reads the INI and renderer info files, if they were given.
	pub fn with_files(mut self, ini: Option<&Path>, renderer_info: Option<&Path>) -> io::Result<Self> {
		if let Some(path) = ini {
			self.ini = Some(fs::read_to_string(path)?);
		}

		if let Some(path) = renderer_info {
			self.renderer_info = Some(fs::read_to_string(path)?);
		}

		Ok(self)
	}
}

/// A host that talks to the user through a terminal.
pub struct ConsoleFunctions<R, W> {
	input: R,
	output: W,
	facts: GameFacts,
}

impl ConsoleFunctions<io::StdinLock<'static>, io::Stdout> {
	/// Builds a console host on the process's standard input and output.
	pub fn stdio(facts: GameFacts) -> Self {
		Self::new(io::stdin().lock(), io::stdout(), facts)
	}
}

impl<R: BufRead, W: Write> ConsoleFunctions<R, W> {
	pub fn new(input: R, output: W, facts: GameFacts) -> Self {
		Self { input, output, facts }
	}

	/// Returns the output this host has written to.
	pub fn into_output(self) -> W {
		self.output
	}

	fn show(&mut self, notice: Notice) -> anyhow::Result<()> {
		write!(self.output, "{notice}")?;
		Ok(())
	}

	/// Reads one line, failing if the input is closed.
	fn ask(&mut self, msg: &str) -> anyhow::Result<String> {
		match prompt_line(&mut self.input, &mut self.output, msg)? {
			Some(line) => Ok(line.trim().to_owned()),
			None => bail!("Standard input was closed while the script was waiting for an answer."),
		}
	}

	/// Reads the options picked for a select prompt, as 1-based numbers separated by spaces or commas.
	/// An empty answer keeps the preselected options.
	fn read_selection(&mut self, prompt: &SelectPrompt) -> anyhow::Result<Vec<usize>> {
		loop {
			let answer = self.ask("Choose: ")?;
			let picked = match answer.is_empty() {
				true => Ok(prompt.preselected.clone()),
				false => parse_choices(&answer, prompt.items.len()),
			};

			match picked {
				Ok(picked) if prompt.is_multi || picked.len() == 1 => return Ok(picked),
				Ok(_) => writeln!(self.output, "Please pick exactly one option.")?,
				Err(reason) => writeln!(self.output, "{reason}")?,
			}
		}
	}
}

impl<R: BufRead, W: Write> ExternalScriptFunctions for ConsoleFunctions<R, W> {
	fn message(&mut self, message: &str, title: Option<&str>) -> anyhow::Result<()> {
		self.show(Notice::from_preset(NoticePreset::Script, title.unwrap_or("Message")).add_field("Message", message))
	}

	fn dialog_yes_no(&mut self, message: &str, title: Option<&str>) -> anyhow::Result<DialogResult> {
		self.show(Notice::from_preset(NoticePreset::Script, title.unwrap_or("Question")).add_field("Question", message))?;

		loop {
			match self.ask("[y]es, [n]o, or [c]ancel: ")?.to_lowercase().as_str() {
				"y" | "yes" => return Ok(DialogResult::Yes),
				"n" | "no" => return Ok(DialogResult::No),
				"c" | "cancel" => return Ok(DialogResult::Cancel),
				_ => continue,
			}
		}
	}

	fn select(&mut self, prompt: &SelectPrompt) -> anyhow::Result<Vec<usize>> {
		let mode = if prompt.is_multi { "Select any number of options" } else { "Select one option" };
		self.show(Notice::from_preset(NoticePreset::Script, &prompt.title).add_field("Prompt", mode))?;

		for (i, item) in prompt.items.iter().enumerate() {
			let marker = if prompt.preselected.contains(&i) { "*" } else { " " };
			writeln!(self.output, " {marker}{:>3}. {item}", i + 1)?;

			if let Some(description) = prompt.descriptions.as_ref().and_then(|d| d.get(i)).filter(|d| !d.is_empty()) {
				writeln!(self.output, "        {description}")?;
			}

			if let Some(preview) = prompt.previews.as_ref().and_then(|p| p.get(i)).and_then(Option::as_ref) {
				writeln!(self.output, "        preview: {}", preview.display())?;
			}
		}

		self.read_selection(prompt)
	}

	fn input_string(&mut self, title: Option<&str>, initial: &str) -> anyhow::Result<String> {
		let msg = match initial.is_empty() {
			true => format!("{}: ", title.unwrap_or("Input")),
			false => format!("{} [{initial}]: ", title.unwrap_or("Input")),
		};

		let answer = self.ask(&msg)?;
		Ok(if answer.is_empty() { initial.to_owned() } else { answer })
	}

	fn display_image(&mut self, path: &Path, title: Option<&str>) -> anyhow::Result<()> {
		self.show(Notice::from_preset(NoticePreset::Script, title.unwrap_or("Image")).add_field("Image", &path.display().to_string()))
	}

	fn display_text(&mut self, text: &str, title: Option<&str>) -> anyhow::Result<()> {
		self.show(Notice::from_preset(NoticePreset::Script, title.unwrap_or("Text")))?;
		writeln!(self.output, "{text}")?;
		Ok(())
	}

	fn data_file_exists(&mut self, path: &str) -> anyhow::Result<bool> {
		let Some(folder) = &self.facts.data_folder else {
			warn!("No game data folder was given, so '{path}' is assumed to be missing.");
			return Ok(false);
		};

		Ok(folder.join(path.replace('\\', "/")).exists())
	}

	fn script_extender_version(&mut self) -> anyhow::Result<Option<Version>> {
		Ok(self.facts.script_extender)
	}

	fn graphics_extender_version(&mut self) -> anyhow::Result<Option<Version>> {
		Ok(self.facts.graphics_extender)
	}

	fn oblivion_version(&mut self) -> anyhow::Result<Version> {
		Ok(self.facts.oblivion)
	}

	fn read_ini(&mut self, section: &str, key: &str) -> anyhow::Result<String> {
		let ini = self.facts.ini.as_deref().context("No Oblivion.ini was given, so 'ReadINI' can't be answered.")?;
		ini_value(ini, section, key).with_context(|| format!("Oblivion.ini has no '{key}' in '[{section}]'."))
	}

	fn read_renderer_info(&mut self, key: &str) -> anyhow::Result<String> {
		let info = self.facts.renderer_info.as_deref().context("No RendererInfo.txt was given, so 'ReadRendererInfo' can't be answered.")?;
		renderer_value(info, key).with_context(|| format!("RendererInfo.txt has no '{key}'."))
	}
}

/// Parses an answer like "1, 3 4" into 0-based indices.
fn parse_choices(answer: &str, count: usize) -> Result<Vec<usize>, String> {
	answer.split([',', ' '])
		.filter(|s| !s.is_empty())
		.map(|s| match s.parse::<usize>() {
			Ok(n) if (1..=count).contains(&n) => Ok(n - 1),
			_ => Err(format!("'{s}' is not a number between 1 and {count}.")),
		})
		.collect::<Result<Vec<_>, _>>()
		.map(|picked| picked.into_iter().unique().collect())
}

/// Finds a value in INI text, ignoring case in section and key names.
fn ini_value(ini: &str, section: &str, key: &str) -> Option<String> {
	let mut in_section = false;

	for line in ini.lines().map(str::trim) {
		if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
			in_section = name.trim().eq_ignore_ascii_case(section);
			continue;
		}

		if !in_section { continue; }

		let Some((name, value)) = line.split_once('=') else { continue };
		if name.trim().eq_ignore_ascii_case(key) {
			// Values may carry a trailing comment.
			return Some(value.split(';').next().unwrap_or_default().trim().to_owned());
		}
	}

	None
}

/// Finds a value in the renderer info file, where each line reads "Name : value".
fn renderer_value(info: &str, key: &str) -> Option<String> {
	info.lines()
		.filter_map(|l| l.split_once(':'))
		.find(|(name, _)| name.trim().eq_ignore_ascii_case(key))
		.map(|(_, value)| value.trim().to_owned())
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use pretty_assertions::assert_eq;

	use super::*;

	fn console(input: &str) -> ConsoleFunctions<Cursor<Vec<u8>>, Vec<u8>> {
		ConsoleFunctions::new(Cursor::new(input.as_bytes().to_vec()), Vec::new(), GameFacts::default())
	}

	fn prompt(items: &[&str], is_multi: bool) -> SelectPrompt {
		SelectPrompt::new(
			"Pick".to_owned(),
			items.iter().map(|i| i.to_string()).collect(),
			None,
			None,
			is_multi,
			Path::new("data"),
		)
	}

	#[test]
	fn dialogs_read_until_they_understand() {
		let mut console = console("maybe\nY\nc\n");

		assert_eq!(console.dialog_yes_no("Install?", None).unwrap(), DialogResult::Yes);
		assert_eq!(console.dialog_yes_no("Really?", None).unwrap(), DialogResult::Cancel);
		assert!(console.dialog_yes_no("Again?", None).is_err());
	}

	#[test]
	fn selections_are_one_based_and_validated() {
		let mut console = console("9\n1 2\n2\n");
		assert_eq!(console.select(&prompt(&["A", "B"], false)).unwrap(), vec![1]);

		let mut console = self::console("1, 3\n");
		assert_eq!(console.select(&prompt(&["A", "B", "C"], true)).unwrap(), vec![0, 2]);
	}

	#[test]
	fn empty_answers_keep_preselected_options() {
		let mut console = console("\n");
		assert_eq!(console.select(&prompt(&["A", "|B"], false)).unwrap(), vec![1]);

		let mut console = self::console("\n");
		assert_eq!(console.input_string(Some("Name"), "Bob").unwrap(), "Bob");
	}

	#[test]
	fn ini_values_are_found_by_section() {
		let ini = "[General]\nsLocalSavePath=Saves\\ ;comment\n[Display]\niSize W=1920\n";

		assert_eq!(ini_value(ini, "general", "slocalsavepath").as_deref(), Some("Saves\\"));
		assert_eq!(ini_value(ini, "Display", "iSize W").as_deref(), Some("1920"));
		assert_eq!(ini_value(ini, "Display", "sLocalSavePath"), None);
	}

	#[test]
	fn renderer_values_are_found_by_name() {
		let info = "Renderer Info\nShader Package : 13\nWater shader : yes\n";
		assert_eq!(renderer_value(info, "shader package").as_deref(), Some("13"));
	}

	#[test]
	fn missing_game_facts_are_errors_or_defaults() {
		let mut console = console("");
		assert!(console.read_ini("General", "x").is_err());
		assert!(!console.data_file_exists("a.esp").unwrap());
		assert_eq!(console.script_extender_version().unwrap(), None);
	}
}

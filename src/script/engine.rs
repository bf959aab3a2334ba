//! This module runs a loaded *Script* and collects the install plan it describes.
//!
//! The engine walks the flat statement list with a program counter.
//! Blocks are tracked on a frame stack, and the jumps recorded while loading decide where execution goes next,
//! so a block whose condition is false is skipped in a single step.

use std::{collections::HashMap, fs, path::Path};

use regex::Regex;
use walkdir::WalkDir;

use crate::{
	omod::{is_safe_relative, normalize_path, strip_folder, OmodFiles},
	prelude::*,
	structs::{error::FileKind, plan::ScriptReturnData},
};

use super::{
	functions::{DialogResult, ExternalScriptFunctions, SelectPrompt},
	parser::{Link, Script},
	token::{ForEnumerationType, ForLoop, IfConditionType, SelectBlock, Token, TokenType},
};

/// How a script run that didn't fail came to an end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
	/// Execution ran past the last statement.
	Finished,

	/// The script stopped early with 'Return'.
	Returned,
}

/// The result of a successful script run.
#[derive(Clone, Debug)]
pub struct ScriptOutcome {
	/// The finalized install plan.
	pub plan: ScriptReturnData,
	pub completion: Completion,
}

/// Loads and runs a script, returning the install plan it builds.
/// Any error means the plan is thrown away.
pub fn run_script(
	text: &str,
	settings: &ScriptSettings,
	files: &OmodFiles,
	functions: &mut dyn ExternalScriptFunctions,
) -> ScriptResult<ScriptOutcome> {
	let script = Script::parse(text)?;
	info!("Running a script with {} statements.", script.len());

	let mut runner = ScriptRunner::new(settings, files, functions);
	let completion = runner.execute(&script)?;

	Ok(ScriptOutcome { plan: runner.into_plan(), completion })
}

/// How many 'ExecLines' programs may run inside each other.
const MAX_EXEC_DEPTH: usize = 32;

/// A block that is open while the script runs.
#[derive(Debug)]
enum Frame {
	If { start: usize },

	For {
		start: usize,
		end: usize,
		variable: String,
		state: LoopState,
	},

	Select {
		start: usize,
		results: Vec<String>,

		/// Case values that already ran in this select.
		matched: Vec<String>,
	},

	Case { start: usize },
}

/// Where a running loop is in its sequence.
#[derive(Debug)]
enum LoopState {
	/// Counts from *next* towards *end*, one step at a time.
	Count { next: Option<i64>, end: i64, step: i64 },

	/// Walks a folder listing that was read when the loop started.
	Each { items: Vec<String>, next: usize },
}

impl LoopState {
	/// Returns the loop variable's next value, or *None* once the loop is done.
	fn next_item(&mut self) -> Option<String> {
		match self {
			LoopState::Count { next, end, step } => {
				let (end, step) = (*end, *step);
				let value = (*next).filter(|v| if step > 0 { *v <= end } else { *v >= end })?;
				*next = value.checked_add(step);
				Some(value.to_string())
			},
			LoopState::Each { items, next } => {
				let item = items.get(*next)?.clone();
				*next += 1;
				Some(item)
			},
		}
	}
}

impl Frame {
	fn start(&self) -> usize {
		match self {
			Frame::If { start } | Frame::For { start, .. } | Frame::Select { start, .. } | Frame::Case { start } => *start,
		}
	}
}

/// The state of one script run.
/// Variables and the plan are shared by every program the run executes, including the ones 'ExecLines' builds.
pub struct ScriptRunner<'a> {
	pub(super) settings: &'a ScriptSettings,
	pub(super) files: &'a OmodFiles,
	pub(super) functions: &'a mut dyn ExternalScriptFunctions,
	pub(super) variables: HashMap<String, String>,
	pub(super) plan: ScriptReturnData,

	/// How many 'ExecLines' programs are currently running.
	exec_depth: usize,
}

impl<'a> ScriptRunner<'a> {
	/// Builds a runner with no variables and an empty plan.
	pub fn new(settings: &'a ScriptSettings, files: &'a OmodFiles, functions: &'a mut dyn ExternalScriptFunctions) -> Self {
		Self {
			settings,
			files,
			functions,
			variables: HashMap::new(),
			plan: ScriptReturnData::default(),
			exec_depth: 0,
		}
	}

	/// Returns the current value of a variable.
	pub fn variable(&self, name: &str) -> Option<&str> {
		self.variables.get(name).map(String::as_str)
	}

	/// Returns the plan as it stands, before it is finalized.
	pub fn plan(&self) -> &ScriptReturnData {
		&self.plan
	}

	/// Finalizes and returns the plan this run built.
	pub fn into_plan(self) -> ScriptReturnData {
		self.plan.finalize()
	}

	/// Executes a program from its first statement.
	pub fn execute(&mut self, script: &Script) -> ScriptResult<Completion> {
		let statements = script.statements();
		let mut frames: Vec<Frame> = Vec::new();
		let mut pc = 0;

		while let Some(statement) = statements.get(pc) {
			let line = statement.line;
			debug!("{line:>4}: {statement}");

			pc = match &statement.token {
				Token::Comment(_) | Token::Label(_) => pc + 1,

				Token::If { negated, condition, args } => {
					let Link::If { else_at, end } = script.link(pc) else { return Err(bad_nesting(line, "If").into()) };

					let args = self.substitute_all(args, line)?;
					let active = self.evaluate(*condition, &args, line)? != *negated;

					match (active, else_at) {
						(false, None) => end + 1,
						(false, Some(else_at)) => {
							frames.push(Frame::If { start: pc });
							else_at + 1
						},
						(true, _) => {
							frames.push(Frame::If { start: pc });
							pc + 1
						},
					}
				},

				// Only reached when the 'If' branch ran, so the 'Else' branch is skipped.
				Token::Else => {
					let Link::Else { end } = script.link(pc) else { return Err(bad_nesting(line, "Else").into()) };
					close(&mut frames, line, TokenType::Else, |f| matches!(f, Frame::If { .. }))?;
					end + 1
				},

				Token::EndIf => {
					close(&mut frames, line, TokenType::EndIf, |f| matches!(f, Frame::If { .. }))?;
					pc + 1
				},

				Token::For(header) => {
					let Link::Loop { end } = script.link(pc) else { return Err(bad_nesting(line, "For").into()) };
					let mut state = self.loop_state(header, line)?;

					match state.next_item() {
						None => {
							debug!("Loop on line {line} has no iterations.");
							end + 1
						},
						Some(first) => {
							let variable = header.variable().to_owned();
							self.variables.insert(variable.clone(), first);
							frames.push(Frame::For { start: pc, end, variable, state });
							pc + 1
						},
					}
				},

				Token::EndFor | Token::Continue => {
					let Link::LoopControl { start } = script.link(pc) else { return Err(bad_nesting(line, "EndFor").into()) };
					self.next_iteration(&mut frames, start, line)?
				},

				Token::Exit => {
					let Link::LoopControl { start } = script.link(pc) else { return Err(bad_nesting(line, "Exit").into()) };
					unwind_to(&mut frames, start, line, TokenType::Exit)?;

					match frames.pop() {
						Some(Frame::For { end, .. }) => end + 1,
						_ => return Err(bad_nesting(line, "Exit").into()),
					}
				},

				Token::Select(block) => {
					let results = self.prompt(block, line)?;
					self.open_select(&mut frames, script, pc, results)?
				},

				Token::SelectVar { variable } => {
					let Some(value) = self.variables.get(variable).cloned() else {
						return Err(ExecutionError::UndefinedVariable { line, name: variable.clone() }.into());
					};
					self.open_select(&mut frames, script, pc, vec![value])?
				},

				Token::SelectString { value } => {
					let value = self.substitute(value, line)?;
					self.open_select(&mut frames, script, pc, vec![value])?
				},

				Token::Case { value } => {
					let Link::Case { next, .. } = script.link(pc) else { return Err(bad_nesting(line, "Case").into()) };
					let value = self.substitute(value, line)?;

					match enter_case(&mut frames, pc, Some(value), line)? {
						true => pc + 1,
						false => next,
					}
				},

				Token::Default => {
					let Link::Case { next, .. } = script.link(pc) else { return Err(bad_nesting(line, "Default").into()) };

					match enter_case(&mut frames, pc, None, line)? {
						true => pc + 1,
						false => next,
					}
				},

				Token::Break => {
					let Link::Break { case } = script.link(pc) else { return Err(bad_nesting(line, "Break").into()) };
					let Link::Case { next, .. } = script.link(case) else { return Err(bad_nesting(line, "Break").into()) };

					unwind_to(&mut frames, case, line, TokenType::Break)?;
					frames.pop();
					next
				},

				Token::EndSelect => {
					if matches!(frames.last(), Some(Frame::Case { .. })) {
						frames.pop();
					}

					close(&mut frames, line, TokenType::EndSelect, |f| matches!(f, Frame::Select { .. }))?;
					pc + 1
				},

				Token::Goto(label) => {
					let Link::Goto { target } = script.link(pc) else { return Err(bad_nesting(line, "Goto").into()) };
					debug!("Jumping to label '{label}'.");

					let keep: Vec<usize> = script.ancestors(target).collect();
					while frames.last().is_some_and(|f| !keep.contains(&f.start())) {
						frames.pop();
					}

					target
				},

				Token::Return => {
					info!("The script returned early on line {line}.");
					return Ok(Completion::Returned);
				},

				Token::FatalError => {
					warn!("The script hit 'FatalError' on line {line}.");
					return Err(ScriptError::Fatal { line });
				},

				Token::SetVar { variable, value } => {
					let value = self.substitute(value, line)?;
					self.variables.insert(variable.clone(), value);
					pc + 1
				},

				Token::Instruction { kind: TokenType::ExecLines, args } => {
					let text = self.substitute(&args[0], line)?;
					if self.exec_lines(&text, line)? == Completion::Returned {
						return Ok(Completion::Returned);
					}
					pc + 1
				},

				Token::Instruction { kind, args } => {
					let args = self.substitute_all(args, line)?;
					self.run_instruction(*kind, &args, line)?;
					pc + 1
				},
			};
		}

		Ok(Completion::Finished)
	}

	/// Replaces every `%name%` in some text with the variable's value.
	/// A '%' that doesn't start a valid name is kept as it is.
	pub fn substitute(&self, text: &str, line: usize) -> ExecutionResult<String> {
		let mut out = String::with_capacity(text.len());
		let mut rest = text;

		while let Some(open) = rest.find('%') {
			out.push_str(&rest[..open]);
			let after = &rest[open + 1..];

			match after.find('%') {
				Some(close) if close > 0 && !after[..close].contains(char::is_whitespace) => {
					let name = &after[..close];
					let Some(value) = self.variables.get(name) else {
						return Err(ExecutionError::UndefinedVariable { line, name: name.to_owned() });
					};

					out.push_str(value);
					rest = &after[close + 1..];
				},
				_ => {
					out.push('%');
					rest = after;
				},
			}
		}

		out.push_str(rest);
		Ok(out)
	}

	fn substitute_all(&self, args: &[String], line: usize) -> ExecutionResult<Vec<String>> {
		args.iter().map(|a| self.substitute(a, line)).collect()
	}

	/// Decides whether an 'If' condition holds, before any 'IfNot' negation.
	fn evaluate(&mut self, condition: IfConditionType, args: &[String], line: usize) -> ScriptResult<bool> {
		let arg = |i: usize| args.get(i).map(String::as_str).unwrap_or_default();
		let title = args.get(1).map(String::as_str);

		let active = match condition {
			IfConditionType::DialogYesNo => match self.functions.dialog_yes_no(arg(0), title).map_err(host(line))? {
				DialogResult::Yes => true,
				DialogResult::No => false,
				DialogResult::Cancel => return Err(ScriptError::Cancelled { line }),
			},

			IfConditionType::DataFileExists => self.functions.data_file_exists(arg(0)).map_err(host(line))?,

			// These read backwards: the condition holds when the running version is past the one named.
			IfConditionType::VersionGreaterThan => parse_version(arg(0), line)? < self.settings.obmm_version,
			IfConditionType::VersionLessThan => parse_version(arg(0), line)? > self.settings.obmm_version,

			IfConditionType::ScriptExtenderPresent => self.functions.script_extender_version().map_err(host(line))?.is_some(),
			IfConditionType::ScriptExtenderNewerThan => {
				let wanted = parse_version(arg(0), line)?;
				self.functions.script_extender_version().map_err(host(line))?.is_some_and(|v| v > wanted)
			},

			IfConditionType::GraphicsExtenderPresent => self.functions.graphics_extender_version().map_err(host(line))?.is_some(),
			IfConditionType::GraphicsExtenderNewerThan => {
				let wanted = parse_version(arg(0), line)?;
				self.functions.graphics_extender_version().map_err(host(line))?.is_some_and(|v| v > wanted)
			},

			IfConditionType::OblivionNewerThan => {
				let wanted = parse_version(arg(0), line)?;
				self.functions.oblivion_version().map_err(host(line))? > wanted
			},

			IfConditionType::Equal => arg(0) == arg(1),
			IfConditionType::GreaterEqual => parse_int(arg(1), line)? <= parse_int(arg(0), line)?,
			IfConditionType::GreaterThan => parse_int(arg(1), line)? < parse_int(arg(0), line)?,
			IfConditionType::FGreaterEqual => parse_float(arg(1), line)? <= parse_float(arg(0), line)?,
			IfConditionType::FGreaterThan => parse_float(arg(1), line)? < parse_float(arg(0), line)?,
		};

		debug!("Condition '{}' on line {line} is {active}.", condition.name());
		Ok(active)
	}

	/// Builds the sequence a 'For' loop walks over.
	/// Count loops produce their values as they go, while folder loops read their listing up front.
	fn loop_state(&self, header: &ForLoop, line: usize) -> ExecutionResult<LoopState> {
		match header {
			ForLoop::Count { start, end, step, .. } => {
				let start = parse_int(&self.substitute(start, line)?, line)?;
				let end = parse_int(&self.substitute(end, line)?, line)?;
				let step = match step {
					Some(step) => parse_int(&self.substitute(step, line)?, line)?,
					None => 1,
				};

				if step == 0 {
					return Err(ExecutionError::InvalidArgument { line, value: "0".to_owned(), expected: "a non-zero step" });
				}

				Ok(LoopState::Count { next: Some(start), end, step })
			},

			ForLoop::Each { kind, folder, recurse, pattern, .. } => {
				let folder = self.substitute(folder, line)?;
				if !is_safe_relative(&folder) {
					return Err(ExecutionError::InvalidPath { line, path: folder });
				}

				let recurse = match recurse {
					Some(recurse) => parse_bool(&self.substitute(recurse, line)?, line)?,
					None => false,
				};

				let matcher = match pattern {
					Some(pattern) => {
						let pattern = self.substitute(pattern, line)?;
						(!pattern.is_empty())
							.then(|| wildcard_regex(&pattern))
							.transpose()
							.map_err(|source| ExecutionError::InvalidPattern { line, pattern, source })?
					},
					None => None,
				};

				let listing = match self.settings.dry_run {
					true => self.listing_from_omod(*kind, &folder, recurse),
					false => self.listing_from_disk(*kind, &folder, recurse, line)?,
				};

				let items: Vec<String> = listing.into_iter()
					.filter(|path| {
						let name = path.rsplit('\\').next().unwrap_or(path);
						matcher.as_ref().map_or(true, |m| m.is_match(name))
					})
					.sorted_by_key(|path| path.to_lowercase())
					.collect();

				debug!("Loop on line {line} walks {} entries.", items.len());
				Ok(LoopState::Each { items, next: 0 })
			},
		}
	}

	/// Lists a folder from the OMOD's file sets, which is what dry runs use.
	fn listing_from_omod(&self, kind: ForEnumerationType, folder: &str, recurse: bool) -> Vec<String> {
		let (file_kind, want_folders) = match kind {
			ForEnumerationType::DataFolder => (FileKind::Data, true),
			ForEnumerationType::DataFile => (FileKind::Data, false),
			ForEnumerationType::PluginFolder => (FileKind::Plugin, true),
			ForEnumerationType::Plugin => (FileKind::Plugin, false),
			ForEnumerationType::Count => return Vec::new(),
		};

		if want_folders {
			return self.files.folders(file_kind)
				.into_iter()
				.filter(|f| strip_folder(f, folder).is_some_and(|rest| recurse || !rest.contains('\\')))
				.collect();
		}

		self.files.in_folder(file_kind, folder, recurse)
			.map(|e| e.name.clone())
			.collect()
	}

	/// Lists a folder from the extracted files on disk.
	fn listing_from_disk(&self, kind: ForEnumerationType, folder: &str, recurse: bool, line: usize) -> ExecutionResult<Vec<String>> {
		let (root, want_folders) = match kind {
			ForEnumerationType::DataFolder => (&self.settings.data_path, true),
			ForEnumerationType::DataFile => (&self.settings.data_path, false),
			ForEnumerationType::PluginFolder => (&self.settings.plugins_path, true),
			ForEnumerationType::Plugin => (&self.settings.plugins_path, false),
			ForEnumerationType::Count => return Ok(Vec::new()),
		};

		let dir = root.join(normalize_path(folder).replace('\\', "/"));
		if !dir.is_dir() {
			debug!("'{}' is not a folder, so the loop on line {line} is empty.", dir.display());
			return Ok(Vec::new());
		}

		let mut listing = Vec::new();
		let walker = WalkDir::new(&dir)
			.min_depth(1)
			.max_depth(if recurse { usize::MAX } else { 1 });

		for entry in walker {
			let entry = entry.map_err(|e| ExecutionError::IO { line, source: e.into() })?;
			if entry.file_type().is_dir() != want_folders {
				continue;
			}

			if let Ok(relative) = entry.path().strip_prefix(root) {
				listing.push(normalize_path(&relative.to_string_lossy()));
			}
		}

		Ok(listing)
	}

	/// Moves an open loop on to its next item, or closes it once every item has been used.
	fn next_iteration(&mut self, frames: &mut Vec<Frame>, start: usize, line: usize) -> ExecutionResult<usize> {
		unwind_to(frames, start, line, TokenType::EndFor)?;

		let Some(Frame::For { end, variable, state, .. }) = frames.last_mut() else {
			return Err(bad_nesting(line, "EndFor"));
		};

		if let Some(item) = state.next_item() {
			self.variables.insert(variable.clone(), item);
			return Ok(start + 1);
		}

		let end = *end;
		frames.pop();
		Ok(end + 1)
	}

	/// Shows a select prompt and returns the chosen options.
	fn prompt(&mut self, block: &SelectBlock, line: usize) -> ScriptResult<Vec<String>> {
		let title = self.substitute(&block.title, line)?;
		let items = self.substitute_all(&block.items, line)?;
		let previews = block.previews.as_ref().map(|p| self.substitute_all(p, line)).transpose()?;
		let descriptions = block.descriptions.as_ref().map(|d| self.substitute_all(d, line)).transpose()?;

		let prompt = SelectPrompt::new(title, items, previews, descriptions, block.is_multi, &self.settings.data_path);
		let chosen = self.functions.select(&prompt).map_err(host(line))?;

		if !block.is_multi && chosen.len() != 1 {
			let reason = format!("a single select needs exactly one option, but {} were chosen", chosen.len());
			return Err(ExecutionError::InvalidSelection { line, reason }.into());
		}

		if let Some(bad) = chosen.iter().find(|i| **i >= prompt.items.len()) {
			let reason = format!("option {bad} is out of range for {} options", prompt.items.len());
			return Err(ExecutionError::InvalidSelection { line, reason }.into());
		}

		let results: Vec<String> = chosen.into_iter().map(|i| prompt.items[i].clone()).collect();
		info!("Selected {} on line {line}.", results.iter().map(|r| format!("'{r}'")).join(", "));
		Ok(results)
	}

	/// Opens a select block and jumps to its first case.
	fn open_select(&self, frames: &mut Vec<Frame>, script: &Script, pc: usize, results: Vec<String>) -> ExecutionResult<usize> {
		let line = script.statements().get(pc).map_or(0, |s| s.line);
		let Link::Select { first_case, .. } = script.link(pc) else { return Err(bad_nesting(line, "Select")) };

		frames.push(Frame::Select { start: pc, results, matched: Vec::new() });
		Ok(first_case)
	}

	/// Runs the lines given to 'ExecLines' as a program of their own.
	fn exec_lines(&mut self, text: &str, line: usize) -> ScriptResult<Completion> {
		let source = text.split('|').join("\n");
		let script = Script::parse(&source).map_err(|e| ExecutionError::Nested { line, source: Box::new(e) })?;

		if self.exec_depth >= MAX_EXEC_DEPTH {
			return Err(ExecutionError::NestedTooDeep { line, limit: MAX_EXEC_DEPTH }.into());
		}

		debug!("Running {} statements from 'ExecLines' on line {line}.", script.len());
		self.exec_depth += 1;
		let completion = self.execute(&script);
		self.exec_depth -= 1;

		completion
	}
}

/// Ends the case before this one, then opens this one if it matches.
/// A 'Case' matches a chosen value that no earlier case of the select used, and a 'Default' matches if no case ran.
fn enter_case(frames: &mut Vec<Frame>, pc: usize, value: Option<String>, line: usize) -> ExecutionResult<bool> {
	if matches!(frames.last(), Some(Frame::Case { .. })) {
		frames.pop();
	}

	let Some(Frame::Select { results, matched, .. }) = frames.last_mut() else {
		return Err(bad_nesting(line, "Case"));
	};

	let active = match value {
		Some(value) if results.contains(&value) && !matched.contains(&value) => {
			debug!("Case '{value}' matched on line {line}.");
			matched.push(value);
			true
		},
		Some(_) => false,
		None => matched.is_empty(),
	};

	if active {
		frames.push(Frame::Case { start: pc });
	}

	Ok(active)
}

/// Pops frames until the one opened at *start* is on top.
fn unwind_to(frames: &mut Vec<Frame>, start: usize, line: usize, kind: TokenType) -> ExecutionResult<()> {
	if !frames.iter().any(|f| f.start() == start) {
		return Err(bad_nesting(line, kind.keyword()));
	}

	while frames.last().is_some_and(|f| f.start() != start) {
		frames.pop();
	}

	Ok(())
}

/// Pops the innermost frame, which has to be the kind *expected* accepts.
fn close(frames: &mut Vec<Frame>, line: usize, kind: TokenType, expected: impl Fn(&Frame) -> bool) -> ExecutionResult<()> {
	match frames.pop() {
		Some(frame) if expected(&frame) => Ok(()),
		_ => Err(bad_nesting(line, kind.keyword())),
	}
}

fn bad_nesting(line: usize, keyword: &'static str) -> ExecutionError {
	ExecutionError::BadNesting { line, keyword }
}

/// Wraps a failed host call into an *ExecutionError* for a line.
pub(super) fn host(line: usize) -> impl FnOnce(anyhow::Error) -> ExecutionError {
	move |source| ExecutionError::Host { line, source }
}

pub(super) fn parse_int(value: &str, line: usize) -> ExecutionResult<i64> {
	value.trim().parse().map_err(|_| ExecutionError::InvalidNumber { line, value: value.to_owned() })
}

pub(super) fn parse_float(value: &str, line: usize) -> ExecutionResult<f64> {
	value.trim().parse().map_err(|_| ExecutionError::InvalidNumber { line, value: value.to_owned() })
}

pub(super) fn parse_version(value: &str, line: usize) -> ExecutionResult<Version> {
	value.parse().map_err(|_| ExecutionError::InvalidVersion { line, value: value.to_owned() })
}

pub(super) fn parse_bool(value: &str, line: usize) -> ExecutionResult<bool> {
	match value.trim() {
		v if v.eq_ignore_ascii_case("true") => Ok(true),
		v if v.eq_ignore_ascii_case("false") => Ok(false),
		_ => Err(ExecutionError::InvalidArgument { line, value: value.to_owned(), expected: "'True' or 'False'" }),
	}
}

/// Turns a '*' and '?' wildcard into a case-insensitive regex over a whole name.
pub(super) fn wildcard_regex(pattern: &str) -> Result<Regex, regex::Error> {
	let body: String = pattern.chars()
		.map(|c| match c {
			'*' => ".*".to_owned(),
			'?' => ".".to_owned(),
			c => regex::escape(&c.to_string()),
		})
		.collect();

	Regex::new(&format!("(?i)^{body}$"))
}

/// Reads a text file that was extracted from the OMOD.
pub(super) fn read_extracted_text(path: &Path, line: usize) -> ExecutionResult<String> {
	let bytes = fs::read(path).map_err(|source| ExecutionError::IO { line, source })?;
	Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn wildcards_match_whole_names() {
		let regex = wildcard_regex("*.DDS").unwrap();
		assert!(regex.is_match("a.dds"));
		assert!(!regex.is_match("a.dds.bak"));
		assert!(wildcard_regex("a?c").unwrap().is_match("abc"));
		assert!(!wildcard_regex("a.c").unwrap().is_match("abc"));
	}

	#[test]
	fn booleans_ignore_case() {
		assert!(parse_bool("TRUE", 1).unwrap());
		assert!(!parse_bool("false", 1).unwrap());
		assert!(matches!(parse_bool("yes", 1), Err(ExecutionError::InvalidArgument { .. })));
	}
}

//! This module carries out every statement that isn't control flow.
//! Each one either changes the install plan, sets a variable, or calls into the host.

use std::sync::Arc;

use regex::Regex;

use crate::{
	omod::{is_safe_relative, normalize_path, strip_folder, OmodEntry},
	prelude::*,
	structs::{
		error::FileKind,
		plan::{
			ConflictData, ConflictKind, ConflictLevel, DeactivationStatus, EditXmlInfo, FilePatch, IniEdit, PluginEdit,
			PluginEditKind, PluginValue, SdpEdit, SetPluginInfo, XmlEdit,
		},
	},
};

use super::{
	engine::{host, parse_bool, read_extracted_text, ScriptRunner},
	expr::{eval_float, eval_int},
	token::TokenType,
};

impl ScriptRunner<'_> {
	/// Runs a single statement whose arguments are already substituted.
	pub(super) fn run_instruction(&mut self, kind: TokenType, args: &[String], line: usize) -> ScriptResult<()> {
		let optional = |i: usize| args.get(i).map(String::as_str);

		match kind {
			TokenType::InstallAllPlugins => self.install_all(FileKind::Plugin),
			TokenType::InstallAllDataFiles => self.install_all(FileKind::Data),
			TokenType::DontInstallAnyPlugins => self.plan.plugin_files.clear(),
			TokenType::DontInstallAnyDataFiles => self.plan.data_files.clear(),

			TokenType::InstallPlugin => {
				let entry = self.entry(FileKind::Plugin, &args[0], line)?;
				self.plan.install_plugin(&entry, &entry.name);
			},
			TokenType::DontInstallPlugin => {
				let entry = self.entry(FileKind::Plugin, &args[0], line)?;
				self.plan.remove_plugin(&entry.name);
			},
			TokenType::InstallDataFile => {
				let entry = self.entry(FileKind::Data, &args[0], line)?;
				self.plan.install_data_file(&entry, &entry.name);
			},
			TokenType::DontInstallDataFile => {
				let entry = self.entry(FileKind::Data, &args[0], line)?;
				self.plan.remove_data_file(&entry.name);
			},

			TokenType::InstallDataFolder | TokenType::DontInstallDataFolder => {
				let recurse = optional(1).map(|r| parse_bool(r, line)).transpose()?.unwrap_or(false);
				let entries = self.folder_entries(&args[0], recurse, line)?;

				for entry in entries.iter() {
					match kind {
						TokenType::InstallDataFolder => self.plan.install_data_file(entry, &entry.name),
						_ => { self.plan.remove_data_file(&entry.name); },
					}
				}
			},

			TokenType::CopyPlugin => {
				let entry = self.entry(FileKind::Plugin, &args[0], line)?;
				let output = safe_output(&args[1], line)?;
				self.plan.install_plugin(&entry, &output);
			},
			TokenType::CopyDataFile => {
				let entry = self.entry(FileKind::Data, &args[0], line)?;
				let output = safe_output(&args[1], line)?;
				self.plan.install_data_file(&entry, &output);
			},
			TokenType::CopyDataFolder => {
				let recurse = optional(2).map(|r| parse_bool(r, line)).transpose()?.unwrap_or(false);
				let target = safe_output(&args[1], line)?;

				for entry in self.folder_entries(&args[0], recurse, line)? {
					let rest = strip_folder(&entry.name, &args[0]).unwrap_or(entry.file_name());
					let output = normalize_path(&format!("{target}\\{rest}"));
					self.plan.install_data_file(&entry, &output);
				}
			},

			TokenType::UncheckESP => {
				self.stage_plugin(&args[0], line)?;
				self.plan.plugin_flags_mut(&args[0]).is_unchecked = true;
			},
			TokenType::LoadEarly => {
				self.stage_plugin(&args[0], line)?;
				self.plan.plugin_flags_mut(&args[0]).load_early = true;
			},
			TokenType::SetDeactivationWarning => {
				let Some(status) = DeactivationStatus::from_name(&args[1]) else {
					return Err(invalid(line, &args[1], "'Allow', 'WarnAgainst', or 'Disallow'"));
				};

				self.stage_plugin(&args[0], line)?;
				self.plan.plugin_flags_mut(&args[0]).deactivation = Some(status);
			},
			TokenType::LoadBefore | TokenType::LoadAfter => {
				self.stage_plugin(&args[0], line)?;
				let flags = self.plan.plugin_flags_mut(&args[0]);
				let order = match kind {
					TokenType::LoadBefore => &mut flags.load_before,
					_ => &mut flags.load_after,
				};

				if !order.iter().any(|p| p.eq_ignore_ascii_case(&args[1])) {
					order.push(args[1].clone());
				}
			},

			TokenType::ConflictsWith | TokenType::DependsOn | TokenType::ConflictsWithRegex | TokenType::DependsOnRegex => {
				let conflict = build_conflict(kind, args, line)?;
				debug!("Declared {:?} on '{}'.", conflict.kind, conflict.file);
				self.plan.conflicts.push(conflict);
			},

			TokenType::EditINI => {
				let edit = IniEdit { section: args[0].clone(), key: args[1].clone(), value: args[2].clone() };
				if self.plan.ini_edits.merge(edit) {
					debug!("Replaced an earlier edit of '[{}] {}'.", args[0], args[1]);
				}
			},
			TokenType::EditSDP | TokenType::EditShader => {
				let package = args[0].trim().parse().map_err(|_| ExecutionError::InvalidNumber { line, value: args[0].clone() })?;
				let binary = self.entry(FileKind::Data, &args[2], line)?;
				self.plan.sdp_edits.merge(SdpEdit { package, shader: args[1].clone(), binary });
			},
			TokenType::SetGMST | TokenType::SetGlobal => {
				let kind = match kind {
					TokenType::SetGMST => PluginEditKind::Gmst,
					_ => PluginEditKind::Global,
				};

				let plugin = self.entry(FileKind::Plugin, &args[0], line)?;
				self.plan.plugin_edits.merge(PluginEdit { kind, plugin, editor_id: args[1].clone(), value: args[2].clone() });
			},
			TokenType::SetPluginByte
			| TokenType::SetPluginShort
			| TokenType::SetPluginInt
			| TokenType::SetPluginLong
			| TokenType::SetPluginFloat => {
				let plugin = self.entry(FileKind::Plugin, &args[0], line)?;
				let offset = parse_number(&args[1], line)?;
				let value = match kind {
					TokenType::SetPluginByte => PluginValue::Byte(parse_number(&args[2], line)?),
					TokenType::SetPluginShort => PluginValue::Short(parse_number(&args[2], line)?),
					TokenType::SetPluginInt => PluginValue::Int(parse_number(&args[2], line)?),
					TokenType::SetPluginLong => PluginValue::Long(parse_number(&args[2], line)?),
					_ => PluginValue::Float(parse_number(&args[2], line)?),
				};

				self.plan.set_plugin_infos.merge(SetPluginInfo { plugin, offset, value });
			},
			TokenType::EditXMLLine => {
				let file = self.entry(FileKind::Data, &args[0], line)?;
				let edit = XmlEdit::Line { line: parse_number(&args[1], line)?, value: args[2].clone() };
				self.plan.xml_edits.merge(EditXmlInfo { file, edit });
			},
			TokenType::EditXMLReplace => {
				let file = self.entry(FileKind::Data, &args[0], line)?;
				let edit = XmlEdit::Replace { find: args[1].clone(), replace: args[2].clone() };
				self.plan.xml_edits.merge(EditXmlInfo { file, edit });
			},
			TokenType::PatchPlugin | TokenType::PatchDataFile => {
				let file_kind = match kind {
					TokenType::PatchPlugin => FileKind::Plugin,
					_ => FileKind::Data,
				};

				let source = self.entry(file_kind, &args[0], line)?;
				let target = safe_output(&args[1], line)?;
				let create = optional(2).map(|c| parse_bool(c, line)).transpose()?.unwrap_or(false);
				self.plan.file_patches.merge(FilePatch { kind: file_kind.into(), source, target, create });
			},
			TokenType::RegisterBSA | TokenType::UnregisterBSA => {
				if args[0].contains([',', ';', '=']) {
					return Err(invalid(line, &args[0], "a BSA name without ',', ';', or '='"));
				}

				match kind {
					TokenType::RegisterBSA => self.plan.register_bsa(&args[0]),
					_ => self.plan.unregister_bsa(&args[0]),
				}
			},

			TokenType::Message => self.functions.message(&args[0], optional(1)).map_err(host(line))?,
			TokenType::DisplayImage => {
				let entry = self.entry(FileKind::Data, &args[0], line)?;
				let path = self.settings.data_path.join(entry.name.replace('\\', "/"));
				self.functions.display_image(&path, optional(1)).map_err(host(line))?;
			},
			TokenType::DisplayText => {
				let entry = self.entry(FileKind::Data, &args[0], line)?;
				if self.settings.dry_run {
					info!("Skipping 'DisplayText' of '{}' on line {line}, as this is a dry run.", entry.name);
					return Ok(());
				}

				let text = read_extracted_text(&self.settings.data_path.join(entry.name.replace('\\', "/")), line)?;
				self.functions.display_text(&text, optional(1)).map_err(host(line))?;
			},
			TokenType::InputString => {
				let value = self.functions.input_string(optional(1), optional(2).unwrap_or_default()).map_err(host(line))?;
				self.set(&args[0], value);
			},

			TokenType::GetFolderName => {
				let path = normalize_path(&args[1]);
				let folder = path.rsplit_once('\\').map(|(dir, _)| dir).unwrap_or_default();
				let name = folder.rsplit('\\').next().unwrap_or_default().to_owned();
				self.set(&args[0], name);
			},
			TokenType::GetDirectoryName => {
				let path = normalize_path(&args[1]);
				let dir = path.rsplit_once('\\').map(|(dir, _)| dir).unwrap_or_default().to_owned();
				self.set(&args[0], dir);
			},
			TokenType::GetFileName => {
				let path = normalize_path(&args[1]);
				let name = path.rsplit('\\').next().unwrap_or_default().to_owned();
				self.set(&args[0], name);
			},
			TokenType::GetFileNameWithoutExtension => {
				let path = normalize_path(&args[1]);
				let name = path.rsplit('\\').next().unwrap_or_default();
				let stem = match name.rfind('.') {
					Some(dot) if dot > 0 => &name[..dot],
					_ => name,
				};
				self.set(&args[0], stem.to_owned());
			},
			TokenType::CombinePaths => {
				let combined = normalize_path(&format!("{}\\{}", args[1], args[2]));
				self.set(&args[0], combined);
			},
			TokenType::Substring | TokenType::RemoveString => {
				let chars: Vec<char> = args[1].chars().collect();
				let start: usize = parse_number(&args[2], line)?;
				let length = optional(3).map(|l| parse_number::<usize>(l, line)).transpose()?;

				let end = length.map_or(chars.len(), |l| start.saturating_add(l));
				if start > chars.len() || end > chars.len() {
					return Err(ExecutionError::OutOfRange { line, start, end, length: chars.len() }.into());
				}

				let result: String = match kind {
					TokenType::Substring => chars[start..end].iter().collect(),
					_ => chars[..start].iter().chain(&chars[end..]).collect(),
				};
				self.set(&args[0], result);
			},
			TokenType::StringLength => {
				let length = args[1].chars().count();
				self.set(&args[0], length.to_string());
			},
			TokenType::ISet | TokenType::FSet => {
				let expression = args[1..].join(" ");
				let value = match kind {
					TokenType::ISet => eval_int(&expression).map(|v| v.to_string()),
					_ => eval_float(&expression).map(|v| v.to_string()),
				};

				let value = value.map_err(|e| ExecutionError::MalformedExpression { line, expression, reason: e.to_string() })?;
				self.set(&args[0], value);
			},
			TokenType::ReadINI => {
				let value = self.functions.read_ini(&args[1], &args[2]).map_err(host(line))?;
				self.set(&args[0], value);
			},
			TokenType::ReadRendererInfo => {
				let value = self.functions.read_renderer_info(&args[1]).map_err(host(line))?;
				self.set(&args[0], value);
			},
			TokenType::AllowRunOnLines => debug!("'AllowRunOnLines' has no effect; continuations are always joined."),

			other => return Err(ExecutionError::BadNesting { line, keyword: other.keyword() }.into()),
		}

		Ok(())
	}

	fn set(&mut self, variable: &str, value: String) {
		debug!("Set '{variable}' to '{value}'.");
		self.variables.insert(variable.to_owned(), value);
	}

	/// Looks up a file the OMOD ships, failing if it doesn't exist.
	fn entry(&self, kind: FileKind, name: &str, line: usize) -> ExecutionResult<Arc<OmodEntry>> {
		self.files.find(kind, name)
			.cloned()
			.ok_or_else(|| ExecutionError::MissingFile { line, kind, name: name.to_owned() })
	}

	/// Returns every data file inside a folder, failing if there are none.
	fn folder_entries(&self, folder: &str, recurse: bool, line: usize) -> ExecutionResult<Vec<Arc<OmodEntry>>> {
		let entries: Vec<_> = self.files.in_folder(FileKind::Data, folder, recurse).cloned().collect();
		if entries.is_empty() {
			return Err(ExecutionError::MissingFolder { line, name: folder.to_owned() });
		}

		Ok(entries)
	}

	fn install_all(&mut self, kind: FileKind) {
		for entry in self.files.entries(kind) {
			match kind {
				FileKind::Data => self.plan.install_data_file(entry, &entry.name),
				FileKind::Plugin => self.plan.install_plugin(entry, &entry.name),
			}
		}
	}

	/// Makes sure a plugin is staged before metadata is attached to it.
	fn stage_plugin(&mut self, name: &str, line: usize) -> ExecutionResult<()> {
		if self.plan.has_plugin(name) {
			return Ok(());
		}

		let entry = self.entry(FileKind::Plugin, name, line)?;
		self.plan.install_plugin(&entry, &entry.name);
		Ok(())
	}
}

/// Builds a conflict record from one of its six argument shapes.
fn build_conflict(kind: TokenType, args: &[String], line: usize) -> ExecutionResult<ConflictData> {
	let is_regex = matches!(kind, TokenType::ConflictsWithRegex | TokenType::DependsOnRegex);
	let conflict_kind = match kind {
		TokenType::DependsOn | TokenType::DependsOnRegex => ConflictKind::Dependency,
		_ => ConflictKind::Conflict,
	};

	if is_regex {
		Regex::new(&args[0]).map_err(|source| ExecutionError::InvalidPattern { line, pattern: args[0].clone(), source })?;
	}

	let (min_version, max_version, tail) = match args.len() {
		5..=7 => {
			let part = |i: usize| parse_number::<u32>(&args[i], line);
			let min = Version::from_major_minor(part(1)?, part(2)?);
			let max = Version::from_major_minor(part(3)?, part(4)?);
			let bound = |v: Version| (v != Version::default()).then_some(v);

			(bound(min), bound(max), &args[5..])
		},
		_ => (None, None, &args[1..]),
	};

	let level = match tail.get(1) {
		Some(level) => ConflictLevel::from_name(level).ok_or_else(|| ExecutionError::InvalidArgument {
			line,
			value: level.clone(),
			expected: "'Unusable', 'Major', or 'Minor'",
		})?,
		None => ConflictLevel::default(),
	};

	Ok(ConflictData {
		kind: conflict_kind,
		file: args[0].clone(),
		is_regex,
		min_version,
		max_version,
		comment: tail.first().cloned(),
		level,
	})
}

/// Checks that an output path stays inside the data folder, and normalizes it.
fn safe_output(path: &str, line: usize) -> ExecutionResult<String> {
	if !is_safe_relative(path) || normalize_path(path).is_empty() {
		return Err(ExecutionError::InvalidPath { line, path: path.to_owned() });
	}

	Ok(normalize_path(path))
}

fn parse_number<T: std::str::FromStr>(value: &str, line: usize) -> ExecutionResult<T> {
	value.trim().parse().map_err(|_| ExecutionError::InvalidNumber { line, value: value.to_owned() })
}

fn invalid(line: usize, value: &str, expected: &'static str) -> ScriptError {
	ExecutionError::InvalidArgument { line, value: value.to_owned(), expected }.into()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn strings(args: &[&str]) -> Vec<String> {
		args.iter().map(|a| a.to_string()).collect()
	}

	#[test]
	fn conflicts_accept_every_shape() {
		let plain = build_conflict(TokenType::ConflictsWith, &strings(&["a.esp"]), 1).unwrap();
		assert_eq!(plain.level, ConflictLevel::Major);
		assert_eq!(plain.comment, None);

		let described = build_conflict(TokenType::DependsOn, &strings(&["a.esp", "needed", "Unusable"]), 1).unwrap();
		assert_eq!(described.kind, ConflictKind::Dependency);
		assert_eq!(described.comment.as_deref(), Some("needed"));
		assert_eq!(described.level, ConflictLevel::Unusable);

		let ranged = build_conflict(TokenType::ConflictsWith, &strings(&["a.esp", "1", "2", "0", "0", "old", "Minor"]), 1).unwrap();
		assert_eq!(ranged.min_version, Some(Version::from_major_minor(1, 2)));
		assert_eq!(ranged.max_version, None);
		assert_eq!(ranged.comment.as_deref(), Some("old"));
		assert_eq!(ranged.level, ConflictLevel::Minor);
	}

	#[test]
	fn conflict_arguments_are_validated() {
		assert!(matches!(
			build_conflict(TokenType::ConflictsWithRegex, &strings(&["a(.esp"]), 1),
			Err(ExecutionError::InvalidPattern { .. })
		));
		assert!(matches!(
			build_conflict(TokenType::ConflictsWith, &strings(&["a.esp", "x", "Severe"]), 1),
			Err(ExecutionError::InvalidArgument { .. })
		));
		assert!(matches!(
			build_conflict(TokenType::ConflictsWith, &strings(&["a.esp", "one", "0", "0", "0"]), 1),
			Err(ExecutionError::InvalidNumber { .. })
		));
	}

	#[test]
	fn outputs_stay_inside_the_data_folder() {
		assert_eq!(safe_output("textures/a.dds", 1).unwrap(), "textures\\a.dds");
		assert!(safe_output("..\\oblivion.ini", 1).is_err());
		assert!(safe_output("C:\\Windows", 1).is_err());
		assert!(safe_output("", 1).is_err());
	}
}

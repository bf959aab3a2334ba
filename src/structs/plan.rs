//! This module defines *ScriptReturnData*, the install plan a script run produces.
//! The engine fills it in statement by statement, and the extraction stage reads it once the run is finished.

use std::{fmt::Display, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{omod::{normalize_path, OmodEntry}, prelude::*, structs::error::FileKind};

/// Builds the case-insensitive key a plan uses for an output path.
pub fn path_key(path: &str) -> String {
	normalize_path(path).to_lowercase()
}

/// A record that is identified by its target, so a second record for the same target replaces the first.
pub trait PlanKey {
	/// Returns the identity of whatever this record edits.
	fn plan_key(&self) -> String;
}

/// An insertion-ordered set of records with add-or-merge semantics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EditSet<T> {
	entries: IndexMap<String, T>,
}

impl<T> Default for EditSet<T> {
	fn default() -> Self {
		Self { entries: IndexMap::new() }
	}
}

impl<T: PlanKey> EditSet<T> {
	/// Adds a record, or replaces the existing record with the same target.
	/// Replaced records keep their original position.
	/// Returns true if a record was replaced.
	pub fn merge(&mut self, item: T) -> bool {
		self.entries.insert(item.plan_key(), item).is_some()
	}
}

impl<T> EditSet<T> {
	/// Iterates over every record, in the order they were first added.
	pub fn iter(&self) -> impl Iterator<Item = &T> {
		self.entries.values()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// A data file the plan installs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFile {
	/// The file inside the OMOD this is copied from.
	pub source: Arc<OmodEntry>,

	/// Where the file lands, relative to the game's data folder.
	pub output: String,
}

/// How the user is warned when they deactivate a plugin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeactivationStatus {
	Allow,
	WarnAgainst,
	Disallow,
}

impl DeactivationStatus {
	/// Resolves a status name, ignoring case.
	pub fn from_name(name: &str) -> Option<Self> {
		[DeactivationStatus::Allow, DeactivationStatus::WarnAgainst, DeactivationStatus::Disallow]
			.into_iter()
			.find(|s| format!("{s:?}").eq_ignore_ascii_case(name))
	}
}

/// Load-order and activation metadata for a plugin.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginFlags {
	/// The plugin is installed but left inactive.
	pub is_unchecked: bool,

	/// The plugin should be placed as early in the load order as possible.
	pub load_early: bool,

	/// Plugins this one must load before.
	pub load_before: Vec<String>,

	/// Plugins this one must load after.
	pub load_after: Vec<String>,

	pub deactivation: Option<DeactivationStatus>,
}

/// A plugin the plan installs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginFile {
	/// The plugin inside the OMOD this is copied from.
	pub source: Arc<OmodEntry>,

	/// The plugin's file name once installed.
	pub output: String,

	pub flags: PluginFlags,
}

/// Whether a declared relationship is a conflict or a dependency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictKind {
	Conflict,
	Dependency,
}

/// How serious a declared conflict is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictLevel {
	Unusable,
	#[default]
	Major,
	Minor,
}

impl ConflictLevel {
	/// Resolves a level name, ignoring case.
	pub fn from_name(name: &str) -> Option<Self> {
		[ConflictLevel::Unusable, ConflictLevel::Major, ConflictLevel::Minor]
			.into_iter()
			.find(|l| format!("{l:?}").eq_ignore_ascii_case(name))
	}
}

/// A conflict or dependency this OMOD declares against other mods.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictData {
	pub kind: ConflictKind,

	/// The other mod's file name, or a pattern if *is_regex* is set.
	pub file: String,
	pub is_regex: bool,

	pub min_version: Option<Version>,
	pub max_version: Option<Version>,
	pub comment: Option<String>,
	pub level: ConflictLevel,
}

/// A pending change to Oblivion.ini.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IniEdit {
	pub section: String,
	pub key: String,
	pub value: String,
}

impl PlanKey for IniEdit {
	fn plan_key(&self) -> String {
		format!("{}\u{1f}{}", self.section.to_lowercase(), self.key.to_lowercase())
	}
}

/// A pending replacement of a compiled shader inside a shader package.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdpEdit {
	/// The shader package's number, as in 'shaderpackage019.sdp'.
	pub package: u8,
	pub shader: String,

	/// The compiled shader inside the OMOD's data files.
	pub binary: Arc<OmodEntry>,
}

impl PlanKey for SdpEdit {
	fn plan_key(&self) -> String {
		format!("{}\u{1f}{}", self.package, self.shader.to_lowercase())
	}
}

/// Whether a plugin record edit targets a game setting or a global.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PluginEditKind {
	Gmst,
	Global,
}

/// A pending change to a game setting or global inside a plugin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginEdit {
	pub kind: PluginEditKind,
	pub plugin: Arc<OmodEntry>,
	pub editor_id: String,
	pub value: String,
}

impl PlanKey for PluginEdit {
	fn plan_key(&self) -> String {
		format!("{}\u{1f}{:?}\u{1f}{}", self.plugin.name.to_lowercase(), self.kind, self.editor_id.to_lowercase())
	}
}

/// A typed value written straight into a plugin's bytes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PluginValue {
	Byte(u8),
	Short(i16),
	Int(i32),
	Long(i64),
	Float(f32),
}

impl PluginValue {
	/// Returns the little-endian bytes this value is written as.
	pub fn to_bytes(&self) -> Vec<u8> {
		match self {
			PluginValue::Byte(v) => v.to_le_bytes().to_vec(),
			PluginValue::Short(v) => v.to_le_bytes().to_vec(),
			PluginValue::Int(v) => v.to_le_bytes().to_vec(),
			PluginValue::Long(v) => v.to_le_bytes().to_vec(),
			PluginValue::Float(v) => v.to_le_bytes().to_vec(),
		}
	}
}

/// A pending write of a value at a fixed offset inside a plugin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetPluginInfo {
	pub plugin: Arc<OmodEntry>,
	pub offset: u64,
	pub value: PluginValue,
}

impl PlanKey for SetPluginInfo {
	fn plan_key(&self) -> String {
		format!("{}\u{1f}{}", self.plugin.name.to_lowercase(), self.offset)
	}
}

/// What an XML edit changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum XmlEdit {
	/// Replaces a whole line, counted from zero.
	Line { line: usize, value: String },

	/// Replaces every occurrence of some text.
	Replace { find: String, replace: String },
}

/// A pending text edit of an XML file shipped in the OMOD.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditXmlInfo {
	pub file: Arc<OmodEntry>,
	pub edit: XmlEdit,
}

impl PlanKey for EditXmlInfo {
	fn plan_key(&self) -> String {
		let target = match &self.edit {
			XmlEdit::Line { line, .. } => format!("line:{line}"),
			XmlEdit::Replace { find, .. } => format!("find:{find}"),
		};

		format!("{}\u{1f}{target}", self.file.name.to_lowercase())
	}
}

/// A pending overwrite of a file that is already in the game's data folder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePatch {
	/// Whether the patch comes from the OMOD's plugins or data files.
	pub kind: PatchKind,
	pub source: Arc<OmodEntry>,

	/// The file being patched, relative to the game's data folder.
	pub target: String,

	/// If set, the patch is applied even when the target doesn't exist yet.
	pub create: bool,
}

/// Serializable mirror of *FileKind* for patches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatchKind {
	Data,
	Plugin,
}

impl From<FileKind> for PatchKind {
	fn from(value: FileKind) -> Self {
		match value {
			FileKind::Data => PatchKind::Data,
			FileKind::Plugin => PatchKind::Plugin,
		}
	}
}

impl PlanKey for FilePatch {
	fn plan_key(&self) -> String {
		format!("{:?}\u{1f}{}", self.kind, path_key(&self.target))
	}
}

/// The install plan a script run produces.
/// Files are keyed by their case-insensitive output path, so staging the same output twice keeps only the latest source.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScriptReturnData {
	pub data_files: IndexMap<String, DataFile>,
	pub plugin_files: IndexMap<String, PluginFile>,
	pub conflicts: Vec<ConflictData>,
	pub ini_edits: EditSet<IniEdit>,
	pub sdp_edits: EditSet<SdpEdit>,
	pub plugin_edits: EditSet<PluginEdit>,
	pub set_plugin_infos: EditSet<SetPluginInfo>,
	pub xml_edits: EditSet<EditXmlInfo>,
	pub file_patches: EditSet<FilePatch>,
	pub registered_bsas: IndexSet<String>,
	pub unregistered_bsas: IndexSet<String>,

	/// Plugin metadata collected during the run, keyed like *plugin_files*.
	/// This is folded into *plugin_files* by *ScriptReturnData::finalize*.
	#[serde(skip)]
	pending_flags: IndexMap<String, PluginFlags>,
}

impl ScriptReturnData {
	/// Stages a data file, replacing whatever was staged for the same output.
	pub fn install_data_file(&mut self, source: &Arc<OmodEntry>, output: &str) {
		let output = normalize_path(output);
		debug!("Staging data file '{}' as '{output}'.", source.name);

		self.data_files.insert(path_key(&output), DataFile { source: Arc::clone(source), output });
	}

	/// Unstages a data file by its output path.
	pub fn remove_data_file(&mut self, output: &str) -> bool {
		self.data_files.shift_remove(&path_key(output)).is_some()
	}

	/// Stages a plugin, replacing whatever was staged for the same output but keeping its flags.
	pub fn install_plugin(&mut self, source: &Arc<OmodEntry>, output: &str) {
		let output = normalize_path(output);
		debug!("Staging plugin '{}' as '{output}'.", source.name);

		let key = path_key(&output);
		let flags = self.plugin_files.get(&key).map(|p| p.flags.clone()).unwrap_or_default();
		self.plugin_files.insert(key, PluginFile { source: Arc::clone(source), output, flags });
	}

	/// Unstages a plugin by its output name.
	pub fn remove_plugin(&mut self, output: &str) -> bool {
		self.plugin_files.shift_remove(&path_key(output)).is_some()
	}

	/// Checks if a plugin is currently staged under an output name.
	pub fn has_plugin(&self, output: &str) -> bool {
		self.plugin_files.contains_key(&path_key(output))
	}

	/// Returns the metadata collected for a plugin, creating it if needed.
	pub fn plugin_flags_mut(&mut self, plugin: &str) -> &mut PluginFlags {
		self.pending_flags.entry(path_key(plugin)).or_default()
	}

	/// Marks a BSA for registration, cancelling a pending unregistration of it.
	pub fn register_bsa(&mut self, name: &str) {
		let name = name.to_lowercase();
		self.unregistered_bsas.shift_remove(&name);
		self.registered_bsas.insert(name);
	}

	/// Marks a BSA for unregistration, cancelling a pending registration of it.
	pub fn unregister_bsa(&mut self, name: &str) {
		let name = name.to_lowercase();
		self.registered_bsas.shift_remove(&name);
		self.unregistered_bsas.insert(name);
	}

	/// Finishes the plan once the script is done.
	/// Collected plugin metadata is moved onto the plugins that ended up staged,
	/// and conflicts declared twice are only kept once.
	pub fn finalize(mut self) -> Self {
		for (key, flags) in self.pending_flags.drain(..) {
			match self.plugin_files.get_mut(&key) {
				Some(plugin) => plugin.flags = flags,
				None => warn!("Dropping load order and activation settings for '{key}', as it is not being installed."),
			}
		}

		let mut seen: Vec<ConflictData> = Vec::with_capacity(self.conflicts.len());
		for conflict in self.conflicts.drain(..) {
			if !seen.contains(&conflict) { seen.push(conflict); }
		}
		self.conflicts = seen;

		info!(
			"Finished install plan: {} data files, {} plugins, {} conflicts, {} edits.",
			self.data_files.len(),
			self.plugin_files.len(),
			self.conflicts.len(),
			self.edit_count(),
		);

		self
	}

	/// Returns the number of pending edits of every kind.
	pub fn edit_count(&self) -> usize {
		self.ini_edits.len()
			+ self.sdp_edits.len()
			+ self.plugin_edits.len()
			+ self.set_plugin_infos.len()
			+ self.xml_edits.len()
			+ self.file_patches.len()
	}

	/// Returns the output paths of every staged data file.
	pub fn data_outputs(&self) -> Vec<&str> {
		self.data_files.values().map(|f| f.output.as_str()).collect()
	}

	/// Returns the output names of every staged plugin.
	pub fn plugin_outputs(&self) -> Vec<&str> {
		self.plugin_files.values().map(|f| f.output.as_str()).collect()
	}
}

impl Display for ScriptReturnData {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		for file in self.plugin_files.values() {
			let mut notes = Vec::new();
			if file.flags.is_unchecked { notes.push("unchecked".to_owned()); }
			if file.flags.load_early { notes.push("load early".to_owned()); }
			if !file.flags.load_before.is_empty() { notes.push(format!("before {}", file.flags.load_before.join(", "))); }
			if !file.flags.load_after.is_empty() { notes.push(format!("after {}", file.flags.load_after.join(", "))); }

			writeln!(f, "plugin  {} <- {}", file.output, file.source.name)?;
			if !notes.is_empty() { writeln!(f, "        ({})", notes.join("; "))?; }
		}

		for file in self.data_files.values() {
			writeln!(f, "data    {} <- {}", file.output, file.source.name)?;
		}

		for conflict in self.conflicts.iter() {
			let verb = match conflict.kind {
				ConflictKind::Conflict => "conflicts with",
				ConflictKind::Dependency => "depends on",
			};
			writeln!(f, "note    {verb} {} ({:?})", conflict.file, conflict.level)?;
		}

		for bsa in self.registered_bsas.iter() {
			writeln!(f, "bsa     register {bsa}")?;
		}

		for bsa in self.unregistered_bsas.iter() {
			writeln!(f, "bsa     unregister {bsa}")?;
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn entry(name: &str) -> Arc<OmodEntry> {
		Arc::new(OmodEntry::new(name, 0, 0, 0))
	}

	#[test]
	fn last_write_wins_by_output_path() {
		let mut plan = ScriptReturnData::default();
		plan.install_data_file(&entry("x"), "y");
		plan.install_data_file(&entry("z"), "Y");

		assert_eq!(plan.data_files.len(), 1);
		assert_eq!(plan.data_files[0].source.name, "z");
	}

	#[test]
	fn reinstalling_a_plugin_keeps_its_flags() {
		let mut plan = ScriptReturnData::default();
		plan.install_plugin(&entry("a.esp"), "a.esp");
		plan.plugin_flags_mut("A.ESP").is_unchecked = true;
		plan.install_plugin(&entry("b.esp"), "a.esp");

		let plan = plan.finalize();
		assert!(plan.plugin_files[0].flags.is_unchecked);
		assert_eq!(plan.plugin_files[0].source.name, "b.esp");
	}

	#[test]
	fn flags_for_missing_plugins_are_dropped() {
		let mut plan = ScriptReturnData::default();
		plan.plugin_flags_mut("gone.esp").load_early = true;

		let plan = plan.finalize();
		assert!(plan.plugin_files.is_empty());
	}

	#[test]
	fn edits_merge_on_their_target() {
		let mut edits = EditSet::default();
		assert!(!edits.merge(IniEdit { section: "General".into(), key: "bBorderRegionsEnabled".into(), value: "0".into() }));
		assert!(edits.merge(IniEdit { section: "general".into(), key: "bborderregionsenabled".into(), value: "1".into() }));

		assert_eq!(edits.len(), 1);
		assert_eq!(edits.iter().next().unwrap().value, "1");
	}

	#[test]
	fn bsa_registration_cancels_out() {
		let mut plan = ScriptReturnData::default();
		plan.unregister_bsa("Textures.bsa");
		plan.register_bsa("textures.BSA");

		assert!(plan.unregistered_bsas.is_empty());
		assert!(plan.registered_bsas.contains("textures.bsa"));
	}

	#[test]
	fn duplicate_conflicts_collapse() {
		let conflict = ConflictData {
			kind: ConflictKind::Conflict,
			file: "other.esp".into(),
			is_regex: false,
			min_version: None,
			max_version: None,
			comment: None,
			level: ConflictLevel::Major,
		};

		let mut plan = ScriptReturnData::default();
		plan.conflicts.push(conflict.clone());
		plan.conflicts.push(conflict);

		assert_eq!(plan.finalize().conflicts.len(), 1);
	}

	#[test]
	fn plugin_values_are_little_endian() {
		assert_eq!(PluginValue::Short(0x0102).to_bytes(), vec![0x02, 0x01]);
		assert_eq!(PluginValue::Float(1.0).to_bytes(), 1.0f32.to_le_bytes().to_vec());
	}
}

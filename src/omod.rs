//! This module holds the handles a script uses to refer to files inside an OMOD.
//! The container itself is read elsewhere; this only describes what it holds.

use std::{fs, hash::{Hash, Hasher}, io, path::Path, sync::Arc};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::{prelude::*, structs::error::FileKind};

/// A single file inside an OMOD's data or plugin set.
/// Two entries are equal when their names match case-insensitively and their CRCs match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OmodEntry {
	/// Normalized path of this file, relative to its set's root.
	pub name: String,

	/// CRC32 of the file's uncompressed contents.
	pub crc: u32,

	/// Length of the file's uncompressed contents.
	pub length: u64,

	/// Where this file starts within its set's decompressed stream.
	pub offset: u64,
}

impl OmodEntry {
	/// Builds a new entry, normalizing its name.
	pub fn new(name: &str, crc: u32, length: u64, offset: u64) -> Self {
		Self { name: normalize_path(name), crc, length, offset }
	}

	/// Returns the name of this entry without its folders.
	pub fn file_name(&self) -> &str {
		self.name.rsplit('\\').next().unwrap_or(&self.name)
	}

	/// Checks if this entry sits inside the given folder.
	/// If *recurse* is false, only files directly inside the folder count.
	pub fn is_in_folder(&self, folder: &str, recurse: bool) -> bool {
		let Some(rest) = strip_folder(&self.name, folder) else { return false };
		recurse || !rest.contains('\\')
	}
}

impl PartialEq for OmodEntry {
	fn eq(&self, other: &Self) -> bool {
		self.crc == other.crc && self.name.eq_ignore_ascii_case(&other.name)
	}
}

impl Eq for OmodEntry {}

impl Hash for OmodEntry {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.name.to_lowercase().hash(state);
		self.crc.hash(state);
	}
}

/// The data and plugin sets of one OMOD.
/// Entries are shared with the install plan through *Arc*s.
#[derive(Clone, Debug, Default)]
pub struct OmodFiles {
	data: Vec<Arc<OmodEntry>>,
	plugins: Vec<Arc<OmodEntry>>,
}

impl OmodFiles {
	/// Builds the file sets from entries the container already read.
	pub fn new(data: Vec<OmodEntry>, plugins: Vec<OmodEntry>) -> Self {
		Self {
			data: data.into_iter().map(Arc::new).collect(),
			plugins: plugins.into_iter().map(Arc::new).collect(),
		}
	}

	/// Builds file sets from bare names, giving every entry an empty CRC and length.
	/// This is mostly useful for dry runs where only the names matter.
	pub fn from_names<S: AsRef<str>>(data: &[S], plugins: &[S]) -> Self {
		let to_entries = |names: &[S]| names.iter()
			.map(|n| OmodEntry::new(n.as_ref(), 0, 0, 0))
			.collect();

		Self::new(to_entries(data), to_entries(plugins))
	}

	/// Builds the file sets by scanning the folders an OMOD was extracted to.
	/// Missing folders are treated as empty sets.
	pub fn scan(settings: &ScriptSettings) -> io::Result<Self> {
		let data = scan_folder(&settings.data_path)?;
		let plugins = scan_folder(&settings.plugins_path)?;

		info!("Scanned {} data files and {} plugins.", data.len(), plugins.len());
		Ok(Self::new(data, plugins))
	}

	/// Returns every entry of one set.
	pub fn entries(&self, kind: FileKind) -> &[Arc<OmodEntry>] {
		match kind {
			FileKind::Data => &self.data,
			FileKind::Plugin => &self.plugins,
		}
	}

	/// Looks up an entry by its name, ignoring case and separator style.
	pub fn find(&self, kind: FileKind, name: &str) -> Option<&Arc<OmodEntry>> {
		let name = normalize_path(name);
		self.entries(kind).iter().find(|e| e.name.eq_ignore_ascii_case(&name))
	}

	/// Returns every entry of one set that sits inside a folder.
	pub fn in_folder<'a>(&'a self, kind: FileKind, folder: &'a str, recurse: bool) -> impl Iterator<Item = &'a Arc<OmodEntry>> + 'a {
		self.entries(kind).iter().filter(move |e| e.is_in_folder(folder, recurse))
	}

	/// Returns every folder implied by the entries of one set, sorted case-insensitively.
	pub fn folders(&self, kind: FileKind) -> Vec<String> {
		let mut folders: IndexSet<String> = IndexSet::new();

		for entry in self.entries(kind) {
			let mut end = 0;
			while let Some(pos) = entry.name[end..].find('\\') {
				end += pos;
				let folder = &entry.name[..end];
				if !folders.iter().any(|f| f.eq_ignore_ascii_case(folder)) {
					folders.insert(folder.to_owned());
				}
				end += 1;
			}
		}

		folders.into_iter()
			.sorted_by_key(|f| f.to_lowercase())
			.collect()
	}
}

/// Turns a script or OS path into the OMOD's canonical form.
/// Separators become backslashes, and leading, trailing, or doubled separators are removed.
pub fn normalize_path(path: &str) -> String {
	path.trim()
		.split(['\\', '/'])
		.filter(|p| !p.is_empty())
		.join("\\")
}

/// Checks that a path stays inside whatever folder it is relative to.
pub fn is_safe_relative(path: &str) -> bool {
	let trimmed = path.trim();
	if trimmed.starts_with(['\\', '/']) || trimmed.contains(':') {
		return false;
	}

	!normalize_path(trimmed).split('\\').any(|p| p == "..")
}

/// Removes a folder prefix from a normalized path, returning what is left.
/// An empty folder is the root, which every path is inside of.
pub fn strip_folder<'a>(path: &'a str, folder: &str) -> Option<&'a str> {
	let folder = normalize_path(folder);
	if folder.is_empty() {
		return Some(path);
	}

	let head = path.get(..folder.len())?;
	if !head.eq_ignore_ascii_case(&folder) {
		return None;
	}

	path[folder.len()..].strip_prefix('\\').filter(|rest| !rest.is_empty())
}

/// Reads every file below a folder into entries, in a stable order.
fn scan_folder(root: &Path) -> io::Result<Vec<OmodEntry>> {
	if !root.exists() {
		warn!("The extracted folder '{}' does not exist; treating it as empty.", root.display());
		return Ok(Vec::new());
	}

	let mut entries = Vec::new();
	let mut offset = 0;

	let walker = WalkDir::new(root)
		.sort_by_file_name()
		.into_iter()
		.filter_map(|r| r.ok())
		.filter(|e| e.file_type().is_file());

	for file in walker {
		let Ok(relative) = file.path().strip_prefix(root) else { continue };
		let bytes = fs::read(file.path())?;
		let length = bytes.len() as u64;

		entries.push(OmodEntry::new(&relative.to_string_lossy(), crc32fast::hash(&bytes), length, offset));
		offset += length;
	}

	Ok(entries)
}

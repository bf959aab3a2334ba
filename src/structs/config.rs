//! This module holds the settings a host passes in when it runs a script.

use std::{cmp::Ordering, fmt::Display, path::{Path, PathBuf}, str::FromStr};

use serde::{Deserialize, Serialize};

/// The last released version of OBMM, which scripts are written against.
pub const DEFAULT_OBMM_VERSION: Version = Version::new(1, 1, 12, 0);

/// The last patch released for Oblivion, used when the game's real version isn't known.
pub const DEFAULT_OBLIVION_VERSION: Version = Version::new(1, 2, 416, 0);

/// A four-part version number, like '1.2.416.0'.
/// Missing trailing parts are treated as zero, so '1.2' equals '1.2.0.0'.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
	pub major: u32,
	pub minor: u32,
	pub build: u32,
	pub revision: u32,
}

impl Version {
	/// Builds a new version from all four parts.
	pub const fn new(major: u32, minor: u32, build: u32, revision: u32) -> Self {
		Self { major, minor, build, revision }
	}

	/// Builds a version from just its major and minor parts.
	pub const fn from_major_minor(major: u32, minor: u32) -> Self {
		Self::new(major, minor, 0, 0)
	}

	fn parts(&self) -> [u32; 4] {
		[self.major, self.minor, self.build, self.revision]
	}
}

impl PartialOrd for Version {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Version {
	fn cmp(&self, other: &Self) -> Ordering {
		self.parts().cmp(&other.parts())
	}
}

impl Display for Version {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}.{}.{}.{}", self.major, self.minor, self.build, self.revision)
	}
}

/// Error returned when a string is not a valid *Version*.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVersionError;

impl FromStr for Version {
	type Err = ParseVersionError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let pieces: Vec<&str> = s.trim().split('.').collect();
		if pieces.is_empty() || pieces.len() > 4 {
			return Err(ParseVersionError);
		}

		let mut parts = [0u32; 4];
		for (slot, piece) in parts.iter_mut().zip(pieces) {
			*slot = piece.trim().parse().map_err(|_| ParseVersionError)?;
		}

		Ok(Self::new(parts[0], parts[1], parts[2], parts[3]))
	}
}

/// Settings for a single script run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptSettings {
	/// Folder the OMOD's data files were extracted to.
	pub data_path: PathBuf,

	/// Folder the OMOD's plugins were extracted to.
	pub plugins_path: PathBuf,

	/// When set, the engine does no file-system work of its own.
	/// Folder loops are answered from the OMOD's file lists instead of the extracted folders.
	pub dry_run: bool,

	/// The OBMM version scripts see through 'VersionGreaterThan' and 'VersionLessThan'.
	pub obmm_version: Version,
}

impl ScriptSettings {
	/// Builds settings for an OMOD extracted under one root, with 'data' and 'plugins' folders inside it.
	pub fn with_root(root: impl AsRef<Path>) -> Self {
		let root = root.as_ref();

		Self {
			data_path: root.join("data"),
			plugins_path: root.join("plugins"),
			..Default::default()
		}
	}
}

impl Default for ScriptSettings {
	fn default() -> Self {
		Self {
			data_path: PathBuf::from("data"),
			plugins_path: PathBuf::from("plugins"),
			dry_run: false,
			obmm_version: DEFAULT_OBMM_VERSION,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn versions_fill_missing_parts_with_zero() {
		assert_eq!("1.2".parse::<Version>(), Ok(Version::new(1, 2, 0, 0)));
		assert_eq!("0.19.3.1".parse::<Version>(), Ok(Version::new(0, 19, 3, 1)));
		assert!("1.2.3.4.5".parse::<Version>().is_err());
		assert!("one".parse::<Version>().is_err());
	}

	#[test]
	fn versions_order_part_by_part() {
		let old: Version = "1.0".parse().unwrap();
		let new: Version = "1.0.1".parse().unwrap();
		assert!(old < new);
		assert!(Version::from_major_minor(1, 10) > Version::from_major_minor(1, 9));
	}

	#[test]
	fn root_settings_point_inside_the_root() {
		let settings = ScriptSettings::with_root("/tmp/omod");
		assert_eq!(settings.data_path, PathBuf::from("/tmp/omod/data"));
		assert_eq!(settings.plugins_path, PathBuf::from("/tmp/omod/plugins"));
		assert_eq!(settings.obmm_version, DEFAULT_OBMM_VERSION);
	}
}

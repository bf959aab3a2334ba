//! This module defines every statement an OBMM script can hold.
//! *TokenType* is the closed keyword table, and *Token* is the typed form a line is parsed into.

use std::fmt::Display;

/// Builds the *TokenType* enum along with its keyword and arity tables.
/// Each entry is `Variant => "Keyword", min, max`, where a max of *None* means unbounded.
macro_rules! token_types {
	($($variant:ident => $keyword:literal, $min:literal, $max:expr;)*) => {
		/// Every kind of statement a script can contain.
		#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
		pub enum TokenType {
			$($variant,)*
		}

		impl TokenType {
			/// Every statement kind, in declaration order.
			pub const ALL: &'static [TokenType] = &[$(TokenType::$variant,)*];

			/// Returns this statement's keyword, as it is written in scripts.
			pub fn keyword(&self) -> &'static str {
				match self {
					$(TokenType::$variant => $keyword,)*
				}
			}

			/// Returns the (min, max) number of arguments this statement accepts.
			pub fn arity(&self) -> (usize, Option<usize>) {
				match self {
					$(TokenType::$variant => ($min, $max),)*
				}
			}
		}
	};
}

token_types! {
	Comment => ";", 0, None;

	If => "If", 1, None;
	IfNot => "IfNot", 1, None;
	Else => "Else", 0, Some(0);
	EndIf => "EndIf", 0, Some(0);

	Select => "Select", 2, None;
	SelectMany => "SelectMany", 2, None;
	SelectWithPreview => "SelectWithPreview", 2, None;
	SelectManyWithPreview => "SelectManyWithPreview", 2, None;
	SelectWithDescriptions => "SelectWithDescriptions", 2, None;
	SelectManyWithDescriptions => "SelectManyWithDescriptions", 2, None;
	SelectWithDescriptionsAndPreviews => "SelectWithDescriptionsAndPreviews", 2, None;
	SelectManyWithDescriptionsAndPreviews => "SelectManyWithDescriptionsAndPreviews", 2, None;
	SelectVar => "SelectVar", 1, Some(1);
	SelectString => "SelectString", 1, Some(1);
	Case => "Case", 1, Some(1);
	Default => "Default", 0, Some(0);
	Break => "Break", 0, Some(0);
	EndSelect => "EndSelect", 0, Some(0);

	For => "For", 4, Some(6);
	EndFor => "EndFor", 0, Some(0);
	Continue => "Continue", 0, Some(0);
	Exit => "Exit", 0, Some(0);

	Return => "Return", 0, Some(0);
	FatalError => "FatalError", 0, Some(0);
	Label => "Label", 1, Some(1);
	Goto => "Goto", 1, Some(1);

	InstallAllPlugins => "InstallAllPlugins", 0, Some(0);
	InstallAllDataFiles => "InstallAllDataFiles", 0, Some(0);
	DontInstallAnyPlugins => "DontInstallAnyPlugins", 0, Some(0);
	DontInstallAnyDataFiles => "DontInstallAnyDataFiles", 0, Some(0);
	InstallPlugin => "InstallPlugin", 1, Some(1);
	DontInstallPlugin => "DontInstallPlugin", 1, Some(1);
	InstallDataFile => "InstallDataFile", 1, Some(1);
	DontInstallDataFile => "DontInstallDataFile", 1, Some(1);
	InstallDataFolder => "InstallDataFolder", 1, Some(2);
	DontInstallDataFolder => "DontInstallDataFolder", 1, Some(2);
	CopyPlugin => "CopyPlugin", 2, Some(2);
	CopyDataFile => "CopyDataFile", 2, Some(2);
	CopyDataFolder => "CopyDataFolder", 2, Some(3);

	UncheckESP => "UncheckESP", 1, Some(1);
	SetDeactivationWarning => "SetDeactivationWarning", 2, Some(2);
	LoadEarly => "LoadEarly", 1, Some(1);
	LoadBefore => "LoadBefore", 2, Some(2);
	LoadAfter => "LoadAfter", 2, Some(2);

	ConflictsWith => "ConflictsWith", 1, Some(7);
	DependsOn => "DependsOn", 1, Some(7);
	ConflictsWithRegex => "ConflictsWithRegex", 1, Some(7);
	DependsOnRegex => "DependsOnRegex", 1, Some(7);

	EditINI => "EditINI", 3, Some(3);
	EditSDP => "EditSDP", 3, Some(3);
	EditShader => "EditShader", 3, Some(3);
	SetGMST => "SetGMST", 3, Some(3);
	SetGlobal => "SetGlobal", 3, Some(3);
	SetPluginByte => "SetPluginByte", 3, Some(3);
	SetPluginShort => "SetPluginShort", 3, Some(3);
	SetPluginInt => "SetPluginInt", 3, Some(3);
	SetPluginLong => "SetPluginLong", 3, Some(3);
	SetPluginFloat => "SetPluginFloat", 3, Some(3);
	EditXMLLine => "EditXMLLine", 3, Some(3);
	EditXMLReplace => "EditXMLReplace", 3, Some(3);
	PatchPlugin => "PatchPlugin", 2, Some(3);
	PatchDataFile => "PatchDataFile", 2, Some(3);
	RegisterBSA => "RegisterBSA", 1, Some(1);
	UnregisterBSA => "UnregisterBSA", 1, Some(1);

	Message => "Message", 1, Some(2);
	DisplayImage => "DisplayImage", 1, Some(2);
	DisplayText => "DisplayText", 1, Some(2);
	InputString => "InputString", 1, Some(3);

	SetVar => "SetVar", 2, Some(2);
	GetFolderName => "GetFolderName", 2, Some(2);
	GetDirectoryName => "GetDirectoryName", 2, Some(2);
	GetFileName => "GetFileName", 2, Some(2);
	GetFileNameWithoutExtension => "GetFileNameWithoutExtension", 2, Some(2);
	CombinePaths => "CombinePaths", 3, Some(3);
	Substring => "Substring", 3, Some(4);
	RemoveString => "RemoveString", 3, Some(4);
	StringLength => "StringLength", 2, Some(2);
	ISet => "iSet", 2, None;
	FSet => "fSet", 2, None;
	ReadINI => "ReadINI", 3, Some(3);
	ReadRendererInfo => "ReadRendererInfo", 2, Some(2);
	ExecLines => "ExecLines", 1, Some(1);
	AllowRunOnLines => "AllowRunOnLines", 0, Some(0);
}

impl TokenType {
	/// Resolves a statement keyword, ignoring case.
	/// Comments have no keyword, so they are never returned here.
	pub fn from_keyword(word: &str) -> Option<TokenType> {
		TokenType::ALL.iter()
			.copied()
			.filter(|t| *t != TokenType::Comment)
			.find(|t| t.keyword().eq_ignore_ascii_case(word))
	}

	/// Checks if this is one of the eight 'Select' statements that prompt the user.
	pub fn is_select_prompt(&self) -> bool {
		self.select_shape().is_some()
	}

	/// Returns (multi-select, has previews, has descriptions) for prompting select statements.
	pub fn select_shape(&self) -> Option<(bool, bool, bool)> {
		let shape = match self {
			TokenType::Select => (false, false, false),
			TokenType::SelectMany => (true, false, false),
			TokenType::SelectWithPreview => (false, true, false),
			TokenType::SelectManyWithPreview => (true, true, false),
			TokenType::SelectWithDescriptions => (false, false, true),
			TokenType::SelectManyWithDescriptions => (true, false, true),
			TokenType::SelectWithDescriptionsAndPreviews => (false, true, true),
			TokenType::SelectManyWithDescriptionsAndPreviews => (true, true, true),
			_ => return None,
		};

		Some(shape)
	}
}

impl Display for TokenType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.keyword())
	}
}

/// The conditions an 'If' or 'IfNot' statement can test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IfConditionType {
	DialogYesNo,
	DataFileExists,
	VersionGreaterThan,
	VersionLessThan,
	ScriptExtenderPresent,
	ScriptExtenderNewerThan,
	GraphicsExtenderPresent,
	GraphicsExtenderNewerThan,
	OblivionNewerThan,
	Equal,
	GreaterEqual,
	GreaterThan,
	FGreaterEqual,
	FGreaterThan,
}

impl IfConditionType {
	/// Every condition, paired with its name and its (min, max) argument count.
	const TABLE: [(IfConditionType, &'static str, usize, usize); 14] = [
		(IfConditionType::DialogYesNo, "DialogYesNo", 1, 2),
		(IfConditionType::DataFileExists, "DataFileExists", 1, 1),
		(IfConditionType::VersionGreaterThan, "VersionGreaterThan", 1, 1),
		(IfConditionType::VersionLessThan, "VersionLessThan", 1, 1),
		(IfConditionType::ScriptExtenderPresent, "ScriptExtenderPresent", 0, 0),
		(IfConditionType::ScriptExtenderNewerThan, "ScriptExtenderNewerThan", 1, 1),
		(IfConditionType::GraphicsExtenderPresent, "GraphicsExtenderPresent", 0, 0),
		(IfConditionType::GraphicsExtenderNewerThan, "GraphicsExtenderNewerThan", 1, 1),
		(IfConditionType::OblivionNewerThan, "OblivionNewerThan", 1, 1),
		(IfConditionType::Equal, "Equal", 2, 2),
		(IfConditionType::GreaterEqual, "GreaterEqual", 2, 2),
		(IfConditionType::GreaterThan, "GreaterThan", 2, 2),
		(IfConditionType::FGreaterEqual, "fGreaterEqual", 2, 2),
		(IfConditionType::FGreaterThan, "fGreaterThan", 2, 2),
	];

	/// Resolves a condition name, ignoring case.
	pub fn from_name(name: &str) -> Option<IfConditionType> {
		Self::TABLE.iter()
			.find(|(_, n, _, _)| n.eq_ignore_ascii_case(name))
			.map(|(c, _, _, _)| *c)
	}

	/// Returns this condition's name, as it is written in scripts.
	pub fn name(&self) -> &'static str {
		self.entry().1
	}

	/// Returns the (min, max) number of arguments this condition takes after its name.
	pub fn arity(&self) -> (usize, usize) {
		let (_, _, min, max) = self.entry();
		(min, max)
	}

	fn entry(&self) -> (IfConditionType, &'static str, usize, usize) {
		Self::TABLE.iter()
			.copied()
			.find(|(c, _, _, _)| c == self)
			.unwrap_or((*self, "", 0, 0))
	}
}

/// The kinds of sequence a 'For' loop can walk over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ForEnumerationType {
	Count,
	DataFolder,
	PluginFolder,
	DataFile,
	Plugin,
}

impl ForEnumerationType {
	/// Resolves a loop kind, ignoring case.
	pub fn from_name(name: &str) -> Option<ForEnumerationType> {
		[
			ForEnumerationType::Count,
			ForEnumerationType::DataFolder,
			ForEnumerationType::PluginFolder,
			ForEnumerationType::DataFile,
			ForEnumerationType::Plugin,
		]
		.into_iter()
		.find(|k| k.name().eq_ignore_ascii_case(name))
	}

	/// Returns this loop kind's name, as it is written in scripts.
	pub fn name(&self) -> &'static str {
		match self {
			ForEnumerationType::Count => "Count",
			ForEnumerationType::DataFolder => "DataFolder",
			ForEnumerationType::PluginFolder => "PluginFolder",
			ForEnumerationType::DataFile => "DataFile",
			ForEnumerationType::Plugin => "Plugin",
		}
	}
}

/// The shape of a 'For' loop's header.
/// Numbers and flags stay as text, since they may hold variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ForLoop {
	/// `For Count <var> <start> <end> [step]`
	Count {
		variable: String,
		start: String,
		end: String,
		step: Option<String>,
	},

	/// `For Each <kind> <var> <folder> [recurse] [pattern]`
	Each {
		kind: ForEnumerationType,
		variable: String,
		folder: String,
		recurse: Option<String>,
		pattern: Option<String>,
	},
}

impl ForLoop {
	/// Returns the name of the variable this loop binds.
	pub fn variable(&self) -> &str {
		match self {
			ForLoop::Count { variable, .. } | ForLoop::Each { variable, .. } => variable,
		}
	}
}

/// A prompting select statement with its options split apart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectBlock {
	/// Which of the eight select statements this is.
	pub kind: TokenType,
	pub title: String,
	pub items: Vec<String>,
	pub previews: Option<Vec<String>>,
	pub descriptions: Option<Vec<String>>,
	pub is_multi: bool,
}

/// A single parsed statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
	/// A ';' line, kept so scripts can be printed back out.
	Comment(String),

	If {
		negated: bool,
		condition: IfConditionType,
		args: Vec<String>,
	},
	Else,
	EndIf,

	For(ForLoop),
	EndFor,
	Continue,
	Exit,

	Select(SelectBlock),
	SelectVar {
		variable: String,
	},
	SelectString {
		value: String,
	},
	Case {
		value: String,
	},
	Default,
	Break,
	EndSelect,

	Label(String),
	Goto(String),
	Return,
	FatalError,

	SetVar {
		variable: String,
		value: String,
	},

	/// Any other statement, with its arity already checked.
	Instruction {
		kind: TokenType,
		args: Vec<String>,
	},
}

impl Token {
	/// Returns the statement kind of this token.
	pub fn kind(&self) -> TokenType {
		match self {
			Token::Comment(_) => TokenType::Comment,
			Token::If { negated: false, .. } => TokenType::If,
			Token::If { negated: true, .. } => TokenType::IfNot,
			Token::Else => TokenType::Else,
			Token::EndIf => TokenType::EndIf,
			Token::For(_) => TokenType::For,
			Token::EndFor => TokenType::EndFor,
			Token::Continue => TokenType::Continue,
			Token::Exit => TokenType::Exit,
			Token::Select(block) => block.kind,
			Token::SelectVar { .. } => TokenType::SelectVar,
			Token::SelectString { .. } => TokenType::SelectString,
			Token::Case { .. } => TokenType::Case,
			Token::Default => TokenType::Default,
			Token::Break => TokenType::Break,
			Token::EndSelect => TokenType::EndSelect,
			Token::Label(_) => TokenType::Label,
			Token::Goto(_) => TokenType::Goto,
			Token::Return => TokenType::Return,
			Token::FatalError => TokenType::FatalError,
			Token::SetVar { .. } => TokenType::SetVar,
			Token::Instruction { kind, .. } => *kind,
		}
	}

	/// Checks if this token opens a block that a later token closes.
	pub fn opens_block(&self) -> bool {
		matches!(
			self,
			Token::If { .. } | Token::For(_) | Token::Select(_) | Token::SelectVar { .. } | Token::SelectString { .. }
		)
	}

	/// Rebuilds the argument list this token was parsed from.
	pub fn arguments(&self) -> Vec<String> {
		match self {
			Token::Comment(_) => Vec::new(),
			Token::If { condition, args, .. } => {
				let mut out = vec![condition.name().to_owned()];
				out.extend(args.iter().cloned());
				out
			},
			Token::For(ForLoop::Count { variable, start, end, step }) => {
				let mut out = vec!["Count".to_owned(), variable.clone(), start.clone(), end.clone()];
				out.extend(step.iter().cloned());
				out
			},
			Token::For(ForLoop::Each { kind, variable, folder, recurse, pattern }) => {
				let mut out = vec!["Each".to_owned(), kind.name().to_owned(), variable.clone(), folder.clone()];
				out.extend(recurse.iter().cloned());
				out.extend(pattern.iter().cloned());
				out
			},
			Token::Select(block) => {
				let mut out = vec![block.title.clone()];
				for (i, item) in block.items.iter().enumerate() {
					out.push(item.clone());
					if let Some(previews) = &block.previews { out.push(previews[i].clone()); }
					if let Some(descriptions) = &block.descriptions { out.push(descriptions[i].clone()); }
				}
				out
			},
			Token::SelectVar { variable } => vec![variable.clone()],
			Token::SelectString { value } | Token::Case { value } => vec![value.clone()],
			Token::Label(label) | Token::Goto(label) => vec![label.clone()],
			Token::SetVar { variable, value } => vec![variable.clone(), value.clone()],
			Token::Instruction { args, .. } => args.clone(),
			_ => Vec::new(),
		}
	}
}

/// A token along with the script line it starts on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Statement {
	/// The 1-based physical line this statement starts on.
	pub line: usize,
	pub token: Token,
}

impl Display for Statement {
	/// Prints this statement as a canonical script line.
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if let Token::Comment(text) = &self.token {
			return write!(f, ";{text}");
		}

		write!(f, "{}", self.token.kind().keyword())?;
		for arg in self.token.arguments() {
			if arg.is_empty() || arg.contains(char::is_whitespace) {
				write!(f, " \"{arg}\"")?;
			} else {
				write!(f, " {arg}")?;
			}
		}

		Ok(())
	}
}

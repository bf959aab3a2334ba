// End-to-end tests that load and run whole scripts against a scripted host.

use std::{collections::VecDeque, fs, path::Path};

use anyhow::{anyhow, bail};
use pretty_assertions::assert_eq;
use simple_logger::SimpleLogger;

use crate::{
	omod::OmodFiles,
	prelude::*,
	script::{
		parser::tokenize, run_script, Completion, DialogResult, ExternalScriptFunctions, Script, ScriptOutcome,
		ScriptRunner, SelectPrompt,
	},
	structs::plan::{ConflictKind, DeactivationStatus, PluginEditKind, PluginValue, ScriptReturnData, XmlEdit},
	util::misc::SaveLoad,
};

/// A host whose answers are queued up front, and which records everything it is asked to show.
#[derive(Default)]
struct MockHost {
	dialogs: VecDeque<DialogResult>,
	selections: VecDeque<Vec<usize>>,
	inputs: VecDeque<String>,

	messages: Vec<String>,
	prompts: Vec<SelectPrompt>,
	texts: Vec<String>,
	images: Vec<String>,

	existing_files: Vec<String>,
	script_extender: Option<Version>,
	oblivion: Version,
}

impl ExternalScriptFunctions for MockHost {
	fn message(&mut self, message: &str, _title: Option<&str>) -> anyhow::Result<()> {
		self.messages.push(message.to_owned());
		Ok(())
	}

	fn dialog_yes_no(&mut self, _message: &str, _title: Option<&str>) -> anyhow::Result<DialogResult> {
		self.dialogs.pop_front().ok_or_else(|| anyhow!("no dialog answer queued"))
	}

	fn select(&mut self, prompt: &SelectPrompt) -> anyhow::Result<Vec<usize>> {
		self.prompts.push(prompt.clone());
		self.selections.pop_front().ok_or_else(|| anyhow!("no selection queued"))
	}

	fn input_string(&mut self, _title: Option<&str>, initial: &str) -> anyhow::Result<String> {
		Ok(self.inputs.pop_front().unwrap_or_else(|| initial.to_owned()))
	}

	fn display_image(&mut self, path: &Path, _title: Option<&str>) -> anyhow::Result<()> {
		self.images.push(path.display().to_string());
		Ok(())
	}

	fn display_text(&mut self, text: &str, _title: Option<&str>) -> anyhow::Result<()> {
		self.texts.push(text.to_owned());
		Ok(())
	}

	fn data_file_exists(&mut self, path: &str) -> anyhow::Result<bool> {
		Ok(self.existing_files.iter().any(|f| f.eq_ignore_ascii_case(path)))
	}

	fn script_extender_version(&mut self) -> anyhow::Result<Option<Version>> {
		Ok(self.script_extender)
	}

	fn graphics_extender_version(&mut self) -> anyhow::Result<Option<Version>> {
		Ok(None)
	}

	fn oblivion_version(&mut self) -> anyhow::Result<Version> {
		Ok(self.oblivion)
	}

	fn read_ini(&mut self, section: &str, key: &str) -> anyhow::Result<String> {
		match (section, key) {
			("General", "iPreloadSizeLimit") => Ok("26214400".to_owned()),
			_ => bail!("unknown INI value"),
		}
	}

	fn read_renderer_info(&mut self, _key: &str) -> anyhow::Result<String> {
		Ok("3.0".to_owned())
	}
}

fn init_logger() {
	let _ = SimpleLogger::new().with_level(log::LevelFilter::Debug).init();
}

fn omod_files() -> OmodFiles {
	OmodFiles::from_names(
		&["textures\\a.dds", "textures\\bad.dds", "textures\\sub\\c.dds", "readme.txt", "menus\\options.xml", "shaders\\s.sdp"],
		&["main.esp", "extra.esp"],
	)
}

fn dry_run() -> ScriptSettings {
	ScriptSettings { dry_run: true, ..Default::default() }
}

fn run(text: &str, host: &mut MockHost) -> ScriptResult<ScriptOutcome> {
	init_logger();
	run_script(text, &dry_run(), &omod_files(), host)
}

fn run_ok(text: &str, host: &mut MockHost) -> ScriptReturnData {
	match run(text, host) {
		Ok(outcome) => outcome.plan,
		Err(error) => panic!("script failed: {error}"),
	}
}

#[test]
fn count_loops_include_both_ends() {
	let mut host = MockHost::default();
	run_ok("For Count i 0 3 1\nMessage %i%\nEndFor\nMessage done", &mut host);

	assert_eq!(host.messages, vec!["0", "1", "2", "3", "done"]);
}

#[test]
fn count_loops_can_step_down_and_be_empty() {
	let mut host = MockHost::default();
	run_ok("For Count i 6 0 -3\nMessage %i%\nEndFor\nFor Count j 5 1\nMessage never\nEndFor", &mut host);

	assert_eq!(host.messages, vec!["6", "3", "0"]);
}

#[test]
fn loops_support_continue_and_exit() {
	let script = r#"
For Count i 1 10
	If Equal %i% 2
		Continue
	EndIf
	If Equal %i% 4
		Exit
	EndIf
	Message %i%
EndFor
Message after
"#;

	let mut host = MockHost::default();
	run_ok(script, &mut host);
	assert_eq!(host.messages, vec!["1", "3", "after"]);
}

#[test]
fn first_matching_case_wins() {
	let script = r#"
Select "Pick one" A B
Case A
	Message a
	Break
Case B
	Message first
	Break
Case B
	Message second
	Break
EndSelect
"#;

	let mut host = MockHost { selections: VecDeque::from([vec![1]]), ..Default::default() };
	run_ok(script, &mut host);

	assert_eq!(host.messages, vec!["first"]);
}

#[test]
fn multi_selects_run_a_case_per_choice() {
	let script = r#"
SelectMany "Pick some" A |B C
Case A
	Message a
	Break
Case B
	Message b
	Break
Case C
	Message c
	Break
Default
	Message nothing
	Break
EndSelect
"#;

	let mut host = MockHost { selections: VecDeque::from([vec![0, 2]]), ..Default::default() };
	run_ok(script, &mut host);

	assert_eq!(host.messages, vec!["a", "c"]);
	assert_eq!(host.prompts[0].items, vec!["A", "B", "C"]);
	assert_eq!(host.prompts[0].preselected, vec![1]);
}

#[test]
fn default_runs_when_nothing_matches() {
	let script = "SelectString none\nCase A\nMessage a\nBreak\nDefault\nMessage fallback\nBreak\nEndSelect";

	let mut host = MockHost::default();
	run_ok(script, &mut host);
	assert_eq!(host.messages, vec!["fallback"]);
}

#[test]
fn select_var_compares_a_variable() {
	let script = "SetVar choice B\nSelectVar choice\nCase A\nMessage a\nBreak\nCase B\nMessage b\nBreak\nEndSelect";

	let mut host = MockHost::default();
	run_ok(script, &mut host);
	assert_eq!(host.messages, vec!["b"]);
}

#[test]
fn single_selects_need_exactly_one_choice() {
	let mut host = MockHost { selections: VecDeque::from([vec![0, 1]]), ..Default::default() };
	let result = run("Select \"Pick\" A B\nCase A\nBreak\nEndSelect", &mut host);

	assert!(matches!(result, Err(ScriptError::Execution(ExecutionError::InvalidSelection { line: 1, .. }))));
}

#[test]
fn output_paths_are_last_write_wins() {
	let mut host = MockHost::default();
	let plan = run_ok("CopyDataFile textures\\a.dds y.dds\nCopyDataFile readme.txt Y.DDS", &mut host);

	assert_eq!(plan.data_files.len(), 1);
	assert_eq!(plan.data_files[0].source.name, "readme.txt");
	assert_eq!(plan.data_files[0].output, "Y.DDS");
}

#[test]
fn version_checks_compare_against_the_running_version() {
	let script = "If VersionGreaterThan 1.0\nMessage newer\nEndIf\nIf VersionLessThan 1.0\nMessage older\nEndIf";
	let files = omod_files();

	for (current, expected) in [("1.1", "newer"), ("0.9", "older")] {
		let settings = ScriptSettings { obmm_version: current.parse().unwrap(), ..dry_run() };
		let mut host = MockHost::default();

		run_script(script, &settings, &files, &mut host).unwrap();
		assert_eq!(host.messages, vec![expected], "running as {current}");
	}
}

#[test]
fn numeric_comparisons_read_right_to_left() {
	let script = r#"
If GreaterThan 5 3
	Message int
EndIf
IfNot GreaterEqual 2 3
	Message not
EndIf
If fGreaterThan 1.5 1.25
	Message float
EndIf
If GreaterThan 3 3
	Message never
EndIf
"#;

	let mut host = MockHost::default();
	run_ok(script, &mut host);
	assert_eq!(host.messages, vec!["int", "not", "float"]);
}

#[test]
fn else_branches_run_when_the_condition_fails() {
	let script = "If Equal a b\nMessage then\nElse\nMessage else\nEndIf\nIfNot Equal a b\nMessage negated\nElse\nMessage skipped\nEndIf";

	let mut host = MockHost::default();
	run_ok(script, &mut host);
	assert_eq!(host.messages, vec!["else", "negated"]);
}

#[test]
fn host_facts_drive_conditions() {
	let script = r#"
If DataFileExists "Oblivion.esm"
	Message esm
EndIf
If ScriptExtenderPresent
	Message obse
EndIf
If ScriptExtenderNewerThan 0.19
	Message newer
EndIf
IfNot GraphicsExtenderPresent
	Message no-obge
EndIf
If OblivionNewerThan 1.2
	Message patched
EndIf
"#;

	let mut host = MockHost {
		existing_files: vec!["oblivion.esm".to_owned()],
		script_extender: Some("0.19".parse().unwrap()),
		oblivion: "1.2.416".parse().unwrap(),
		..Default::default()
	};

	run_ok(script, &mut host);
	assert_eq!(host.messages, vec!["esm", "obse", "no-obge", "patched"]);
}

#[test]
fn dialogs_can_cancel_the_install() {
	let mut host = MockHost { dialogs: VecDeque::from([DialogResult::Yes, DialogResult::Cancel]), ..Default::default() };
	let script = "If DialogYesNo \"First?\"\nInstallPlugin main.esp\nEndIf\nIf DialogYesNo \"Second?\"\nEndIf";

	let result = run(script, &mut host);
	assert!(matches!(result, Err(ScriptError::Cancelled { line: 4 })));
	assert!(result.is_err_and(|e| e.is_expected()));
}

#[test]
fn fatal_error_stops_before_anything_else() {
	let mut host = MockHost::default();
	let result = run("Message before\nFatalError\nInstallAllDataFiles\nMessage after", &mut host);

	assert!(matches!(result, Err(ScriptError::Fatal { line: 2 })));
	assert_eq!(host.messages, vec!["before"]);
}

#[test]
fn return_keeps_the_plan_so_far() {
	let mut host = MockHost::default();
	let outcome = run("InstallPlugin main.esp\nReturn\nInstallPlugin extra.esp", &mut host).unwrap();

	assert_eq!(outcome.completion, Completion::Returned);
	assert_eq!(outcome.plan.plugin_outputs(), vec!["main.esp"]);
}

#[test]
fn undefined_variables_abort_the_run() {
	let mut host = MockHost::default();
	let result = run("Message \"%undefined%\"", &mut host);

	match result {
		Err(ScriptError::Execution(ExecutionError::UndefinedVariable { line, name })) => {
			assert_eq!(line, 1);
			assert_eq!(name, "undefined");
		},
		other => panic!("expected an undefined variable, got {other:?}"),
	}
}

#[test]
fn stray_percent_signs_are_kept() {
	let mut host = MockHost::default();
	run_ok("SetVar n 50\nMessage \"%n%% done, 100% sure\"", &mut host);

	assert_eq!(host.messages, vec!["50% done, 100% sure"]);
}

#[test]
fn folder_installs_respect_exclusions() {
	let files = OmodFiles::from_names(&["textures\\a.dds", "textures\\bad.dds", "readme.txt"], &[]);
	let script = "InstallDataFolder \"textures\" True\nDontInstallDataFile \"textures\\bad.dds\"";

	let mut host = MockHost::default();
	let outcome = run_script(script, &dry_run(), &files, &mut host).unwrap();

	assert_eq!(outcome.plan.data_outputs(), vec!["textures\\a.dds"]);
}

#[test]
fn copy_folders_rebase_their_outputs() {
	let mut host = MockHost::default();
	let plan = run_ok("CopyDataFolder textures \"textures\\backup\" True", &mut host);

	assert_eq!(
		plan.data_outputs(),
		vec!["textures\\backup\\a.dds", "textures\\backup\\bad.dds", "textures\\backup\\sub\\c.dds"]
	);
}

#[test]
fn missing_files_and_folders_are_errors() {
	let mut host = MockHost::default();

	assert!(matches!(
		run("InstallPlugin nope.esp", &mut host),
		Err(ScriptError::Execution(ExecutionError::MissingFile { line: 1, .. }))
	));
	assert!(matches!(
		run("InstallDataFolder meshes", &mut host),
		Err(ScriptError::Execution(ExecutionError::MissingFolder { .. }))
	));
	assert!(matches!(
		run("CopyDataFile readme.txt ..\\..\\evil.txt", &mut host),
		Err(ScriptError::Execution(ExecutionError::InvalidPath { .. }))
	));
}

#[test]
fn quoting_keeps_spaces_and_empty_values() {
	init_logger();
	let settings = dry_run();
	let files = omod_files();
	let mut host = MockHost::default();

	let mut runner = ScriptRunner::new(&settings, &files, &mut host);
	let script = Script::parse("SetVar X \"\"\nSetVar Y \"a b\"").unwrap();

	assert_eq!(runner.execute(&script).unwrap(), Completion::Finished);
	assert_eq!(runner.variable("X"), Some(""));
	assert_eq!(runner.variable("Y"), Some("a b"));
}

#[test]
fn continued_lines_run_as_one() {
	let mut host = MockHost::default();
	run_ok("Message \"Hello \\\nWorld\"", &mut host);

	assert_eq!(host.messages, vec!["Hello World"]);
}

#[test]
fn goto_can_leave_blocks() {
	let script = r#"
SetVar n 0
Label top
iSet n %n% + 1
If GreaterThan 3 %n%
	Goto top
EndIf
Message %n%
"#;

	let mut host = MockHost::default();
	run_ok(script, &mut host);
	assert_eq!(host.messages, vec!["3"]);
}

#[test]
fn plugin_metadata_lands_on_installed_plugins() {
	let script = r#"
UncheckESP main.esp
LoadBefore main.esp extra.esp
LoadAfter main.esp Oblivion.esm
SetDeactivationWarning main.esp WarnAgainst
LoadEarly extra.esp
DontInstallPlugin extra.esp
"#;

	let mut host = MockHost::default();
	let plan = run_ok(script, &mut host);

	assert_eq!(plan.plugin_outputs(), vec!["main.esp"]);

	let flags = &plan.plugin_files[0].flags;
	assert!(flags.is_unchecked);
	assert_eq!(flags.load_before, vec!["extra.esp"]);
	assert_eq!(flags.load_after, vec!["Oblivion.esm"]);
	assert_eq!(flags.deactivation, Some(DeactivationStatus::WarnAgainst));
}

#[test]
fn edits_are_recorded_and_merged() {
	let script = r#"
EditINI General bBorderRegionsEnabled 0
EditINI general bborderregionsenabled 1
SetGMST main.esp fJumpHeightMin 128
SetGlobal main.esp TimeScale 10
SetPluginInt main.esp 16 -2
SetPluginFloat main.esp 32 1.5
EditXMLReplace menus\options.xml "old" "new"
EditXMLLine menus\options.xml 3 "<x/>"
EditSDP 13 water.vso shaders\s.sdp
PatchDataFile readme.txt docs\readme.txt True
RegisterBSA "Textures.bsa"
DependsOn Oblivion.esm "Needs the game" Unusable
ConflictsWithRegex "^old.*\.esp$"
"#;

	let mut host = MockHost::default();
	let plan = run_ok(script, &mut host);

	assert_eq!(plan.ini_edits.len(), 1);
	assert_eq!(plan.ini_edits.iter().next().map(|e| e.value.as_str()), Some("1"));

	let kinds: Vec<_> = plan.plugin_edits.iter().map(|e| e.kind).collect();
	assert_eq!(kinds, vec![PluginEditKind::Gmst, PluginEditKind::Global]);

	let values: Vec<_> = plan.set_plugin_infos.iter().map(|i| (i.offset, i.value)).collect();
	assert_eq!(values, vec![(16, PluginValue::Int(-2)), (32, PluginValue::Float(1.5))]);

	assert_eq!(plan.xml_edits.len(), 2);
	assert!(plan.xml_edits.iter().any(|e| e.edit == XmlEdit::Line { line: 3, value: "<x/>".to_owned() }));

	assert_eq!(plan.sdp_edits.iter().next().map(|e| e.package), Some(13));
	assert_eq!(plan.file_patches.iter().next().map(|p| p.target.as_str()), Some("docs\\readme.txt"));
	assert!(plan.registered_bsas.contains("textures.bsa"));

	assert_eq!(plan.conflicts.len(), 2);
	assert_eq!(plan.conflicts[0].kind, ConflictKind::Dependency);
	assert!(plan.conflicts[1].is_regex);
}

#[test]
fn string_functions_write_variables() {
	let script = r#"
SetVar path "textures\weapons\sword.dds"
GetFileName name %path%
GetFileNameWithoutExtension stem %path%
GetDirectoryName dir %path%
GetFolderName folder %path%
CombinePaths joined meshes "weapons/sword.nif"
Substring part "Oblivion" 2 3
RemoveString rest "Oblivion" 0 3
StringLength length "Oblivion"
iSet sum 2 * (3 + 4) - 1
fSet root sqrt(2.25)
ReadINI preload General iPreloadSizeLimit
ReadRendererInfo shader "Shader Package"
InputString typed "Name?" "nobody"
Message "%name%|%stem%|%dir%|%folder%|%joined%|%part%|%rest%|%length%|%sum%|%root%|%preload%|%shader%|%typed%"
"#;

	let mut host = MockHost { inputs: VecDeque::from(["Bob".to_owned()]), ..Default::default() };
	run_ok(script, &mut host);

	assert_eq!(
		host.messages,
		vec!["sword.dds|sword|textures\\weapons|weapons|meshes\\weapons\\sword.nif|liv|ivion|8|13|1.5|26214400|3.0|Bob"]
	);
}

#[test]
fn bad_expressions_and_ranges_are_errors() {
	let mut host = MockHost::default();

	assert!(matches!(
		run("iSet x 1 / 0", &mut host),
		Err(ScriptError::Execution(ExecutionError::MalformedExpression { .. }))
	));
	assert!(matches!(
		run("Substring x abc 2 5", &mut host),
		Err(ScriptError::Execution(ExecutionError::OutOfRange { start: 2, end: 7, length: 3, .. }))
	));
	assert!(matches!(
		run("RegisterBSA \"a;b.bsa\"", &mut host),
		Err(ScriptError::Execution(ExecutionError::InvalidArgument { .. }))
	));
	assert!(matches!(run("ReadINI x Nope nope", &mut host), Err(ScriptError::Execution(ExecutionError::Host { .. }))));
}

#[test]
fn exec_lines_share_variables_and_plan() {
	let mut host = MockHost::default();
	let plan = run_ok("SetVar plugin main.esp\nExecLines \"SetVar copy %plugin%|InstallPlugin %plugin%|Message done\"", &mut host);

	assert_eq!(host.messages, vec!["done"]);
	assert_eq!(plan.plugin_outputs(), vec!["main.esp"]);

	assert!(matches!(
		run("ExecLines \"If Equal a a\"", &mut host),
		Err(ScriptError::Execution(ExecutionError::Nested { line: 1, .. }))
	));
}

#[test]
fn dry_run_loops_walk_the_omod_file_list() {
	let script = "For Each DataFile f textures True *.dds\nMessage %f%\nEndFor\nFor Each DataFolder d \"\" False\nMessage %d%\nEndFor";

	let mut host = MockHost::default();
	run_ok(script, &mut host);

	assert_eq!(
		host.messages,
		vec!["textures\\a.dds", "textures\\bad.dds", "textures\\sub\\c.dds", "menus", "shaders", "textures"]
	);
}

#[test]
fn disk_loops_walk_the_extracted_folders() -> AppResult<()> {
	init_logger();
	let root = tempfile::tempdir()?;

	fs::create_dir_all(root.path().join("data/textures/sub"))?;
	fs::create_dir_all(root.path().join("data/meshes"))?;
	fs::create_dir_all(root.path().join("plugins"))?;
	fs::write(root.path().join("data/textures/a.dds"), b"a")?;
	fs::write(root.path().join("data/textures/sub/b.dds"), b"b")?;
	fs::write(root.path().join("data/readme.txt"), b"Read me first.")?;
	fs::write(root.path().join("plugins/main.esp"), b"TES4")?;

	let settings = ScriptSettings::with_root(root.path());
	let files = OmodFiles::scan(&settings)?;
	let script = r#"
For Each DataFolder d "" True
	Message %d%
EndFor
For Each Plugin p ""
	InstallPlugin %p%
EndFor
DisplayText readme.txt
DisplayImage textures\a.dds
"#;

	let mut host = MockHost::default();
	let outcome = run_script(script, &settings, &files, &mut host)?;

	assert_eq!(host.messages, vec!["meshes", "textures", "textures\\sub"]);
	assert_eq!(host.texts, vec!["Read me first."]);
	assert!(host.images[0].ends_with("a.dds"));
	assert_eq!(outcome.plan.plugin_outputs(), vec!["main.esp"]);

	Ok(())
}

#[test]
fn display_text_is_skipped_on_dry_runs() {
	let mut host = MockHost::default();
	run_ok("DisplayText readme.txt", &mut host);

	assert!(host.texts.is_empty());
}

#[test]
fn plans_survive_a_save_and_load() -> AppResult<()> {
	let mut host = MockHost::default();
	let plan = run_ok("InstallAllPlugins\nUncheckESP extra.esp\nInstallDataFile readme.txt", &mut host);

	let dir = tempfile::tempdir()?;
	let path = dir.path().join("plan.bin");
	plan.save(&path)?;

	let loaded = ScriptReturnData::load(&path)?;
	assert_eq!(loaded.plugin_outputs(), vec!["main.esp", "extra.esp"]);
	assert!(loaded.plugin_files[1].flags.is_unchecked);
	assert_eq!(loaded.data_outputs(), vec!["readme.txt"]);

	Ok(())
}

#[test]
fn printed_statements_load_back_the_same() {
	let text = r#"
; Installer
If DialogYesNo "Install the extras?" Extras
	SelectWithPreview "Pick a texture" "|Dark wood" dark.png Light None
	Case "Dark wood"
		CopyDataFile "textures\dark.dds" "textures\wood.dds"
		Break
	EndSelect
EndIf
SetVar empty ""
"#;

	let first = tokenize(text).unwrap();
	let printed = first.iter().map(|s| s.to_string()).join("\n");
	let second = tokenize(&printed).unwrap();

	let tokens = |statements: &[crate::script::token::Statement]| statements.iter().map(|s| s.token.clone()).collect::<Vec<_>>();
	assert_eq!(tokens(&first), tokens(&second));
}

#[test]
fn load_errors_stop_the_script_before_it_runs() {
	let mut host = MockHost::default();
	let result = run("Message hi\nBogus", &mut host);

	assert!(matches!(result, Err(ScriptError::Tokenize(TokenizeError::UnknownKeyword { line: 2, .. }))));
	assert!(host.messages.is_empty());
}

#[test]
fn self_running_exec_lines_hit_the_nesting_limit() {
	let script = "SetVar p %\nSetVar x \"ExecLines %p%x%p%\"\nExecLines %x%";

	let mut host = MockHost::default();
	let result = run(script, &mut host);

	assert!(matches!(result, Err(ScriptError::Execution(ExecutionError::NestedTooDeep { line: 1, .. }))));
}

#[test]
fn count_loops_produce_values_as_they_go() {
	let mut host = MockHost::default();
	let outcome = run("For Count i 0 4000000000\nMessage %i%\nReturn\nEndFor", &mut host).unwrap();

	assert_eq!(outcome.completion, Completion::Returned);
	assert_eq!(host.messages, vec!["0"]);

	let mut host = MockHost::default();
	run_ok("For Count i 9223372036854775806 9223372036854775807\nMessage %i%\nEndFor", &mut host);
	assert_eq!(host.messages, vec!["9223372036854775806", "9223372036854775807"]);
}

#[test]
fn folder_loops_stay_inside_the_omod() {
	let mut host = MockHost::default();

	for folder in ["..", "textures\\..\\..", "\\Windows", "C:\\"] {
		let script = format!("For Each DataFile f \"{folder}\" True\nMessage %f%\nEndFor");
		assert!(
			matches!(run(&script, &mut host), Err(ScriptError::Execution(ExecutionError::InvalidPath { line: 1, .. }))),
			"{folder}"
		);
	}

	assert!(host.messages.is_empty());
}

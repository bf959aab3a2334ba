//! Omodcrab checks and runs the install scripts inside OBMM's OMOD packages.
//! It works on OMODs that were already extracted, and prints (or saves) the install plan a script builds.

use std::{fs, path::PathBuf, process::ExitCode};

use clap::{ArgAction, Args, Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;

use omodcrab::{
	console::{ConsoleFunctions, GameFacts},
	omod::OmodFiles,
	prelude::*,
	script::{parser::tokenize, run_script, Completion, Script},
	structs::config::DEFAULT_OBMM_VERSION,
	util::misc::SaveLoad,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
	/// Print more logs; pass twice for debug output.
	#[arg(short, long, action = ArgAction::Count, global = true)]
	verbose: u8,

	/// The command to execute.
	#[command(subcommand)]
	cmd: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Loads a script and reports any syntax or structure errors, without running it.
	Check {
		/// The script to check.
		script: PathBuf,

		/// Print every statement back out in its canonical form.
		#[arg(long)]
		dump: bool,
	},

	/// Runs a script against an extracted OMOD and prints the install plan it builds.
	Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
	/// The script to run.
	script: PathBuf,

	/// The folder the OMOD was extracted to, holding 'data' and 'plugins' folders.
	omod: PathBuf,

	/// Answer folder loops from the OMOD's file list and skip reading extracted files.
	#[arg(long)]
	dry_run: bool,

	/// The OBMM version scripts see.
	#[arg(long, default_value_t = DEFAULT_OBMM_VERSION.to_string())]
	obmm_version: String,

	/// Save the finished install plan to this file.
	#[arg(short, long)]
	output: Option<PathBuf>,

	/// The game's data folder, used to answer 'DataFileExists'.
	#[arg(long)]
	game_data: Option<PathBuf>,

	/// The installed script extender's version.
	#[arg(long)]
	obse: Option<String>,

	/// The installed graphics extender's version.
	#[arg(long)]
	obge: Option<String>,

	/// The game's version.
	#[arg(long)]
	oblivion: Option<String>,

	/// Oblivion.ini, for 'ReadINI'.
	#[arg(long)]
	ini: Option<PathBuf>,

	/// RendererInfo.txt, for 'ReadRendererInfo'.
	#[arg(long)]
	renderer_info: Option<PathBuf>,
}

/// Entrypoint for Omodcrab.
fn main() -> ExitCode {
	let args = Cli::parse();

	let level = match args.verbose {
		0 => LevelFilter::Warn,
		1 => LevelFilter::Info,
		_ => LevelFilter::Debug,
	};

	if let Err(error) = SimpleLogger::new().with_colors(true).with_level(level).init() {
		Notice::from_preset(NoticePreset::Warning, "Logger")
			.add_field("Description", "Failed to start the logger; continuing without logs.")
			.add_field("Details", &error.to_string())
			.print();
	}

	match run_command(args) {
		Ok(()) => ExitCode::SUCCESS,
		Err(error) => {
			error.conv::<Notice>().print();
			ExitCode::FAILURE
		},
	}
}

/// Runs the command specified by the passed CLI arguments.
fn run_command(args: Cli) -> AppResult<()> {
	match args.cmd {
		Command::Check { script, dump } => check(script, dump),
		Command::Run(run) => run_omod(run),
	}
}

fn check(path: PathBuf, dump: bool) -> AppResult<()> {
	let text = fs::read_to_string(&path)?;

	if dump {
		for statement in tokenize(&text).map_err(ScriptError::from)? {
			println!("{statement}");
		}
	}

	let script = Script::parse(&text).map_err(ScriptError::from)?;

	Notice::from_preset(NoticePreset::Success, "Check")
		.add_field("Script", &path.display().to_string())
		.add_field("Statements", &script.len().to_string())
		.print();

	Ok(())
}

fn run_omod(args: RunArgs) -> AppResult<()> {
	let text = fs::read_to_string(&args.script)?;

	let mut settings = ScriptSettings::with_root(&args.omod);
	settings.dry_run = args.dry_run;
	settings.obmm_version = parse_version_flag("--obmm-version", &args.obmm_version)?;

	let mut facts = GameFacts {
		data_folder: args.game_data,
		script_extender: args.obse.as_deref().map(|v| parse_version_flag("--obse", v)).transpose()?,
		graphics_extender: args.obge.as_deref().map(|v| parse_version_flag("--obge", v)).transpose()?,
		..Default::default()
	};

	if let Some(oblivion) = args.oblivion.as_deref() {
		facts.oblivion = parse_version_flag("--oblivion", oblivion)?;
	}

	let facts = facts.with_files(args.ini.as_deref(), args.renderer_info.as_deref())?;

	let files = OmodFiles::scan(&settings)?;
	let mut console = ConsoleFunctions::stdio(facts);

	let outcome = run_script(&text, &settings, &files, &mut console)?;
	let plan = outcome.plan;

	print!("{plan}");

	Notice::from_preset(NoticePreset::Statistics, "Install Plan")
		.add_field("Data files", &plan.data_files.len().to_string())
		.add_field("Plugins", &plan.plugin_files.len().to_string())
		.add_field("Conflicts", &plan.conflicts.len().to_string())
		.add_field("Edits", &plan.edit_count().to_string())
		.print();

	if let Some(output) = args.output {
		plan.save(&output)?;
		info!("Saved the install plan to '{}'.", output.display());
	}

	let summary = match outcome.completion {
		Completion::Finished => "The script finished.",
		Completion::Returned => "The script returned early.",
	};

	Notice::from_preset(NoticePreset::Success, "Run")
		.add_field("Description", summary)
		.print();

	Ok(())
}

fn parse_version_flag(flag: &str, value: &str) -> AppResult<Version> {
	value.parse().map_err(|_| {
		Notice::from_preset(NoticePreset::Error, "Arguments")
			.add_field("Description", &format!("'{value}' is not a valid version for '{flag}'."))
			.add_field("Suggestion", "Versions look like '1.2' or '1.2.416.0'.")
			.pipe(AppError::Custom)
	})
}

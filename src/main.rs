use std::{io, path::PathBuf};

use clap::Parser;
use watexec::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
	/// Wat file to load
	#[arg(value_name = "WAT_FILE")]
	pub input: PathBuf,

	/// Compilation backend
	#[arg(short, long, value_enum, default_value_t)]
	pub backend: Backend,

	/// TOML file listing the calls to make, replacing the built-in ones
	#[arg(short, long)]
	pub plan: Option<PathBuf>,

	/// List the module's exports instead of running it
	#[arg(short, long)]
	pub inspect: bool,
}

fn main() -> eyre::Result<()> {
	pretty_env_logger::init();

	let cli = Cli::parse();
	let source = ModuleSource::read(&cli.input)?;

	if cli.inspect {
		for export in source.exports()? {
			println!("{export}");
		}
		return Ok(());
	}

	let plan = match &cli.plan {
		Some(filename) => CallPlan::load(filename)?,
		None => CallPlan::default(),
	};
	let engine = WasmtimeEngine::new(cli.backend)?;
	let runner = Runner::builder().engine(engine).plan(plan).build();

	let n = runner.run(&source, &mut io::stdout().lock())?;
	log::info!("Made {n} calls against {}", source.path.display());
	Ok(())
}

use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ropeline::config::Config;
use ropeline::error::RopelineResult;
use ropeline::state::Session;
use ropeline::text_server;

/// Edit a text file line by line over JSON requests on stdin
#[derive(Parser)]
#[command(version, about)]
struct Args {
	/// File to edit, must already exist
	path: PathBuf,

	/// JSON config file
	#[arg(long)]
	config: Option<PathBuf>,
}

fn main() -> RopelineResult<()> {
	let args = Args::parse();
	let config = match &args.config {
		Some(path) => Config::load(path)?,
		None => Config::default(),
	};

	// stdout carries replies, so logs go to stderr
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
		)
		.with_writer(io::stderr)
		.init();

	let mut session = Session::new(&config);
	session.open(&args.path)?;

	let stdin = io::stdin();
	let stdout = io::stdout();
	text_server::serve(&mut session, stdin.lock(), stdout.lock(), &config)
}

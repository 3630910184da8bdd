mod backend;
mod cli;
mod dispatch;
mod error;
mod invocation;
mod io;
mod profile;

use std::fs::File;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use dlf_changelog::CommandTable;

use crate::backend::Backend;
use crate::cli::CliArgs;
use crate::error::{exit_code_for, EXIT_SUCCESS};
use crate::invocation::Invocation;
use crate::io::{IoFiles, EXIT_IN_PROGRESS};
use crate::profile::ProfileStore;

fn main() -> ExitCode {
    dlf_core::config::load_dotenv();
    let args = CliArgs::parse();
    let io = IoFiles::new(&args.io_dir);

    if let Err(e) = io.write_exit_code(EXIT_IN_PROGRESS) {
        eprintln!("dlf: {:#}", e);
        return ExitCode::FAILURE;
    }
    if let Err(e) = init_logging(&io) {
        eprintln!("dlf: logging disabled: {:#}", e);
    }

    let code = match run(&args, &io) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "command failed");
            eprintln!("dlf: {:#}", e);
            exit_code_for(&e)
        }
    };

    if let Err(e) = io.write_exit_code(code) {
        eprintln!("dlf: {:#}", e);
    }
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

/// Log to a file in the I/O directory, truncated per invocation. The front
/// end reads our files, not our stdout.
fn init_logging(io: &IoFiles) -> Result<()> {
    let path = io.log_path();
    let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn run(args: &CliArgs, io: &IoFiles) -> Result<()> {
    let profiles_dir = args
        .profiles_dir
        .clone()
        .unwrap_or_else(dlf_core::config::default_profiles_dir);
    let table = CommandTable::standard();

    let invocation = Invocation::parse(&table, &args.command)?;
    info!(
        command = %invocation.command,
        params = ?invocation.params,
        profile = ?invocation.profile,
        profiles_dir = %profiles_dir.display(),
        "invocation"
    );

    let backend = Backend::new(ProfileStore::new(profiles_dir), io.clone(), table);
    let output = backend.run(&invocation)?;
    io.write_output(&output)?;
    info!(command = %invocation.command, bytes = output.len(), "done");
    Ok(())
}

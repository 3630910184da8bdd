use std::path::PathBuf;

use clap::Parser;

/// Back end of the dynamic loot filter front end.
///
/// Runs one command against a profile's filter and reports through files in
/// the I/O directory: the command's output, an exit code, and a log.
#[derive(Parser, Debug)]
#[command(
    name = "dlf",
    about = "Dynamic loot filter back end",
    override_usage = "dlf [OPTIONS] <COMMAND> [PARAMS]... [PROFILE]"
)]
pub struct CliArgs {
    /// Directory holding profile configs and change logs
    /// (default: DLF_PROFILES_DIR, else the user config directory)
    #[arg(long, env = "DLF_PROFILES_DIR")]
    pub profiles_dir: Option<PathBuf>,

    /// Directory holding backend_cli.input, backend_cli.output,
    /// backend_cli.exit_code and the log file
    #[arg(long, env = "DLF_IO_DIR", default_value = ".")]
    pub io_dir: PathBuf,

    /// Command name, its parameters, then the profile name if the command
    /// takes one
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

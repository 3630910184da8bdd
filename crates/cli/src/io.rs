//! Files shared with the front end in the I/O directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const INPUT_FILENAME: &str = "backend_cli.input";
pub const OUTPUT_FILENAME: &str = "backend_cli.output";
pub const EXIT_CODE_FILENAME: &str = "backend_cli.exit_code";
pub const LOG_FILENAME: &str = "dlf.log";

/// Written before any work starts, so the front end can tell a crash from
/// a finished run.
pub const EXIT_IN_PROGRESS: i32 = -1;

#[derive(Debug, Clone)]
pub struct IoFiles {
    dir: PathBuf,
}

impl IoFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    pub fn log_path(&self) -> PathBuf {
        self.path(LOG_FILENAME)
    }

    /// Contents of the input file; empty if the front end wrote none.
    pub fn read_input(&self) -> Result<String> {
        let path = self.path(INPUT_FILENAME);
        dlf_core::fs::read_to_string_or_empty(&path)
            .with_context(|| format!("failed to read {}", path.display()))
    }

    pub fn write_output(&self, output: &str) -> Result<()> {
        write(&self.path(OUTPUT_FILENAME), output)
    }

    pub fn write_exit_code(&self, code: i32) -> Result<()> {
        write(&self.path(EXIT_CODE_FILENAME), &code.to_string())
    }
}

fn write(path: &Path, contents: &str) -> Result<()> {
    dlf_core::fs::write_atomic(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

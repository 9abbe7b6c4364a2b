//! Append-only experiment report.
//!
//! Every report line goes to the log file immediately, so whatever was
//! written before an aborted sweep stays on disk. Lines can also be echoed
//! to stdout.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, SweepError};

pub struct RunLog {
    file: Option<(PathBuf, File)>,
    echo: bool,
}

impl RunLog {
    /// Open (or create) `path` for appending, echoing lines to stdout.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| SweepError::file(path, e))?;
        Ok(Self {
            file: Some((path.to_path_buf(), file)),
            echo: true,
        })
    }

    /// A log that only prints.
    pub fn stdout_only() -> Self {
        Self {
            file: None,
            echo: true,
        }
    }

    /// Stop echoing to stdout.
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().map(|(p, _)| p.as_path())
    }

    /// Print and append a line.
    pub fn emit(&mut self, line: &str) -> Result<()> {
        if self.echo {
            println!("{line}");
        }
        self.record(line)
    }

    /// Append a line without printing it.
    pub fn record(&mut self, line: &str) -> Result<()> {
        if let Some((path, file)) = self.file.as_mut() {
            writeln!(file, "{line}").map_err(|e| SweepError::file(path.as_path(), e))?;
        }
        Ok(())
    }
}

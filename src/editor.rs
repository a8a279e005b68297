//! External editor launch
//!
//! The editor string is split on whitespace, so `vim --noplugin` becomes
//! `vim` with one argument. Quoting is not supported.

use crate::error::{NotesError, Result};
use std::path::Path;
use std::process::{Command, Stdio};

/// A parsed editor command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl EditorCommand {
    pub fn parse(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| {
            NotesError::ConfigurationMissing("The editor command is empty.".to_string())
        })?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Run the editor on `file` and wait for it to exit
    ///
    /// The terminal is handed over to the editor. A spawn failure or a
    /// non-zero exit is reported as `EditorLaunchFailed`.
    pub fn open(&self, file: &Path) -> Result<()> {
        log::debug!(
            "launching editor {} {:?} {}",
            self.program,
            self.args,
            file.display()
        );
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(file)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| NotesError::EditorLaunchFailed {
                command: self.program.clone(),
                message: e.to_string(),
            })?;

        if !status.success() {
            return Err(NotesError::EditorLaunchFailed {
                command: self.program.clone(),
                message: format!("exited with {}", status),
            });
        }
        Ok(())
    }
}

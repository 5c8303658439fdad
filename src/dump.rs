//! External object-dump capability.
//!
//! The per-object dump is an opaque third-party tool; this library only
//! consumes its textual output. [`ObjectDump`] is the injection seam: the
//! analysis pipeline takes any implementation, and tests substitute mocks.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use thiserror::Error;

/// Failure of a single dump invocation.
///
/// Never escalates beyond the affected object: the inspector degrades it
/// into a failure record and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DumpError {
    /// The tool could not be launched or exited unsuccessfully.
    #[error("dump tool failed: {0}")]
    Tool(String),

    /// The call exceeded its time budget.
    #[error("dump tool timed out after {0:?}")]
    Timeout(Duration),
}

/// The injected external dump capability.
pub trait ObjectDump: Send + Sync {
    /// Dump one object of `path`, or the whole document when `object`
    /// is `None`.
    fn dump(&self, path: &Path, object: Option<u32>) -> Result<String, DumpError>;
}

/// [`ObjectDump`] backed by an external command.
///
/// Invokes `<program> -o <n> -f <path>` for a single object and
/// `<program> <path>` for the full dump, capturing stdout. The program is
/// an explicit constructor argument; nothing is read from the environment.
#[derive(Debug, Clone)]
pub struct CommandDump {
    program: PathBuf,
}

impl CommandDump {
    /// Create a dumper invoking the given program.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The configured program.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl ObjectDump for CommandDump {
    fn dump(&self, path: &Path, object: Option<u32>) -> Result<String, DumpError> {
        let mut command = Command::new(&self.program);
        match object {
            Some(number) => {
                command.arg("-o").arg(number.to_string()).arg("-f").arg(path);
            }
            None => {
                command.arg(path);
            }
        }

        let output = command.output().map_err(|err| {
            DumpError::Tool(format!(
                "failed to launch {}: {}",
                self.program.display(),
                err
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DumpError::Tool(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

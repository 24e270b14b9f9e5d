//! External import sorter

use crate::error::{CheckError, Result};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Verdict of an import sorter on one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOutcome {
    /// Imports are already ordered
    pub passed: bool,
    /// Suggested changes when they are not
    pub diff: String,
}

/// Checks import order in a Python source file without modifying it
#[cfg_attr(test, mockall::automock)]
pub trait ImportSorter {
    fn check(&self, file: &Path) -> Result<SortOutcome>;
}

/// Runs `isort --check-only --diff <file>`
#[derive(Debug, Clone)]
pub struct IsortCommand {
    program: String,
}

impl Default for IsortCommand {
    fn default() -> Self {
        Self::new("isort")
    }
}

impl IsortCommand {
    /// Use a specific isort executable
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl ImportSorter for IsortCommand {
    fn check(&self, file: &Path) -> Result<SortOutcome> {
        let output = Command::new(&self.program)
            .arg("--check-only")
            .arg("--diff")
            .arg(file)
            .output()
            .map_err(|source| CheckError::Sorter {
                program: self.program.clone(),
                source,
            })?;

        debug!(program = %self.program, status = %output.status, "Import sorter finished");
        Ok(SortOutcome {
            passed: output.status.success(),
            diff: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_an_error() {
        let sorter = IsortCommand::new("isort-that-does-not-exist-on-this-machine");
        let err = sorter.check(Path::new("scratch.py")).unwrap_err();
        assert!(err.to_string().contains("isort-that-does-not-exist-on-this-machine"));
    }

    #[test]
    fn test_default_program() {
        assert_eq!(IsortCommand::default().program(), "isort");
    }
}

//! Walking a tree and checking every Python notebook in it

use crate::error::{CheckError, Result};
use crate::notebook::{extract_python_code, read_notebook};
use crate::sorter::ImportSorter;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Result of checking one notebook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotebookStatus {
    /// Nothing to check; counts as passing
    NoPythonCode,
    /// Imports are ordered
    Organized,
    /// Imports are out of order; holds the sorter's diff
    NeedsReorganization(String),
    /// The notebook could not be checked
    Error(String),
}

impl NotebookStatus {
    pub fn passed(&self) -> bool {
        matches!(self, Self::NoPythonCode | Self::Organized)
    }
}

/// Aggregate over all checked notebooks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckSummary {
    /// Notebooks checked
    pub checked: usize,
    /// Notebooks that did not pass
    pub failed: Vec<PathBuf>,
}

impl CheckSummary {
    pub fn all_passed(&self) -> bool {
        self.failed.is_empty()
    }

    /// Process exit code: 0 when every notebook passed, 1 otherwise
    pub fn exit_code(&self) -> u8 {
        u8::from(!self.all_passed())
    }
}

/// Check Python source in a scratch file that is removed afterwards
pub fn check_code(code: &str, sorter: &dyn ImportSorter) -> Result<NotebookStatus> {
    if code.trim().is_empty() {
        return Ok(NotebookStatus::NoPythonCode);
    }

    let mut scratch = tempfile::Builder::new()
        .prefix("notebook-imports-")
        .suffix(".py")
        .tempfile()
        .map_err(CheckError::Scratch)?;
    scratch
        .write_all(code.as_bytes())
        .and_then(|()| scratch.flush())
        .map_err(CheckError::Scratch)?;

    let outcome = sorter.check(scratch.path())?;
    Ok(if outcome.passed {
        NotebookStatus::Organized
    } else {
        NotebookStatus::NeedsReorganization(outcome.diff)
    })
}

/// Check one notebook; any failure becomes [`NotebookStatus::Error`]
pub fn check_notebook(path: &Path, sorter: &dyn ImportSorter) -> NotebookStatus {
    let result = read_notebook(path).and_then(|notebook| check_code(&extract_python_code(&notebook), sorter));
    result.unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "Notebook check failed");
        NotebookStatus::Error(e.to_string())
    })
}

/// Notebooks under `root` whose path below `root` mentions `python`, sorted
pub fn find_python_notebooks(root: &Path) -> Vec<PathBuf> {
    let mut notebooks: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| path.extension().is_some_and(|ext| ext == "ipynb"))
        .filter(|path| {
            path.strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .contains("python")
        })
        .collect();
    notebooks.sort();
    debug!(root = %root.display(), count = notebooks.len(), "Notebooks found");
    notebooks
}

/// Check every Python notebook under `root`, printing a report to `out`
pub fn run_checks(root: &Path, sorter: &dyn ImportSorter, out: &mut dyn Write) -> io::Result<CheckSummary> {
    let notebooks = find_python_notebooks(root);
    writeln!(out, "Found {} Python notebooks to check:", notebooks.len())?;

    let mut summary = CheckSummary::default();
    for path in notebooks {
        let shown = path.strip_prefix(root).unwrap_or(&path);
        writeln!(out, "\nChecking: {}", shown.display())?;

        let status = check_notebook(&path, sorter);
        match &status {
            NotebookStatus::NoPythonCode => writeln!(out, "  ✓ No Python code to check")?,
            NotebookStatus::Organized => writeln!(out, "  ✓ Imports are properly organized")?,
            NotebookStatus::NeedsReorganization(diff) => {
                writeln!(out, "  ✗ Imports need reorganization:")?;
                writeln!(out, "    {diff}")?;
            }
            NotebookStatus::Error(message) => {
                writeln!(out, "  ✗ Error checking notebook: {message}")?;
            }
        }

        summary.checked += 1;
        if !status.passed() {
            summary.failed.push(path);
        }
    }

    if summary.all_passed() {
        writeln!(out, "\nAll Python imports are properly organized!")?;
    } else {
        writeln!(out, "\nSome imports need to be reorganized.")?;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sorter::{MockImportSorter, SortOutcome};
    use serde_json::json;
    use std::fs;

    fn write_notebook(root: &Path, relative: &str, sources: &[&str]) -> PathBuf {
        let cells: Vec<_> = sources
            .iter()
            .map(|source| json!({"cell_type": "code", "metadata": {"language": "python"}, "source": source}))
            .collect();
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, json!({ "cells": cells }).to_string()).unwrap();
        path
    }

    /// Passes files whose import lines are already sorted
    fn sorting_mock() -> MockImportSorter {
        let mut sorter = MockImportSorter::new();
        sorter.expect_check().returning(|file| {
            let code = fs::read_to_string(file).unwrap();
            let imports: Vec<&str> = code.lines().filter(|l| l.starts_with("import ")).collect();
            let mut sorted = imports.clone();
            sorted.sort_unstable();
            Ok(if imports == sorted {
                SortOutcome { passed: true, diff: String::new() }
            } else {
                SortOutcome { passed: false, diff: format!("-{}\n+{}", imports.join("\n"), sorted.join("\n")) }
            })
        });
        sorter
    }

    #[test]
    fn test_no_python_code_never_invokes_sorter() {
        let mut sorter = MockImportSorter::new();
        sorter.expect_check().times(0);

        assert_eq!(check_code("", &sorter).unwrap(), NotebookStatus::NoPythonCode);
        assert_eq!(check_code("  \n\n", &sorter).unwrap(), NotebookStatus::NoPythonCode);
    }

    #[test]
    fn test_ordered_imports_pass() {
        let status = check_code("import os\nimport sys\n", &sorting_mock()).unwrap();
        assert_eq!(status, NotebookStatus::Organized);
        assert!(status.passed());
    }

    #[test]
    fn test_unordered_imports_fail_with_diff() {
        let status = check_code("import sys\nimport os\n", &sorting_mock()).unwrap();
        let NotebookStatus::NeedsReorganization(diff) = &status else {
            panic!("Expected a reorganization verdict, got {status:?}");
        };
        assert!(!diff.is_empty());
        assert!(!status.passed());
    }

    #[test]
    fn test_scratch_file_is_removed() {
        let mut sorter = MockImportSorter::new();
        let seen = std::sync::Arc::new(std::sync::Mutex::new(None));
        let record = seen.clone();
        sorter.expect_check().times(1).returning(move |file| {
            *record.lock().unwrap() = Some(file.to_path_buf());
            Ok(SortOutcome { passed: true, diff: String::new() })
        });

        check_code("import os", &sorter).unwrap();
        let path = seen.lock().unwrap().clone().unwrap();
        assert_eq!(path.extension().unwrap(), "py");
        assert!(!path.exists());
    }

    #[test]
    fn test_magic_cells_do_not_reach_sorter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_notebook(dir.path(), "python/setup.ipynb", &["!pip install b a", "%load_ext autoreload\nimport z\nimport a"]);

        let mut sorter = MockImportSorter::new();
        sorter.expect_check().times(0);
        assert_eq!(check_notebook(&path, &sorter), NotebookStatus::NoPythonCode);
    }

    #[test]
    fn test_unreadable_notebook_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("python").join("bad.ipynb");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not a notebook").unwrap();

        let status = check_notebook(&path, &MockImportSorter::new());
        assert!(matches!(status, NotebookStatus::Error(_)));
        assert!(!status.passed());
    }

    #[test]
    fn test_find_python_notebooks() {
        let dir = tempfile::tempdir().unwrap();
        let b = write_notebook(dir.path(), "lessons/python/b.ipynb", &[]);
        let a = write_notebook(dir.path(), "lessons/python/a.ipynb", &[]);
        write_notebook(dir.path(), "lessons/dotnet/c.ipynb", &[]);
        fs::write(dir.path().join("lessons/python/notes.md"), "# notes").unwrap();

        assert_eq!(find_python_notebooks(dir.path()), vec![a, b]);
    }

    #[test]
    fn test_exit_code_zero_only_when_all_pass() {
        let dir = tempfile::tempdir().unwrap();
        write_notebook(dir.path(), "python/good.ipynb", &["import os\nimport sys"]);
        write_notebook(dir.path(), "python/empty.ipynb", &[]);

        let mut out = Vec::new();
        let summary = run_checks(dir.path(), &sorting_mock(), &mut out).unwrap();
        assert_eq!(summary.checked, 2);
        assert_eq!(summary.exit_code(), 0);
        let report = String::from_utf8(out).unwrap();
        assert!(report.starts_with("Found 2 Python notebooks to check:"));
        assert!(report.contains("All Python imports are properly organized!"));

        write_notebook(dir.path(), "python/bad.ipynb", &["import sys\nimport os"]);
        let mut out = Vec::new();
        let summary = run_checks(dir.path(), &sorting_mock(), &mut out).unwrap();
        assert_eq!(summary.checked, 3);
        assert_eq!(summary.exit_code(), 1);
        assert_eq!(summary.failed, vec![dir.path().join("python/bad.ipynb")]);
        assert!(String::from_utf8(out).unwrap().contains("✗ Imports need reorganization:"));
    }

    #[test]
    fn test_no_notebooks_passes() {
        let dir = tempfile::tempdir().unwrap();
        let summary = run_checks(dir.path(), &MockImportSorter::new(), &mut io::sink()).unwrap();
        assert_eq!(summary, CheckSummary::default());
        assert_eq!(summary.exit_code(), 0);
    }
}

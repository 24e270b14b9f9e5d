//! Notebook parsing and code extraction

use crate::error::{CheckError, Result};
use serde::Deserialize;
use std::path::Path;

/// The parts of a Jupyter notebook the checker reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Notebook {
    #[serde(default)]
    pub cells: Vec<Cell>,
}

/// One notebook cell
#[derive(Debug, Clone, Deserialize)]
pub struct Cell {
    pub cell_type: String,
    #[serde(default)]
    pub metadata: CellMetadata,
    #[serde(default)]
    pub source: CellSource,
}

/// Cell metadata; only the language tag matters here
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CellMetadata {
    pub language: Option<String>,
}

/// Cell source, stored either as one string or as a list of lines
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CellSource {
    Text(String),
    Lines(Vec<String>),
}

impl Default for CellSource {
    fn default() -> Self {
        Self::Lines(Vec::new())
    }
}

impl CellSource {
    /// Source as one string; lines already end with their newlines
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Lines(lines) => lines.concat(),
        }
    }
}

impl Cell {
    /// Whether this is a code cell tagged as Python
    pub fn is_python_code(&self) -> bool {
        self.cell_type == "code" && self.metadata.language.as_deref() == Some("python")
    }
}

/// Read and parse a notebook file
pub fn read_notebook(path: &Path) -> Result<Notebook> {
    let raw = std::fs::read_to_string(path).map_err(|source| CheckError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CheckError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Python source of a notebook
///
/// Keeps Python code cells, drops cells whose trimmed text starts with a
/// shell (`!`) or magic (`%`) prefix, and joins the rest with blank lines.
pub fn extract_python_code(notebook: &Notebook) -> String {
    notebook
        .cells
        .iter()
        .filter(|cell| cell.is_python_code())
        .map(|cell| cell.source.text())
        .filter(|code| !code.trim().starts_with(['!', '%']))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn notebook(cells: serde_json::Value) -> Notebook {
        serde_json::from_value(json!({ "cells": cells })).unwrap()
    }

    #[test]
    fn test_keeps_python_code_cells_only() {
        let nb = notebook(json!([
            {"cell_type": "markdown", "metadata": {"language": "python"}, "source": "# Title"},
            {"cell_type": "code", "metadata": {"language": "python"}, "source": ["import os\n", "import sys\n"]},
            {"cell_type": "code", "metadata": {"language": "csharp"}, "source": "using System;"},
            {"cell_type": "code", "metadata": {}, "source": "import json"},
            {"cell_type": "code", "metadata": {"language": "python"}, "source": "print(os.getcwd())"}
        ]));

        assert_eq!(
            extract_python_code(&nb),
            "import os\nimport sys\n\n\nprint(os.getcwd())"
        );
    }

    #[test]
    fn test_skips_shell_and_magic_cells() {
        let nb = notebook(json!([
            {"cell_type": "code", "metadata": {"language": "python"}, "source": "!pip install zzz\nimport b\nimport a"},
            {"cell_type": "code", "metadata": {"language": "python"}, "source": ["  %matplotlib inline\n", "import y\n", "import x"]},
            {"cell_type": "code", "metadata": {"language": "python"}, "source": "import a"}
        ]));

        assert_eq!(extract_python_code(&nb), "import a");
    }

    #[test]
    fn test_empty_notebook() {
        assert_eq!(extract_python_code(&notebook(json!([]))), "");
        let nb: Notebook = serde_json::from_str("{}").unwrap();
        assert!(nb.cells.is_empty());
    }

    #[test]
    fn test_read_notebook_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.ipynb");
        assert!(matches!(read_notebook(&missing), Err(CheckError::Read { .. })));

        let broken = dir.path().join("broken.ipynb");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(read_notebook(&broken), Err(CheckError::Parse { .. })));
    }
}

//! Import order checker for Python notebooks
//!
//! Finds notebooks whose path mentions `python`, concatenates their Python
//! code cells into a scratch file and asks an external import sorter
//! (isort by default) whether the imports are already ordered.

pub mod checker;
pub mod error;
pub mod notebook;
pub mod sorter;

pub use checker::{CheckSummary, NotebookStatus, check_code, check_notebook, find_python_notebooks, run_checks};
pub use error::{CheckError, Result};
pub use notebook::{Notebook, extract_python_code, read_notebook};
pub use sorter::{ImportSorter, IsortCommand, SortOutcome};

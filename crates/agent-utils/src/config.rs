//! Environment configuration
//!
//! Every demo reads the same three variables naming the chat endpoint, the
//! token used against it, and the model id. They usually come from a `.env`
//! file next to the demo.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Variable holding the chat completions base URL
pub const ENDPOINT_VAR: &str = "GITHUB_ENDPOINT";
/// Variable holding the API token
pub const TOKEN_VAR: &str = "GITHUB_TOKEN";
/// Variable holding the model id
pub const MODEL_ID_VAR: &str = "GITHUB_MODEL_ID";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required variable is unset or empty
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    /// An explicitly requested `.env` file could not be loaded
    #[error("failed to load {path}: {source}")]
    EnvFile {
        /// File that was requested
        path: PathBuf,
        /// Underlying loader error
        #[source]
        source: dotenvy::Error,
    },
}

/// Load variables from a `.env` file into the process environment
///
/// With an explicit path the file must exist. Without one the nearest
/// `.env` in the current directory or its parents is used if present.
/// Variables already set in the environment win.
pub fn load_env(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    match path {
        Some(path) => {
            dotenvy::from_path(path).map_err(|source| ConfigError::EnvFile {
                path: path.to_path_buf(),
                source,
            })?;
            tracing::info!("Loaded environment from {}", path.display());
            Ok(Some(path.to_path_buf()))
        }
        None => match dotenvy::dotenv() {
            Ok(found) => {
                tracing::info!("Loaded environment from {}", found.display());
                Ok(Some(found))
            }
            Err(e) => {
                tracing::debug!("No .env file loaded: {}", e);
                Ok(None)
            }
        },
    }
}

/// Hosted chat model settings
#[derive(Clone, PartialEq, Eq)]
pub struct ModelSettings {
    /// Base URL of the OpenAI-compatible endpoint
    pub endpoint: String,
    /// Bearer token
    pub token: String,
    /// Model identifier
    pub model_id: String,
}

impl ModelSettings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingVar(key))
        };

        Ok(Self {
            endpoint: get(ENDPOINT_VAR)?,
            token: get(TOKEN_VAR)?,
            model_id: get(MODEL_ID_VAR)?,
        })
    }
}

impl fmt::Debug for ModelSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSettings")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .field("model_id", &self.model_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_all_vars_present() {
        let settings = ModelSettings::from_lookup(lookup(&[
            (ENDPOINT_VAR, "https://models.github.ai/inference"),
            (TOKEN_VAR, "ghp_secret"),
            (MODEL_ID_VAR, " openai/gpt-4o-mini "),
        ]))
        .unwrap();

        assert_eq!(settings.endpoint, "https://models.github.ai/inference");
        assert_eq!(settings.model_id, "openai/gpt-4o-mini");
    }

    #[test]
    fn test_missing_var_named() {
        let err = ModelSettings::from_lookup(lookup(&[
            (ENDPOINT_VAR, "https://models.github.ai/inference"),
            (TOKEN_VAR, ""),
        ]))
        .unwrap_err();

        assert!(matches!(err, ConfigError::MissingVar(TOKEN_VAR)));
        assert_eq!(err.to_string(), "environment variable GITHUB_TOKEN is not set");
    }

    #[test]
    fn test_debug_redacts_token() {
        let settings = ModelSettings {
            endpoint: "e".to_string(),
            token: "ghp_secret".to_string(),
            model_id: "m".to_string(),
        };
        let printed = format!("{settings:?}");
        assert!(!printed.contains("ghp_secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_explicit_env_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join(".env");
        assert!(matches!(
            load_env(Some(&missing)),
            Err(ConfigError::EnvFile { .. })
        ));
    }

    #[test]
    fn test_explicit_env_file_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "AGENT_UTILS_TEST_ONLY_VAR=loaded").unwrap();

        let loaded = load_env(Some(&path)).unwrap();
        assert_eq!(loaded.as_deref(), Some(path.as_path()));
        assert_eq!(
            std::env::var("AGENT_UTILS_TEST_ONLY_VAR").as_deref(),
            Ok("loaded")
        );
    }
}

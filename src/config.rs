//! Index configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FriendLibraryError, Result};

pub const INDEX_CONFIG_FILENAME: &str = "friend-index.json";

/// How stored values and query words are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CasePolicy {
    /// Ordinal comparison; `Name` and `name` are different words.
    #[default]
    Sensitive,
    /// Keys and query words are lowercased before comparison.
    Insensitive,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub case_policy: CasePolicy,
    /// Maximum number of suggestions returned per call; `None` is unlimited.
    pub suggestion_limit: Option<usize>,
}

impl IndexConfig {
    pub fn with_case_policy(mut self, case_policy: CasePolicy) -> Self {
        self.case_policy = case_policy;
        self
    }

    pub fn with_suggestion_limit(mut self, limit: usize) -> Self {
        self.suggestion_limit = Some(limit);
        self
    }

    pub fn from_json_str(data: &str) -> Result<Self> {
        serde_json::from_str(data).map_err(|error| {
            FriendLibraryError::Config(format!("failed to parse index config: {error}"))
        })
    }
}

pub fn index_config_path(dir: &Path) -> PathBuf {
    dir.join(INDEX_CONFIG_FILENAME)
}

/// Loads the config file at `path`, falling back to defaults when it is missing.
pub fn load_index_config(path: &Path) -> Result<IndexConfig> {
    if !path.exists() {
        log::debug!("index config {} missing, using defaults", path.display());
        return Ok(IndexConfig::default());
    }

    let data = std::fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|error| {
        FriendLibraryError::Config(format!(
            "failed to parse index config {}: {error}",
            path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().expect("tempdir");
        let config = load_index_config(&index_config_path(dir.path())).expect("load");
        assert_eq!(config, IndexConfig::default());
        assert_eq!(config.case_policy, CasePolicy::Sensitive);
        assert_eq!(config.suggestion_limit, None);
    }

    #[test]
    fn loads_existing_config() {
        let dir = tempdir().expect("tempdir");
        let path = index_config_path(dir.path());
        std::fs::write(
            &path,
            r#"{ "case_policy": "insensitive", "suggestion_limit": 25 }"#,
        )
        .expect("write config");

        let config = load_index_config(&path).expect("load");
        assert_eq!(config.case_policy, CasePolicy::Insensitive);
        assert_eq!(config.suggestion_limit, Some(25));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config = IndexConfig::from_json_str(r#"{ "suggestion_limit": 3 }"#).expect("parse");
        assert_eq!(config.case_policy, CasePolicy::Sensitive);
        assert_eq!(config.suggestion_limit, Some(3));
    }

    #[test]
    fn malformed_config_is_a_config_error() {
        let dir = tempdir().expect("tempdir");
        let path = index_config_path(dir.path());
        std::fs::write(&path, "{ not json").expect("write config");

        match load_index_config(&path).expect_err("expected error") {
            FriendLibraryError::Config(message) => assert!(message.contains("friend-index.json")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }
}

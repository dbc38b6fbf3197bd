use crate::error::{Result, RetroError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Maximum lengths for user supplied text, in characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub title_max_len: usize,
    pub team_name_max_len: usize,
    pub nickname_max_len: usize,
    pub card_content_max_len: usize,
    pub memo_max_len: usize,
    pub action_item_max_len: usize,
    pub timer_max_seconds: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            title_max_len: 100,
            team_name_max_len: 100,
            nickname_max_len: 50,
            card_content_max_len: 1000,
            memo_max_len: 2000,
            action_item_max_len: 500,
            timer_max_seconds: 3600,
        }
    }
}

/// Engine configuration, usually read from `retro.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetroConfig {
    /// Project root for file storage; `.retro/` is created below it
    pub storage_root: PathBuf,
    /// How many random slugs to try before giving up
    pub slug_attempts: u32,
    /// Buffered events per broadcast subscriber before it starts lagging
    pub broadcast_capacity: usize,
    /// Fallback `tracing` filter when `RUST_LOG` is unset
    pub log_filter: String,
    pub limits: Limits,
}

impl Default for RetroConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("."),
            slug_attempts: 10,
            broadcast_capacity: 256,
            log_filter: "info".to_string(),
            limits: Limits::default(),
        }
    }
}

impl RetroConfig {
    pub const FILE_NAME: &'static str = "retro.toml";

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the config file, falling back to defaults when it does not exist
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file missing, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).await?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> Result<()> {
        if self.slug_attempts == 0 {
            return Err(RetroError::ConfigError(
                "slug_attempts must be at least 1".to_string(),
            ));
        }
        if self.broadcast_capacity == 0 {
            return Err(RetroError::ConfigError(
                "broadcast_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = RetroConfig::from_toml_str(
            r#"
            slug_attempts = 3

            [limits]
            title_max_len = 40
            "#,
        )
        .unwrap();
        assert_eq!(config.slug_attempts, 3);
        assert_eq!(config.limits.title_max_len, 40);
        assert_eq!(config.limits.nickname_max_len, 50);
        assert_eq!(config.broadcast_capacity, 256);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            RetroConfig::from_toml_str("slug_attempts = 0"),
            Err(RetroError::ConfigError(_))
        ));
        assert!(matches!(
            RetroConfig::from_toml_str("slug_attempts = \"many\""),
            Err(RetroError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = RetroConfig::load(temp_dir.path().join(RetroConfig::FILE_NAME))
            .await
            .unwrap();
        assert_eq!(config, RetroConfig::default());
    }

    #[tokio::test]
    async fn test_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(RetroConfig::FILE_NAME);
        std::fs::write(&path, "log_filter = \"retroboard_core=debug\"\n").unwrap();

        let config = RetroConfig::load(&path).await.unwrap();
        assert_eq!(config.log_filter, "retroboard_core=debug");
    }
}

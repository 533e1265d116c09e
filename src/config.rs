use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::{Result, eyre::Context};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file
    database: String,
    /// Playlist listing tool, looked up on PATH when not absolute
    ytdlp_path: String,
    /// Upper bound on a single playlist fetch, e.g. "2m"
    fetch_timeout: String,
    /// Time between syncs in `watch` mode, e.g. "1h"
    watch_interval: String,
    /// Playlists reconciled at the same time
    sync_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: "~/.local/share/playlist-tracker/playlists.sqlite".to_string(),
            ytdlp_path: "yt-dlp".to_string(),
            fetch_timeout: "2m".to_string(),
            watch_interval: "1h".to_string(),
            sync_concurrency: 4,
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .context(format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("playlist-tracker").join("config.toml"))
    }

    /// Load the default config file, falling back to built-in defaults if there is none
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write the default config to `path` unless a file is already there
    pub fn write_default(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context(format!(
                "Failed to create config directory: {}",
                parent.display()
            ))?;
        }
        let contents =
            toml::to_string_pretty(&Self::default()).context("Failed to serialize config")?;
        std::fs::write(path, contents)
            .context(format!("Failed to write config file: {}", path.display()))?;
        Ok(true)
    }

    pub fn create_default() -> Result<bool> {
        let path = Self::config_path()
            .ok_or_else(|| color_eyre::eyre::eyre!("No config directory on this platform"))?;
        Self::write_default(&path)
    }

    fn validate(&self) -> Result<()> {
        self.fetch_timeout()?;
        self.watch_interval()?;
        if self.sync_concurrency == 0 {
            return Err(color_eyre::eyre::eyre!("sync_concurrency must be at least 1"));
        }
        Ok(())
    }

    /// Expand ~ to home directory
    fn expand_path(&self, path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    pub fn database_path(&self) -> PathBuf {
        self.expand_path(&self.database)
    }

    pub fn ytdlp_path(&self) -> PathBuf {
        self.expand_path(&self.ytdlp_path)
    }

    pub fn fetch_timeout(&self) -> Result<Duration> {
        humantime::parse_duration(&self.fetch_timeout)
            .context(format!("Invalid fetch_timeout: {}", self.fetch_timeout))
    }

    pub fn watch_interval(&self) -> Result<Duration> {
        humantime::parse_duration(&self.watch_interval)
            .context(format!("Invalid watch_interval: {}", self.watch_interval))
    }

    pub fn sync_concurrency(&self) -> usize {
        self.sync_concurrency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.fetch_timeout().unwrap(), Duration::from_secs(120));
        assert_eq!(config.watch_interval().unwrap(), Duration::from_secs(3600));
        assert_eq!(config.ytdlp_path(), PathBuf::from("yt-dlp"));
        assert_eq!(config.sync_concurrency(), 4);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "fetch_timeout = \"30s\"\nytdlp_path = \"/usr/bin/yt-dlp\"\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();

        assert_eq!(config.fetch_timeout().unwrap(), Duration::from_secs(30));
        assert_eq!(config.ytdlp_path(), PathBuf::from("/usr/bin/yt-dlp"));
        assert_eq!(config.watch_interval().unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn test_invalid_duration_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "watch_interval = \"every so often\"\n").unwrap();

        let result = Config::from_file(&path);

        assert!(result.is_err());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "sync_concurrency = 0\n").unwrap();

        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_write_default_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert!(Config::write_default(&path).unwrap());
        // Existing files are left alone
        assert!(!Config::write_default(&path).unwrap());

        assert_eq!(Config::from_file(&path).unwrap(), Config::default());
    }
}

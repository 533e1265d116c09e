use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;

use serde::Deserialize;
use tokio::process::Command;

use crate::ports::playlist_info::{PlaylistInfoProvider, ProviderError, RemoteEntry};

/// One line of `yt-dlp --flat-playlist --dump-json` output. Everything but id and title is ignored.
#[derive(Debug, Deserialize)]
struct ListingLine {
    id: String,
    #[serde(default)]
    title: Option<String>,
}

/// Lists playlists by shelling out to `yt-dlp`.
pub struct YtDlpClient {
    binary: PathBuf,
}

impl YtDlpClient {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn playlist_url(playlist_id: &str) -> String {
        if playlist_id.starts_with("https://") || playlist_id.starts_with("http://") {
            playlist_id.to_string()
        } else {
            format!("https://www.youtube.com/playlist?list={}", playlist_id)
        }
    }
}

/// Parse newline-delimited JSON listing output. Blank lines are skipped.
pub fn parse_listing(stdout: &str) -> Result<Vec<RemoteEntry>, ProviderError> {
    stdout
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            let line: ListingLine =
                serde_json::from_str(line).map_err(|source| ProviderError::InvalidOutput {
                    line: index + 1,
                    source,
                })?;
            Ok(RemoteEntry::new(line.id, line.title.unwrap_or_default()))
        })
        .collect()
}

#[async_trait::async_trait]
impl PlaylistInfoProvider for YtDlpClient {
    async fn fetch_entries(&self, playlist_id: &str) -> Result<Vec<RemoteEntry>, ProviderError> {
        let url = Self::playlist_url(playlist_id);
        tracing::debug!(binary = %self.binary.display(), url = %url, "Listing playlist");

        // kill_on_drop so a timed out fetch doesn't leave yt-dlp running
        let output = Command::new(&self.binary)
            .args([
                "--flat-playlist",
                "--dump-json",
                "--ignore-config",
                "--no-warnings",
            ])
            .arg(&url)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    ProviderError::CommandNotFound(self.binary.display().to_string())
                }
                _ => ProviderError::Io(e),
            })?;

        if !output.status.success() {
            return Err(ProviderError::CommandFailed {
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        parse_listing(&String::from_utf8_lossy(&output.stdout))
    }
}

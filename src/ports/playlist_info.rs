use std::time::Duration;

/// One playlist item as reported by the listing service at fetch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub id: String,
    pub title: String,
}

impl RemoteEntry {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Invalid playlist id: {0:?}")]
    InvalidPlaylistId(String),
    #[error("`{0}` command not found. Please install yt-dlp: https://github.com/yt-dlp/yt-dlp")]
    CommandNotFound(String),
    #[error("Playlist listing failed:\nstdout:\n{stdout}\nstderr:\n{stderr}")]
    CommandFailed { stdout: String, stderr: String },
    #[error("Unreadable playlist listing on line {line}: {source}")]
    InvalidOutput {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("Playlist listing timed out after {0:?}")]
    TimedOut(Duration),
    #[error("Failed to run playlist listing: {0}")]
    Io(#[from] std::io::Error),
}

/// Port for fetching the current contents of a remote playlist.
///
/// An empty playlist is `Ok(vec![])`, never an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlaylistInfoProvider: Send + Sync {
    async fn fetch_entries(&self, playlist_id: &str) -> Result<Vec<RemoteEntry>, ProviderError>;
}

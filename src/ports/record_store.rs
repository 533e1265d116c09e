use chrono::{DateTime, Utc};

/// Durable view of a video's membership in a playlist, as the reconciler sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord {
    pub youtube_id: String,
    pub title: String,
    pub added: DateTime<Utc>,
    pub removed: Option<DateTime<Utc>>,
    pub deleted: bool,
    pub privated: bool,
}

/// A video seen for the first time. `removed` always starts out null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVideoRecord {
    pub youtube_id: String,
    pub title: String,
    pub added: DateTime<Utc>,
    pub deleted: bool,
    pub privated: bool,
}

/// Every mutation one reconciliation wants to make, computed before any is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub updates: Vec<VideoRecord>,
    pub inserts: Vec<NewVideoRecord>,
    /// Records newly marked as missing from the playlist
    pub removed: usize,
    /// Records whose title changed to a new real title
    pub retitled: usize,
    /// Records whose deleted/privated flags changed
    pub status_changed: usize,
    pub unchanged: usize,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.inserts.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Playlist `{0}` is not being watched")]
    PlaylistNotFound(String),
    #[error("Video `{youtube_id}` is not in playlist `{playlist_id}`")]
    VideoNotFound {
        playlist_id: String,
        youtube_id: String,
    },
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Port for reading and writing a playlist's video records.
///
/// `apply` writes every update and insert of a change set atomically.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    async fn load_existing(&self, playlist_id: &str) -> Result<Vec<VideoRecord>, StoreError>;

    async fn apply(&self, playlist_id: &str, changes: &ChangeSet) -> Result<(), StoreError>;
}

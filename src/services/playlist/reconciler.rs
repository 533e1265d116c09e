use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::instrument;

use super::title::TitleStatus;
use crate::ports::playlist_info::{PlaylistInfoProvider, ProviderError, RemoteEntry};
use crate::ports::record_store::{ChangeSet, NewVideoRecord, RecordStore, StoreError, VideoRecord};

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Playlist provider unavailable: {0}")]
    ProviderUnavailable(#[from] ProviderError),
    #[error("Record store failure: {0}")]
    StoreFailure(#[from] StoreError),
}

/// Brings a playlist's stored videos in line with the playlist's remote listing.
pub struct Reconciler<P: PlaylistInfoProvider, S: RecordStore> {
    provider: P,
    store: S,
    fetch_timeout: Duration,
}

impl<P: PlaylistInfoProvider, S: RecordStore> Reconciler<P, S> {
    pub fn new(provider: P, store: S, fetch_timeout: Duration) -> Self {
        Self {
            provider,
            store,
            fetch_timeout,
        }
    }

    /// Fetch, diff and apply. Nothing is written unless the fetch and the
    /// load both succeed, and the store applies the change set atomically.
    #[instrument(skip(self))]
    pub async fn reconcile(
        &self,
        playlist_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ChangeSet, ReconcileError> {
        if playlist_id.trim().is_empty() {
            return Err(ProviderError::InvalidPlaylistId(playlist_id.to_string()).into());
        }

        let entries = tokio::time::timeout(
            self.fetch_timeout,
            self.provider.fetch_entries(playlist_id),
        )
        .await
        .map_err(|_| ProviderError::TimedOut(self.fetch_timeout))??;
        tracing::debug!(entries = entries.len(), "Fetched remote playlist entries");

        let existing = self.store.load_existing(playlist_id).await?;
        tracing::debug!(records = existing.len(), "Loaded existing video records");

        let changes = plan_changes(existing, entries, now);
        if changes.is_empty() {
            tracing::debug!("Playlist already up to date");
            return Ok(changes);
        }

        self.store.apply(playlist_id, &changes).await?;

        tracing::info!(
            inserted = changes.inserts.len(),
            removed = changes.removed,
            retitled = changes.retitled,
            status_changed = changes.status_changed,
            unchanged = changes.unchanged,
            "Reconciled playlist",
        );

        Ok(changes)
    }
}

/// Diff existing records against a remote snapshot.
///
/// Existing records consume their entry from the snapshot; whatever is left
/// over is new. Inserts keep the order in which ids first appeared remotely.
pub fn plan_changes(
    existing: Vec<VideoRecord>,
    entries: Vec<RemoteEntry>,
    now: DateTime<Utc>,
) -> ChangeSet {
    let mut order = Vec::with_capacity(entries.len());
    let mut remote: HashMap<String, RemoteEntry> = HashMap::with_capacity(entries.len());
    for entry in entries {
        if !remote.contains_key(&entry.id) {
            order.push(entry.id.clone());
        }
        // Duplicate ids: last one wins
        remote.insert(entry.id.clone(), entry);
    }

    let mut changes = ChangeSet::default();

    for record in existing {
        let Some(entry) = remote.remove(&record.youtube_id) else {
            if record.removed.is_some() {
                changes.unchanged += 1;
            } else {
                changes.removed += 1;
                changes.updates.push(VideoRecord {
                    removed: Some(now),
                    ..record
                });
            }
            continue;
        };

        if entry.title == record.title {
            changes.unchanged += 1;
            continue;
        }

        // A reappearing video keeps its `removed` timestamp.
        let mut updated = VideoRecord {
            deleted: false,
            privated: false,
            ..record.clone()
        };
        match TitleStatus::classify(&entry.title) {
            TitleStatus::Deleted => updated.deleted = true,
            TitleStatus::Private => updated.privated = true,
            TitleStatus::Titled(title) => updated.title = title.to_string(),
        }

        if updated == record {
            changes.unchanged += 1;
            continue;
        }
        if updated.title != record.title {
            changes.retitled += 1;
        }
        if updated.deleted != record.deleted || updated.privated != record.privated {
            changes.status_changed += 1;
        }
        changes.updates.push(updated);
    }

    for id in order {
        let Some(entry) = remote.remove(&id) else {
            continue;
        };
        let status = TitleStatus::classify(&entry.title);
        let (deleted, privated) = (status.is_deleted(), status.is_private());

        // New records keep the raw title, marker text included
        changes.inserts.push(NewVideoRecord {
            youtube_id: entry.id,
            title: entry.title,
            added: now,
            deleted,
            privated,
        });
    }

    changes
}

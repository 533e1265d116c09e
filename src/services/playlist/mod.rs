pub mod reconciler;
pub mod store;
pub mod title;

use std::sync::Arc;

use color_eyre::eyre::{OptionExt, Result, WrapErr};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::database::Database;
use crate::entities;

/// Bookkeeping around watched playlists. Reconciliation itself lives in [`reconciler`].
pub struct PlaylistService {
    db: Arc<Database>,
}

impl PlaylistService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Start watching a playlist. Watching one twice returns the existing row.
    pub async fn add(&self, youtube_id: &str) -> Result<entities::playlist::Model> {
        let youtube_id = youtube_id.trim();
        if youtube_id.is_empty() {
            return Err(color_eyre::eyre::eyre!("Playlist id must not be empty"));
        }

        if let Some(existing) = self.find(youtube_id).await? {
            tracing::debug!(youtube_id, "Playlist already watched");
            return Ok(existing);
        }

        let playlist = entities::playlist::ActiveModel {
            youtube_id: Set(youtube_id.to_string()),
            ..entities::playlist::ActiveModel::new()
        };
        let playlist = playlist
            .insert(&self.db.conn)
            .await
            .wrap_err("Failed to add playlist")?;

        tracing::info!(youtube_id, "Watching playlist");
        Ok(playlist)
    }

    /// Stop watching a playlist. Its videos go with it.
    pub async fn remove(&self, youtube_id: &str) -> Result<()> {
        let playlist = self.get(youtube_id).await?;
        entities::playlist::Entity::delete_by_id(playlist.id)
            .exec(&self.db.conn)
            .await
            .wrap_err("Failed to remove playlist")?;
        tracing::info!(youtube_id, "Stopped watching playlist");
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<entities::playlist::Model>> {
        entities::playlist::Entity::find()
            .order_by_asc(entities::playlist::Column::YoutubeId)
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to fetch playlists")
    }

    pub async fn find(&self, youtube_id: &str) -> Result<Option<entities::playlist::Model>> {
        entities::playlist::Entity::find()
            .filter(entities::playlist::Column::YoutubeId.eq(youtube_id))
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to fetch playlist")
    }

    async fn get(&self, youtube_id: &str) -> Result<entities::playlist::Model> {
        self.find(youtube_id)
            .await?
            .ok_or_eyre(format!("Playlist `{}` is not being watched", youtube_id))
    }

    /// Videos of a playlist in the order they were first seen.
    pub async fn videos(
        &self,
        youtube_id: &str,
        include_removed: bool,
    ) -> Result<Vec<entities::video::Model>> {
        let playlist = self.get(youtube_id).await?;

        let mut query = entities::video::Entity::find()
            .filter(entities::video::Column::PlaylistId.eq(playlist.id))
            .order_by_asc(entities::video::Column::Added)
            .order_by_asc(entities::video::Column::Id);
        if !include_removed {
            query = query.filter(entities::video::Column::Removed.is_null());
        }

        query
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to fetch videos")
    }

    /// Videos still worth downloading: present, watchable, not yet downloaded and not skipped.
    pub async fn pending_downloads(
        &self,
        youtube_id: Option<&str>,
    ) -> Result<Vec<entities::video::Model>> {
        let mut condition = Condition::all()
            .add(entities::video::Column::Removed.is_null())
            .add(entities::video::Column::Deleted.eq(false))
            .add(entities::video::Column::Privated.eq(false))
            .add(entities::video::Column::Downloaded.is_null())
            .add(entities::video::Column::DoNotDownload.eq(false));
        if let Some(youtube_id) = youtube_id {
            let playlist = self.get(youtube_id).await?;
            condition = condition.add(entities::video::Column::PlaylistId.eq(playlist.id));
        }

        entities::video::Entity::find()
            .filter(condition)
            .order_by_asc(entities::video::Column::Added)
            .order_by_asc(entities::video::Column::Id)
            .all(&self.db.conn)
            .await
            .wrap_err("Failed to fetch pending videos")
    }

    pub async fn set_do_not_download(
        &self,
        playlist_youtube_id: &str,
        video_youtube_id: &str,
        do_not_download: bool,
    ) -> Result<entities::video::Model> {
        let playlist = self.get(playlist_youtube_id).await?;

        let video = entities::video::Entity::find()
            .filter(
                Condition::all()
                    .add(entities::video::Column::PlaylistId.eq(playlist.id))
                    .add(entities::video::Column::YoutubeId.eq(video_youtube_id)),
            )
            .one(&self.db.conn)
            .await
            .wrap_err("Failed to find video")?
            .ok_or_eyre(format!(
                "Video `{}` is not in playlist `{}`",
                video_youtube_id, playlist_youtube_id
            ))?;

        let mut video: entities::video::ActiveModel = video.into();
        video.do_not_download = Set(do_not_download);
        video
            .update(&self.db.conn)
            .await
            .wrap_err("Failed to update video download flag")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::record_store::{ChangeSet, NewVideoRecord, RecordStore};
    use crate::services::playlist::store::DatabaseRecordStore;
    use crate::test_utils::test_db;
    use chrono::{TimeZone, Utc};

    fn new_video(id: &str, title: &str, deleted: bool) -> NewVideoRecord {
        NewVideoRecord {
            youtube_id: id.into(),
            title: title.into(),
            added: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            deleted,
            privated: false,
        }
    }

    #[tokio::test]
    async fn test_add_playlist() {
        let db = test_db().await;
        let service = PlaylistService::new(db);

        let playlist = service.add("PL59FEE129ADFF2B12").await.unwrap();

        assert_eq!(playlist.youtube_id, "PL59FEE129ADFF2B12");
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_playlist_twice() {
        let db = test_db().await;
        let service = PlaylistService::new(db);

        let first = service.add("PL1").await.unwrap();
        let second = service.add(" PL1 ").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_empty_playlist_id() {
        let db = test_db().await;
        let service = PlaylistService::new(db);

        let result = service.add("   ").await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_remove_playlist_removes_videos() {
        let db = test_db().await;
        let service = PlaylistService::new(db.clone());
        service.add("PL1").await.unwrap();
        DatabaseRecordStore::new(db.clone())
            .apply(
                "PL1",
                &ChangeSet {
                    inserts: vec![new_video("a", "T1", false)],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        service.remove("PL1").await.unwrap();

        assert!(service.list().await.unwrap().is_empty());
        let videos = entities::video::Entity::find().all(&db.conn).await.unwrap();
        assert!(videos.is_empty());
    }

    #[tokio::test]
    async fn test_remove_unknown_playlist() {
        let db = test_db().await;
        let service = PlaylistService::new(db);

        let result = service.remove("PLnope").await;

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("is not being watched")
        );
    }

    #[tokio::test]
    async fn test_pending_downloads_and_skip() {
        let db = test_db().await;
        let service = PlaylistService::new(db.clone());
        service.add("PL1").await.unwrap();
        DatabaseRecordStore::new(db)
            .apply(
                "PL1",
                &ChangeSet {
                    inserts: vec![
                        new_video("a", "T1", false),
                        new_video("b", "[Deleted video]", true),
                        new_video("c", "T3", false),
                    ],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let pending = service.pending_downloads(Some("PL1")).await.unwrap();
        let ids: Vec<_> = pending.iter().map(|v| v.youtube_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        let skipped = service.set_do_not_download("PL1", "a", true).await.unwrap();
        assert!(skipped.do_not_download);

        let pending = service.pending_downloads(None).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].youtube_id, "c");

        service.set_do_not_download("PL1", "a", false).await.unwrap();
        assert_eq!(service.pending_downloads(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_videos_hides_removed_by_default() {
        let db = test_db().await;
        let service = PlaylistService::new(db.clone());
        service.add("PL1").await.unwrap();
        let store = DatabaseRecordStore::new(db);
        store
            .apply(
                "PL1",
                &ChangeSet {
                    inserts: vec![new_video("a", "T1", false), new_video("b", "T2", false)],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let mut gone = store.load_existing("PL1").await.unwrap().remove(1);
        gone.removed = Some(Utc::now());
        store
            .apply(
                "PL1",
                &ChangeSet {
                    updates: vec![gone],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(service.videos("PL1", false).await.unwrap().len(), 1);
        assert_eq!(service.videos("PL1", true).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_set_do_not_download_unknown_video() {
        let db = test_db().await;
        let service = PlaylistService::new(db);
        service.add("PL1").await.unwrap();

        let result = service.set_do_not_download("PL1", "zzz", true).await;

        assert!(result.is_err());
    }
}

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::database::Database;
use crate::entities;
use crate::ports::record_store::{ChangeSet, NewVideoRecord, RecordStore, StoreError, VideoRecord};

impl From<entities::video::Model> for VideoRecord {
    fn from(video: entities::video::Model) -> Self {
        Self {
            youtube_id: video.youtube_id,
            title: video.title,
            added: video.added,
            removed: video.removed,
            deleted: video.deleted,
            privated: video.privated,
        }
    }
}

/// sea-orm backed record store. Videos are addressed by the remote playlist id.
pub struct DatabaseRecordStore {
    db: Arc<Database>,
}

impl DatabaseRecordStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn find_playlist(
        conn: &impl ConnectionTrait,
        playlist_id: &str,
    ) -> Result<entities::playlist::Model, StoreError> {
        entities::playlist::Entity::find()
            .filter(entities::playlist::Column::YoutubeId.eq(playlist_id))
            .one(conn)
            .await?
            .ok_or_else(|| StoreError::PlaylistNotFound(playlist_id.to_string()))
    }

    /// Overwrite the reconciled fields of one video, keyed by (playlist, youtube id).
    /// Every other column, `added` and the download bookkeeping included, is left as is.
    async fn update_record(
        conn: &impl ConnectionTrait,
        playlist: &entities::playlist::Model,
        record: &VideoRecord,
    ) -> Result<(), StoreError> {
        let model = entities::video::ActiveModel {
            title: Set(record.title.clone()),
            removed: Set(record.removed),
            deleted: Set(record.deleted),
            privated: Set(record.privated),
            updated_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        };

        let result = entities::video::Entity::update_many()
            .set(model)
            .filter(entities::video::Column::PlaylistId.eq(playlist.id))
            .filter(entities::video::Column::YoutubeId.eq(&record.youtube_id))
            .exec(conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(StoreError::VideoNotFound {
                playlist_id: playlist.youtube_id.clone(),
                youtube_id: record.youtube_id.clone(),
            });
        }

        Ok(())
    }

    async fn insert_records(
        conn: &impl ConnectionTrait,
        playlist: &entities::playlist::Model,
        records: &[NewVideoRecord],
    ) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }

        let models = records.iter().map(|record| entities::video::ActiveModel {
            playlist_id: Set(playlist.id),
            youtube_id: Set(record.youtube_id.clone()),
            title: Set(record.title.clone()),
            added: Set(record.added),
            removed: Set(None),
            deleted: Set(record.deleted),
            privated: Set(record.privated),
            ..entities::video::ActiveModel::new()
        });

        entities::video::Entity::insert_many(models).exec(conn).await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordStore for DatabaseRecordStore {
    async fn load_existing(&self, playlist_id: &str) -> Result<Vec<VideoRecord>, StoreError> {
        let playlist = Self::find_playlist(&self.db.conn, playlist_id).await?;

        let videos = entities::video::Entity::find()
            .filter(entities::video::Column::PlaylistId.eq(playlist.id))
            .order_by_asc(entities::video::Column::Id)
            .all(&self.db.conn)
            .await?;

        Ok(videos.into_iter().map(VideoRecord::from).collect())
    }

    /// Writes are checked against the current rows, not the earlier load: an update must
    /// still match its video and an insert must not collide with one written since.
    async fn apply(&self, playlist_id: &str, changes: &ChangeSet) -> Result<(), StoreError> {
        // Dropping the transaction on an early return rolls it back
        let txn = self.db.conn.begin().await?;

        let playlist = Self::find_playlist(&txn, playlist_id).await?;
        for record in &changes.updates {
            Self::update_record(&txn, &playlist, record).await?;
        }
        Self::insert_records(&txn, &playlist, &changes.inserts).await?;

        txn.commit().await?;

        Ok(())
    }
}

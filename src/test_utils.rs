use std::sync::Arc;

use sea_orm::{ActiveModelBehavior, ActiveModelTrait, ConnectOptions, Database as SeaDatabase, Set};

use crate::database::Database;
use crate::entities;

pub async fn test_db() -> Arc<Database> {
    // A single connection, otherwise every pooled connection gets its own empty database
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let conn = SeaDatabase::connect(opt).await.unwrap();
    let db = Database::from_connection(conn)
        .await
        .unwrap_or_else(|e| panic!("Failed to migrate test database: {:?}", e));

    Arc::new(db)
}

pub async fn insert_playlist(db: &Database, youtube_id: &str) -> entities::playlist::Model {
    let playlist = entities::playlist::ActiveModel {
        youtube_id: Set(youtube_id.into()),
        ..entities::playlist::ActiveModel::new()
    };
    playlist.insert(&db.conn).await.unwrap()
}

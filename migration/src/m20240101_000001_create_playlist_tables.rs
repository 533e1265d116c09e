use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Playlist::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Playlist::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Playlist::YoutubeId)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Playlist::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Playlist::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Video::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Video::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Video::PlaylistId).integer().not_null())
                    .col(ColumnDef::new(Video::YoutubeId).string().not_null())
                    .col(ColumnDef::new(Video::Title).string().not_null())
                    .col(ColumnDef::new(Video::Added).timestamp().not_null())
                    .col(ColumnDef::new(Video::Removed).timestamp())
                    .col(
                        ColumnDef::new(Video::Deleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Video::Privated)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Video::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Video::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_videos_playlist_id")
                            .from(Video::Table, Video::PlaylistId)
                            .to(Playlist::Table, Playlist::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A video appears at most once per playlist
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_videos_playlist_id_youtube_id")
                    .table(Video::Table)
                    .col(Video::PlaylistId)
                    .col(Video::YoutubeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Video::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Playlist::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Playlist {
    #[sea_orm(iden = "playlists")]
    Table,
    Id,
    YoutubeId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Video {
    #[sea_orm(iden = "videos")]
    Table,
    Id,
    PlaylistId,
    YoutubeId,
    Title,
    Added,
    Removed,
    Deleted,
    Privated,
    CreatedAt,
    UpdatedAt,
}

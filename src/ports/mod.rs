pub mod playlist_info;
pub mod record_store;

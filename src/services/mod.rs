pub mod background;
pub mod playlist;
pub mod ytdlp;

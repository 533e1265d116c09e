pub mod check;
pub mod client;

pub use check::check_installed;
pub use client::YtDlpClient;

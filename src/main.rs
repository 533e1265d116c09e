mod config;
mod database;
mod entities;
mod logging;
mod ports;
mod services;
#[cfg(test)]
mod test_utils;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};

use crate::{
    config::Config,
    database::Database,
    logging::init_tracing,
    services::{
        background::{sync_all_playlists, watch_playlists},
        playlist::{PlaylistService, reconciler::Reconciler, store::DatabaseRecordStore},
        ytdlp::{YtDlpClient, check_installed},
    },
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "PLAYLIST_TRACKER_CONFIG")]
    config: Option<PathBuf>,

    /// Tracing filter, e.g. `info` or `playlist_tracker=debug`
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: String,

    /// OTLP gRPC endpoint to export spans to
    #[arg(long, global = true, env = "OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that yt-dlp is installed
    Check,
    #[command(subcommand)]
    Config(ConfigCommands),
    #[command(flatten)]
    Playlists(PlaylistCommands),
}

/// Commands that work against the playlist database
#[derive(Subcommand, Debug)]
enum PlaylistCommands {
    /// Start watching a playlist
    Add {
        /// The YouTube playlist id
        playlist_id: String,
    },
    /// Stop watching a playlist and forget its videos
    Remove {
        /// The YouTube playlist id
        playlist_id: String,
    },
    /// List watched playlists
    List,
    /// List the videos of a playlist
    Videos {
        /// The YouTube playlist id
        playlist_id: String,

        /// Include videos no longer in the playlist
        #[arg(short, long)]
        all: bool,
    },
    /// List videos that have not been downloaded yet
    Pending {
        /// Only show videos from this playlist
        playlist_id: Option<String>,
    },
    /// Exclude a video from downloading
    Skip {
        /// The YouTube playlist id
        playlist_id: String,

        /// The YouTube video id
        video_id: String,

        /// Allow the video to be downloaded again
        #[arg(long)]
        undo: bool,
    },
    /// Reconcile playlists against YouTube once
    Sync {
        /// Only sync this playlist (it must be watched)
        playlist_id: Option<String>,
    },
    /// Keep syncing all playlists on an interval
    Watch {
        /// Time between syncs, overrides the config file (e.g. "30m")
        #[arg(short, long, env = "PLAYLIST_TRACKER_WATCH_INTERVAL")]
        interval: Option<humantime::Duration>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let tracer_provider = init_tracing(
        "playlist-tracker",
        args.otlp_endpoint.as_deref(),
        &args.log_level,
    )?;

    let result = run(args).await;

    if let Some(tracer_provider) = tracer_provider
        && let Err(e) = tracer_provider.shutdown()
    {
        tracing::warn!(error = %e, "Failed to flush traces");
    }

    result
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Commands::Config(command) => run_config_command(command),
        Commands::Check => {
            let config = load_config(args.config.as_deref())?;
            let version = check_installed(&config.ytdlp_path())
                .await
                .wrap_err("yt-dlp check failed")?;
            println!("yt-dlp {}", version);
            Ok(())
        }
        Commands::Playlists(command) => {
            let config = load_config(args.config.as_deref())?;
            run_playlist_command(command, &config).await
        }
    }
}

fn run_config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::CreateDefault => {
            if Config::create_default()? {
                tracing::info!("Default config created");
            } else {
                tracing::info!("Config file already exists");
            }
        }
        ConfigCommands::Path => match Config::config_path() {
            Some(path) => println!("{}", path.display()),
            None => println!("No default config path found"),
        },
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    tracing::debug!("Loading configuration");
    match path {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
    .with_context(|| "Failed to load playlist-tracker config")
}

async fn run_playlist_command(command: PlaylistCommands, config: &Config) -> Result<()> {
    let database = Arc::new(Database::open(&config.database_path()).await?);
    let playlists = PlaylistService::new(database.clone());
    let reconciler = Reconciler::new(
        YtDlpClient::new(config.ytdlp_path()),
        DatabaseRecordStore::new(database.clone()),
        config.fetch_timeout()?,
    );

    match command {
        PlaylistCommands::Add { playlist_id } => {
            let playlist = playlists.add(&playlist_id).await?;
            let changes = reconciler
                .reconcile(&playlist.youtube_id, Utc::now())
                .await
                .wrap_err("Playlist added but the first sync failed")?;
            println!(
                "Watching {} ({} videos)",
                playlist.youtube_id,
                changes.inserts.len()
            );
        }
        PlaylistCommands::Remove { playlist_id } => {
            playlists.remove(&playlist_id).await?;
        }
        PlaylistCommands::List => {
            for playlist in playlists.list().await? {
                println!("{}", playlist.youtube_id);
            }
        }
        PlaylistCommands::Videos { playlist_id, all } => {
            for video in playlists.videos(&playlist_id, all).await? {
                let mut status = Vec::new();
                if video.deleted {
                    status.push("deleted");
                }
                if video.privated {
                    status.push("private");
                }
                if video.removed.is_some() {
                    status.push("removed");
                }
                if video.do_not_download {
                    status.push("skipped");
                }
                println!(
                    "{}\t{}\t{}\t{}",
                    video.youtube_id,
                    video.added.format("%Y-%m-%d"),
                    status.join(","),
                    video.title
                );
            }
        }
        PlaylistCommands::Pending { playlist_id } => {
            for video in playlists.pending_downloads(playlist_id.as_deref()).await? {
                println!("{}\t{}", video.youtube_id, video.title);
            }
        }
        PlaylistCommands::Skip {
            playlist_id,
            video_id,
            undo,
        } => {
            playlists
                .set_do_not_download(&playlist_id, &video_id, !undo)
                .await?;
        }
        PlaylistCommands::Sync { playlist_id } => match playlist_id {
            Some(playlist_id) => {
                let changes = reconciler
                    .reconcile(&playlist_id, Utc::now())
                    .await
                    .wrap_err(format!("Failed to sync playlist {}", playlist_id))?;
                println!(
                    "{}: {} new, {} updated, {} unchanged",
                    playlist_id,
                    changes.inserts.len(),
                    changes.updates.len(),
                    changes.unchanged
                );
            }
            None => {
                let summary =
                    sync_all_playlists(&playlists, &reconciler, config.sync_concurrency()).await?;
                println!(
                    "{} playlists synced, {} failed: {} new, {} updated",
                    summary.succeeded, summary.failed, summary.inserted, summary.updated
                );
                if summary.failed > 0 {
                    return Err(color_eyre::eyre::eyre!(
                        "{} playlists failed to sync",
                        summary.failed
                    ));
                }
            }
        },
        PlaylistCommands::Watch { interval } => {
            let interval = match interval {
                Some(interval) => interval.into(),
                None => config.watch_interval()?,
            };
            watch_playlists(
                &playlists,
                &reconciler,
                interval,
                config.sync_concurrency(),
            )
            .await?;
        }
    }

    Ok(())
}

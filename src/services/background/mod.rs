use std::time::Duration;

use chrono::Utc;
use color_eyre::eyre::{Result, WrapErr};
use futures::{StreamExt, stream};
use tracing::instrument;

use crate::ports::playlist_info::PlaylistInfoProvider;
use crate::ports::record_store::RecordStore;
use crate::services::playlist::PlaylistService;
use crate::services::playlist::reconciler::Reconciler;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub inserted: usize,
    pub updated: usize,
}

/// Reconcile every watched playlist, at most `concurrency` at a time.
///
/// A failing playlist is logged and counted; the others still run.
#[instrument(skip(playlists, reconciler))]
pub async fn sync_all_playlists<P, S>(
    playlists: &PlaylistService,
    reconciler: &Reconciler<P, S>,
    concurrency: usize,
) -> Result<SyncSummary>
where
    P: PlaylistInfoProvider,
    S: RecordStore,
{
    let watched = playlists.list().await?;
    let now = Utc::now();

    let results: Vec<_> = stream::iter(watched)
        .map(|playlist| async move {
            let result = reconciler.reconcile(&playlist.youtube_id, now).await;
            (playlist, result)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut summary = SyncSummary::default();
    for (playlist, result) in results {
        match result {
            Ok(changes) => {
                summary.succeeded += 1;
                summary.inserted += changes.inserts.len();
                summary.updated += changes.updates.len();
            }
            Err(e) => {
                summary.failed += 1;
                tracing::error!(
                    playlist = %playlist.youtube_id,
                    error = %e,
                    "Failed to reconcile playlist",
                );
            }
        }
    }

    tracing::info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        inserted = summary.inserted,
        updated = summary.updated,
        "Finished syncing playlists",
    );
    Ok(summary)
}

/// Sync all playlists every `interval` until interrupted with ctrl-c.
pub async fn watch_playlists<P, S>(
    playlists: &PlaylistService,
    reconciler: &Reconciler<P, S>,
    interval: Duration,
    concurrency: usize,
) -> Result<()>
where
    P: PlaylistInfoProvider,
    S: RecordStore,
{
    watch_until(
        playlists,
        reconciler,
        interval,
        concurrency,
        tokio::signal::ctrl_c(),
    )
    .await
}

/// Interval loop behind [`watch_playlists`]. `shutdown` is raced against both the
/// wait and the sync itself; an interrupted sync rolls back its open transaction.
async fn watch_until<P, S, F>(
    playlists: &PlaylistService,
    reconciler: &Reconciler<P, S>,
    interval: Duration,
    concurrency: usize,
    shutdown: F,
) -> Result<()>
where
    P: PlaylistInfoProvider,
    S: RecordStore,
    F: Future<Output = std::io::Result<()>>,
{
    tracing::info!(
        interval = %humantime::format_duration(interval),
        "Watching playlists",
    );

    tokio::pin!(shutdown);
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            signal = &mut shutdown => {
                signal.wrap_err("Failed to listen for ctrl-c")?;
                break;
            }
        }

        tokio::select! {
            result = sync_all_playlists(playlists, reconciler, concurrency) => {
                if let Err(e) = result {
                    tracing::error!(error = ?e, "Failed to sync playlists");
                }
            }
            signal = &mut shutdown => {
                signal.wrap_err("Failed to listen for ctrl-c")?;
                tracing::warn!("Interrupted mid-sync, unfinished playlists were not written");
                break;
            }
        }
    }

    tracing::info!("Stopping playlist watcher");
    Ok(())
}

//! Watch mode: rescan whenever a template source file changes.
//!
//! Events from the OS watcher are funneled through one channel and handled on
//! a single task, so rescans never overlap. Before each rescan the queue is
//! drained, collapsing a burst of saves into one rescan. Events arriving while
//! a rescan runs stay queued and trigger the next one.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing::{error, info, warn};

use crate::errors::{Result, ScannerError};
use crate::TemplateScanner;

/// Paths of the modified files in a watcher event, if it is a change
pub fn changed_paths(event: &Event) -> Vec<PathBuf> {
    match event.kind {
        EventKind::Modify(_) | EventKind::Create(_) => event.paths.clone(),
        _ => Vec::new(),
    }
}

/// Handle queued change batches until the channel closes or `shutdown` resolves.
///
/// Returns the number of rescans performed.
pub async fn run_event_loop<F>(
    scanner: &TemplateScanner,
    events: UnboundedReceiver<Vec<PathBuf>>,
    shutdown: F,
) -> usize
where
    F: std::future::Future<Output = ()>,
{
    drive_rescans(events, shutdown, |paths| {
        let Some(path) = paths.iter().find(|path| scanner.config().is_source_file(path)) else {
            return false;
        };
        match scanner.on_change(path) {
            Some(result) => {
                if let Err(e) = result {
                    error!("Rescan failed: {}", e);
                }
                true
            }
            None => false,
        }
    })
    .await
}

/// Feed coalesced batches to `rescan`, which reports whether it rescanned
async fn drive_rescans<F, R>(
    mut events: UnboundedReceiver<Vec<PathBuf>>,
    shutdown: F,
    mut rescan: R,
) -> usize
where
    F: std::future::Future<Output = ()>,
    R: FnMut(&[PathBuf]) -> bool,
{
    tokio::pin!(shutdown);
    let mut rescans = 0;

    loop {
        let mut pending = tokio::select! {
            _ = &mut shutdown => break,
            batch = events.recv() => match batch {
                Some(batch) => batch,
                None => break,
            },
        };
        while let Ok(batch) = events.try_recv() {
            pending.extend(batch);
        }

        if rescan(&pending) {
            rescans += 1;
        }
    }

    rescans
}

/// Watch the base directory and rescan on changes until Ctrl-C
pub async fn watch(scanner: &TemplateScanner) -> Result<()> {
    let (tx, rx) = unbounded_channel();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let paths = changed_paths(&event);
                if !paths.is_empty() {
                    let _ = tx.send(paths);
                }
            }
            Err(e) => warn!("File watch error: {}", e),
        },
        Config::default(),
    )
    .map_err(|e| ScannerError::WatchError(e.to_string()))?;

    let base_dir = scanner.config().base_dir.clone();
    watcher
        .watch(&base_dir, RecursiveMode::Recursive)
        .map_err(|e| ScannerError::WatchError(format!("{}: {}", base_dir.display(), e)))?;
    info!("Watching {} for changes (Ctrl-C to stop)", base_dir.display());

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
        }
    };
    run_event_loop(scanner, rx, shutdown).await;

    info!("Stopping watcher");
    if let Err(e) = watcher.unwatch(&base_dir) {
        warn!("Failed to unwatch {}: {}", base_dir.display(), e);
    }
    drop(watcher);

    Ok(())
}

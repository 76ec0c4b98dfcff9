//! Watcher thread: notify + debounce, forward created file paths to the
//! async loop.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{EventKind, RecursiveMode, Watcher};

use crate::error::{PermagentError, Result};

/// Run the watcher thread body: watch `root` (non-recursive, creation events
/// only) and send debounced paths over `tx`. Directory creations are
/// dropped here; they never reach the pipeline. The thread exits when the
/// receiver disconnects or on watcher setup error.
pub fn run_watcher_thread(
    root: &Path,
    debounce_ms: u64,
    tx: tokio::sync::mpsc::UnboundedSender<PathBuf>,
) -> Result<()> {
    let debounce = Duration::from_millis(debounce_ms);

    let (event_tx, event_rx) = mpsc::channel::<Vec<PathBuf>>();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(ev) = res {
            if matches!(ev.kind, EventKind::Create(_)) {
                let _ = event_tx.send(ev.paths);
            }
        }
    })
    .map_err(|e| PermagentError::Config(e.to_string()))?;

    watcher
        .watch(root, RecursiveMode::NonRecursive)
        .map_err(|e| PermagentError::Config(e.to_string()))?;

    // Debounce: a burst of events for the same path collapses to one
    // dispatch once the path has been quiet for the debounce window.
    let mut pending: HashMap<PathBuf, Instant> = HashMap::new();

    loop {
        match event_rx.recv_timeout(debounce) {
            Ok(paths) => {
                let now = Instant::now();
                for p in paths {
                    if p.is_dir() {
                        continue;
                    }
                    pending.insert(p, now);
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                let now = Instant::now();
                let ready: Vec<_> = pending
                    .iter()
                    .filter(|(_, t)| now.duration_since(**t) >= debounce)
                    .map(|(p, _)| p.clone())
                    .collect();
                for p in &ready {
                    pending.remove(p);
                }
                for p in ready {
                    if tx.send(p).is_err() {
                        return Ok(());
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
    Ok(())
}

//! Directory watcher: run the pipeline for every file created in one folder.
//!
//! A blocking notify thread debounces creation events and forwards paths over
//! a channel; the async loop here processes them one at a time. On interrupt
//! the loop stops taking new events, drains whatever the watcher already
//! queued, and returns.

mod watcher;

use std::path::Path;

use crate::error::Result;
use crate::ingest::Pipeline;

/// Run the watcher until ctrl-c (or until the watcher thread dies).
///
/// Files are processed sequentially in arrival order; no backpressure is
/// applied beyond the unbounded channel between the watcher thread and this
/// loop.
pub async fn run_watcher(pipeline: Pipeline, root: &Path, debounce_ms: u64) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let thread_root = root.to_path_buf();
    std::thread::spawn(move || {
        if let Err(e) = watcher::run_watcher_thread(&thread_root, debounce_ms, tx) {
            log::error!("watcher thread error: {}", e);
        }
    });

    log::info!("Monitoring folder: {}", root.display());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("Interrupt received, flushing in-flight work");
                break;
            }
            maybe_path = rx.recv() => {
                match maybe_path {
                    Some(path) => {
                        if let Err(e) = pipeline.process_file(&path).await {
                            log::error!("pipeline {}: {}", path.display(), e);
                        }
                    }
                    // Watcher thread exited; nothing more will arrive
                    None => return Ok(()),
                }
            }
        }
    }

    // Drain events the watcher queued before the interrupt, then exit.
    rx.close();
    while let Some(path) = rx.recv().await {
        if let Err(e) = pipeline.process_file(&path).await {
            log::error!("pipeline {}: {}", path.display(), e);
        }
    }

    Ok(())
}

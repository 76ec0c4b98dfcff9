//! Channel-guarded vector index.
//!
//! A dedicated worker task owns the [`VectorStore`] exclusively; every insert
//! and search is serialized through an mpsc command channel with oneshot
//! replies. Concurrent pipeline invocations therefore cannot race on index
//! mutation — the worker applies operations in arrival order.

pub mod store;

pub use store::{IndexEntry, SearchHit, VectorStore};

use crate::error::{PermagentError, Result};
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

/// Commands understood by the index worker
enum IndexCommand {
    Insert {
        chunks: Vec<(String, Vec<f32>)>,
        reply: oneshot::Sender<Vec<Uuid>>,
    },
    Search {
        query: Vec<f32>,
        k: usize,
        reply: oneshot::Sender<Vec<SearchHit>>,
    },
    Len {
        reply: oneshot::Sender<usize>,
    },
}

/// Cloneable handle to the index worker
#[derive(Clone)]
pub struct IndexHandle {
    tx: mpsc::Sender<IndexCommand>,
}

impl IndexHandle {
    /// Insert embedded chunks; returns the assigned chunk ids in order.
    pub async fn insert(&self, chunks: Vec<(String, Vec<f32>)>) -> Result<Vec<Uuid>> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(IndexCommand::Insert { chunks, reply })
            .await
            .map_err(|_| PermagentError::Index("index worker stopped".to_string()))?;
        rx.await
            .map_err(|_| PermagentError::Index("index worker dropped reply".to_string()))
    }

    /// Top-k similarity search over everything inserted so far.
    pub async fn search(&self, query: Vec<f32>, k: usize) -> Result<Vec<SearchHit>> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(IndexCommand::Search { query, k, reply })
            .await
            .map_err(|_| PermagentError::Index("index worker stopped".to_string()))?;
        rx.await
            .map_err(|_| PermagentError::Index("index worker dropped reply".to_string()))
    }

    /// Number of chunks currently indexed.
    pub async fn len(&self) -> Result<usize> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(IndexCommand::Len { reply })
            .await
            .map_err(|_| PermagentError::Index("index worker stopped".to_string()))?;
        rx.await
            .map_err(|_| PermagentError::Index("index worker dropped reply".to_string()))
    }
}

/// Spawn the worker task that owns the store. The worker exits when every
/// handle has been dropped.
pub fn spawn_index_worker() -> IndexHandle {
    let (tx, mut rx) = mpsc::channel::<IndexCommand>(64);

    tokio::spawn(async move {
        let mut store = VectorStore::new();

        while let Some(cmd) = rx.recv().await {
            match cmd {
                IndexCommand::Insert { chunks, reply } => {
                    let ids = chunks
                        .into_iter()
                        .map(|(text, vector)| store.insert(text, vector))
                        .collect();
                    let _ = reply.send(ids);
                }
                IndexCommand::Search { query, k, reply } => {
                    let _ = reply.send(store.top_k(&query, k));
                }
                IndexCommand::Len { reply } => {
                    let _ = reply.send(store.len());
                }
            }
        }
        log::debug!("index worker exiting ({} chunks indexed)", store.len());
    });

    IndexHandle { tx }
}

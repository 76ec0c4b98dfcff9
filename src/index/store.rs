//! In-memory vector store.
//!
//! A flat list of (chunk id, text, embedding) entries. Search is brute-force
//! cosine similarity over all stored vectors. The store has no persistence;
//! it lives and dies with the agent process.

use uuid::Uuid;

/// One indexed chunk
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub chunk_id: Uuid,
    pub text: String,
    pub vector: Vec<f32>,
}

/// A scored search hit
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub chunk_id: Uuid,
    pub text: String,
    pub score: f32,
}

/// In-memory store of embedded chunks
#[derive(Debug, Default)]
pub struct VectorStore {
    entries: Vec<IndexEntry>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert one chunk with its embedding, returning the assigned chunk id.
    pub fn insert(&mut self, text: String, vector: Vec<f32>) -> Uuid {
        let chunk_id = Uuid::new_v4();
        self.entries.push(IndexEntry {
            chunk_id,
            text,
            vector,
        });
        chunk_id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-k entries by cosine similarity to the query vector.
    pub fn top_k(&self, query: &[f32], k: usize) -> Vec<SearchHit> {
        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .map(|e| SearchHit {
                chunk_id: e.chunk_id,
                text: e.text.clone(),
                score: cosine_sim(query, &e.vector),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);
        hits
    }
}

fn cosine_sim(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a < f32::EPSILON || mag_b < f32::EPSILON {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}

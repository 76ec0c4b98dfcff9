//! Read-only dashboard over the success log.
//!
//! Serves a single search page and a JSON endpoint. The log is re-read on
//! every request so the page always reflects the agent's latest appends; the
//! dashboard never writes and never reads the failure log.

use crate::error::{PermagentError, Result};
use crate::logbook::{Logbook, SuccessRecord};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Public gateway used to build per-record retrieval links.
const GATEWAY_URL_BASE: &str = "https://gateway.lighthouse.storage/ipfs/";

/// One record as rendered by the dashboard
#[derive(Debug, Serialize)]
pub struct RecordView {
    pub filename: String,
    pub summary: String,
    pub cid: String,
    pub gateway_url: String,
    pub timestamp: String,
}

impl From<&SuccessRecord> for RecordView {
    fn from(record: &SuccessRecord) -> Self {
        Self {
            filename: record.filename.clone(),
            summary: record.summary.clone(),
            cid: record.cid.clone(),
            gateway_url: format!("{}{}", GATEWAY_URL_BASE, record.cid),
            timestamp: record.timestamp.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecordsQuery {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Serialize)]
struct RecordsResponse {
    records: Vec<RecordView>,
    matched: usize,
    total: usize,
}

/// Case-insensitive substring filter against filename OR summary.
/// An empty query matches every record.
pub fn filter_records<'a>(records: &'a [SuccessRecord], query: &str) -> Vec<&'a SuccessRecord> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|r| {
            r.filename.to_lowercase().contains(&needle)
                || r.summary.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Dashboard HTTP server
pub struct DashboardServer {
    logbook: Arc<Logbook>,
}

impl DashboardServer {
    pub fn new(logbook: Logbook) -> Self {
        Self {
            logbook: Arc::new(logbook),
        }
    }

    /// Bind and serve until the process is interrupted.
    pub async fn run(&self, port: u16) -> Result<()> {
        let app = self.create_router();

        let addr = format!("127.0.0.1:{}", port);
        log::info!("Starting dashboard on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| {
                PermagentError::Config(format!(
                    "Failed to bind to {}: {}. Another dashboard instance may be running; \
                    use --port or dashboard.port in config.toml to pick a different port.",
                    addr, e
                ))
            })?;

        axum::serve(listener, app)
            .await
            .map_err(PermagentError::Io)?;

        Ok(())
    }

    fn create_router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/", get(handle_index))
            .route("/api/records", get(handle_records))
            .with_state(Arc::clone(&self.logbook))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }
}

async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn handle_records(
    State(logbook): State<Arc<Logbook>>,
    Query(params): Query<RecordsQuery>,
) -> std::result::Result<Json<RecordsResponse>, (StatusCode, String)> {
    let records = logbook.read_success().map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to read {}: {}", logbook.success_path().display(), e),
        )
    })?;

    let matching = filter_records(&records, &params.q);

    Ok(Json(RecordsResponse {
        matched: matching.len(),
        total: records.len(),
        records: matching.into_iter().map(RecordView::from).collect(),
    }))
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Lighthouse File Dashboard</title>
<style>
  body { font-family: sans-serif; max-width: 60rem; margin: 2rem auto; padding: 0 1rem; }
  input { width: 100%; padding: 0.5rem; font-size: 1rem; box-sizing: border-box; }
  .record { border-bottom: 1px solid #ddd; padding: 0.8rem 0; }
  .filename { font-weight: bold; }
  .meta { color: #666; font-size: 0.85rem; }
  code { background: #f4f4f4; padding: 0 0.25rem; }
</style>
</head>
<body>
<h1>Lighthouse Storage Dashboard</h1>
<input id="q" type="text" placeholder="Search by filename or summary...">
<p id="count"></p>
<div id="records"></div>
<script>
const input = document.getElementById('q');
const recordsEl = document.getElementById('records');
const countEl = document.getElementById('count');

async function refresh() {
  const res = await fetch('/api/records?q=' + encodeURIComponent(input.value));
  if (!res.ok) {
    countEl.textContent = 'Failed to load records';
    return;
  }
  const data = await res.json();
  if (data.total === 0) {
    countEl.textContent = 'No uploaded files found yet.';
    recordsEl.innerHTML = '';
    return;
  }
  countEl.textContent = 'Showing ' + data.matched + ' of ' + data.total + ' files';
  recordsEl.innerHTML = data.records.map(r =>
    '<div class="record">' +
    '<div class="filename">' + escapeHtml(r.filename) + '</div>' +
    '<div>' + escapeHtml(r.summary) + '</div>' +
    '<div class="meta">CID: <code>' + escapeHtml(r.cid) + '</code> &middot; ' +
    '<a href="' + r.gateway_url + '">View on IPFS</a> &middot; ' +
    escapeHtml(r.timestamp) + '</div>' +
    '</div>').join('');
}

function escapeHtml(s) {
  const div = document.createElement('div');
  div.textContent = s;
  return div.innerHTML;
}

input.addEventListener('input', refresh);
refresh();
</script>
</body>
</html>
"#;

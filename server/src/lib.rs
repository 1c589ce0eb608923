use anyhow::Result;
use axum::extract::{Path as UrlPath, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use evidex_core::{corpus, persist, Evidence, IndexSnapshot, LinkGraph, SearchEngine, SearchHit, SearchOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
    pub defaults: SearchOptions,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
    /// Overrides the configured content/graph blend for this query.
    pub alpha: Option<f64>,
}
fn default_k() -> usize {
    10
}

#[derive(Deserialize)]
pub struct EvidenceParams {
    pub claim: String,
    #[serde(default = "default_evidence_k")]
    pub k: usize,
}
fn default_evidence_k() -> usize {
    3
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct EvidenceResponse {
    pub claim: String,
    pub evidence: Vec<Evidence>,
}

/// Load snapshots and assemble the router. A missing index is "not ready"
/// and fails startup; a missing graph only degrades authority scores to 0.
pub fn build_app(
    index_path: &Path,
    graph_path: Option<&Path>,
    corpus_path: Option<&Path>,
    defaults: SearchOptions,
) -> Result<Router> {
    let index: IndexSnapshot = persist::load_json(index_path)?;
    tracing::info!(total_docs = index.total_docs, "index snapshot loaded");

    let mut engine = SearchEngine::new(index);
    if let Some(path) = graph_path {
        match persist::load_json::<LinkGraph>(path) {
            Ok(graph) => {
                tracing::info!(nodes = graph.degree.len(), "graph snapshot loaded");
                engine = engine.with_graph(graph);
            }
            Err(err) => {
                tracing::warn!(%err, "graph snapshot unavailable, ranking on content only");
            }
        }
    }
    if let Some(path) = corpus_path {
        let documents = corpus::load_path(path)?;
        engine = engine.with_documents(&documents);
    }

    let state = AppState {
        engine: Arc::new(engine),
        defaults,
    };

    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/evidence", get(evidence_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/verify", post(verify_stub))
        .with_state(state)
        .layer(cors);
    Ok(app)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let opts = SearchOptions {
        top_k: params.k.max(1).min(100),
        alpha: params.alpha.unwrap_or(state.defaults.alpha).clamp(0.0, 1.0),
        graph_scale: state.defaults.graph_scale,
    };
    let results = state.engine.search(&params.q, &opts);
    Json(SearchResponse {
        query: params.q,
        took_s: start.elapsed().as_secs_f64(),
        total_hits: results.len(),
        results,
    })
}

pub async fn evidence_handler(
    State(state): State<AppState>,
    Query(params): Query<EvidenceParams>,
) -> Json<EvidenceResponse> {
    let evidence = state
        .engine
        .evidence(&params.claim, params.k.max(1).min(20), &state.defaults);
    Json(EvidenceResponse {
        claim: params.claim,
        evidence,
    })
}

pub async fn doc_handler(
    State(state): State<AppState>,
    UrlPath(doc_id): UrlPath<u32>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state.engine.doc_info(doc_id) {
        Some((url, title, date)) => {
            let mut obj = serde_json::json!({
                "doc_id": doc_id,
                "url": url,
                "title": title,
                "date": date,
            });
            if let Some(content) = state.engine.doc_content(doc_id) {
                obj["content"] = serde_json::Value::String(content.to_string());
            }
            (StatusCode::OK, Json(obj))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "not found" })),
        ),
    }
}

// Verdicts come from the external fact-verification service; this service
// only supplies the evidence list.
async fn verify_stub() -> (StatusCode, String) {
    (
        StatusCode::NOT_IMPLEMENTED,
        "verification is performed by the external LLM collaborator".to_string(),
    )
}

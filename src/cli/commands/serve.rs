//! HTTP API server for integration with other systems.
//!
//! Provides JSON endpoints for indexing, retrieval and recommendations.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::RecipeRagError;
use crate::orchestrator::Orchestrator;
use crate::rag::Preferences;
use crate::vector_store::EntryMetadata;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let indexed = orchestrator.indexed_count().await?;
    info!("Serving with {} indexed recipes", indexed);

    let app = router(Arc::new(AppState { orchestrator }));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("RecipeRAG API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    if indexed == 0 {
        Output::warning("The recipe index is empty. POST /index to build it.");
    }
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Recipes", "GET  /recipes?limit=10");
    Output::kv("Index", "POST /index");
    Output::kv("Search", "POST /search");
    Output::kv("Suggest", "POST /suggest");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/recipes", get(list_recipes))
        .route("/index", post(index))
        .route("/search", post(search))
        .route("/suggest", post(suggest))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct RecipesQuery {
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    10
}

#[derive(Serialize)]
struct RecipeSummary {
    name: String,
    cuisine: String,
    nutrition_str: String,
}

#[derive(Serialize)]
struct RecipesResponse {
    recipes: Vec<RecipeSummary>,
    total: usize,
}

#[derive(Deserialize)]
struct SearchRequest {
    #[serde(flatten)]
    prefs: Preferences,
    #[serde(default)]
    top_k: Option<usize>,
}

#[derive(Serialize)]
struct SearchResponse {
    augmented_query: String,
    latency_seconds: f64,
    results: Vec<SearchHit>,
}

#[derive(Serialize)]
struct SearchHit {
    id: String,
    metadata: EntryMetadata,
    document: String,
    score: f32,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: &RecipeRagError) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn validate(prefs: &Preferences) -> Result<(), Response> {
    if prefs.query.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            &RecipeRagError::InvalidInput("query must not be empty".to_string()),
        ));
    }
    Ok(())
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_recipes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecipesQuery>,
) -> Response {
    match state.orchestrator.load_recipes(None) {
        Ok(rows) => Json(RecipesResponse {
            total: rows.len(),
            recipes: rows
                .into_iter()
                .take(params.limit)
                .map(|row| RecipeSummary {
                    name: row.name().to_string(),
                    cuisine: row.cuisine().to_string(),
                    nutrition_str: row.nutrition_str,
                })
                .collect(),
        })
        .into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e),
    }
}

async fn index(State(state): State<Arc<AppState>>) -> Response {
    match state.orchestrator.index_recipes(None).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e),
    }
}

async fn search(State(state): State<Arc<AppState>>, Json(req): Json<SearchRequest>) -> Response {
    if let Err(response) = validate(&req.prefs) {
        return response;
    }

    match state.orchestrator.search(&req.prefs, req.top_k).await {
        Ok(retrieval) => Json(SearchResponse {
            augmented_query: retrieval.augmented_query,
            latency_seconds: retrieval.latency_seconds,
            results: retrieval
                .results
                .into_iter()
                .map(|r| SearchHit {
                    id: r.entry.id,
                    metadata: r.entry.metadata,
                    document: r.entry.document,
                    score: r.score,
                })
                .collect(),
        })
        .into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e),
    }
}

async fn suggest(State(state): State<Arc<AppState>>, Json(prefs): Json<Preferences>) -> Response {
    if let Err(response) = validate(&prefs) {
        return response;
    }

    match state.orchestrator.suggest(&prefs).await {
        Ok(recommendation) => Json(recommendation).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e),
    }
}

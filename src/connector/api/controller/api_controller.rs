use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::models::{CallDirection, ContextNode, Node, NodeLabel, SearchConfig};

use super::super::Container;

/// Serves the search facade over HTTP (spec §6's `api` subcommand). The
/// teacher declares `axum` in its dependency table but never wires a server
/// with it; this is authored fresh in its idiom rather than adapted from an
/// existing file.
pub struct ApiController<'a> {
    container: &'a Container,
}

#[derive(Deserialize)]
struct SearchParams {
    q: String,
    #[serde(default = "default_num")]
    num: usize,
}

fn default_num() -> usize {
    10
}

#[derive(Deserialize)]
struct SearchBody {
    query: String,
    #[serde(default = "default_num")]
    num: usize,
    #[serde(default)]
    min_score: Option<f32>,
    #[serde(default)]
    node_types: Vec<String>,
    #[serde(default)]
    context: bool,
    #[serde(default)]
    call_hierarchy: bool,
    #[serde(default)]
    inheritance: bool,
}

#[derive(Deserialize)]
struct ExplainParams {
    q: String,
}

#[derive(Deserialize)]
struct CallHierarchyBody {
    node_id: String,
    #[serde(default = "default_direction")]
    direction: String,
    #[serde(default = "default_max_depth")]
    max_depth: usize,
}

fn default_direction() -> String {
    "both".to_string()
}

fn default_max_depth() -> usize {
    2
}

#[derive(Deserialize)]
struct InheritanceHierarchyBody {
    node_id: String,
}

#[derive(Serialize)]
struct ContextNodeJson {
    node_id: String,
    label: String,
    name: String,
    relationship_type: String,
    depth: usize,
}

impl From<&ContextNode> for ContextNodeJson {
    fn from(n: &ContextNode) -> Self {
        Self {
            node_id: n.node_id.clone(),
            label: n.label.to_string(),
            name: n.name.clone(),
            relationship_type: n.relationship_type.as_str().to_string(),
            depth: n.depth,
        }
    }
}

#[derive(Serialize)]
struct CallHierarchyResponse {
    callers: Vec<ContextNodeJson>,
    callees: Vec<ContextNodeJson>,
}

#[derive(Serialize)]
struct InheritanceHierarchyResponse {
    ancestors: Vec<ContextNodeJson>,
    descendants: Vec<ContextNodeJson>,
}

#[derive(Serialize)]
struct ExplainResponse {
    query_type: String,
    confidence: f32,
    entities: Vec<String>,
    semantic_terms: Vec<String>,
    explanations: Vec<String>,
}

#[derive(Serialize)]
struct SearchResponse {
    query_type: String,
    confidence: f32,
    results: Vec<SearchResultJson>,
}

#[derive(Serialize)]
struct SearchResultJson {
    node_id: String,
    label: String,
    name: String,
    full_name: String,
    summary: Option<String>,
    score: f32,
    match_type: String,
    related_node_count: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

struct ApiError(crate::domain::error::GraphError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = axum::http::StatusCode::from_u16(self.0.http_status()).unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(ErrorResponse { error: self.0.to_string() });
        (status, body).into_response()
    }
}

impl<'a> ApiController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Builds the axum router backed by an owned `Arc<Container>`. Owned
    /// rather than borrowed because axum handlers must outlive the request.
    pub fn build_router(container: Arc<Container>) -> Router {
        Router::new()
            .route("/search", get(search_handler).post(search_post_handler))
            .route("/status", get(status_handler))
            .route("/stats", get(status_handler))
            .route("/node/:id", get(node_handler))
            .route("/hierarchy/call", post(call_hierarchy_handler))
            .route("/hierarchy/inheritance", post(inheritance_hierarchy_handler))
            .route("/explain", get(explain_handler))
            .route("/health", get(health_handler))
            .with_state(container)
    }

    pub async fn serve(&self, container: Arc<Container>, host: String, port: u16) -> Result<String> {
        let router = Self::build_router(container);
        let addr = format!("{host}:{port}");
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("serving search API on {addr}");
        axum::serve(listener, router).await?;
        Ok(format!("API server on {addr} shut down"))
    }
}

async fn search_handler(
    State(container): State<Arc<Container>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let facade = container.search_facade();
    let mut config = SearchConfig::default();
    config.max_total_results = params.num;

    let outcome = facade.search(&params.q, &config).await.map_err(ApiError)?;
    Ok(Json(SearchResponse {
        query_type: format!("{:?}", outcome.intent.query_type),
        confidence: outcome.intent.confidence,
        results: outcome
            .results
            .into_iter()
            .map(|r| SearchResultJson {
                node_id: r.node_id,
                label: r.label.to_string(),
                name: r.name,
                full_name: r.full_name,
                summary: r.summary,
                score: r.score,
                match_type: r.match_type,
                related_node_count: r.related_node_count,
            })
            .collect(),
    }))
}

async fn status_handler(State(container): State<Arc<Container>>) -> Result<Json<serde_json::Value>, ApiError> {
    let stats = container.store().stats().await.map_err(ApiError)?;
    Ok(Json(serde_json::json!({
        "total_nodes": stats.total_nodes(),
        "total_relationships": stats.total_relationships(),
        "file_count": stats.file_count,
        "summarized_count": stats.summarized_count,
        "embedded_count": stats.embedded_count,
    })))
}

async fn search_post_handler(
    State(container): State<Arc<Container>>,
    Json(body): Json<SearchBody>,
) -> Result<Json<SearchResponse>, ApiError> {
    let facade = container.search_facade();
    let mut config = SearchConfig::default();
    config.max_total_results = body.num;
    if let Some(min_score) = body.min_score {
        config.min_similarity_threshold = min_score;
    }
    config.enable_context_expansion = body.context || body.call_hierarchy || body.inheritance;
    config.expand_call_hierarchy = body.call_hierarchy;
    config.expand_inheritance = body.inheritance;

    let node_types: Vec<NodeLabel> = body.node_types.iter().filter_map(|s| NodeLabel::parse(s)).collect();
    let mut outcome = facade.search(&body.query, &config).await.map_err(ApiError)?;
    if !node_types.is_empty() {
        outcome.results.retain(|r| node_types.contains(&r.label));
    }

    Ok(Json(SearchResponse {
        query_type: format!("{:?}", outcome.intent.query_type),
        confidence: outcome.intent.confidence,
        results: outcome
            .results
            .into_iter()
            .map(|r| SearchResultJson {
                node_id: r.node_id,
                label: r.label.to_string(),
                name: r.name,
                full_name: r.full_name,
                summary: r.summary,
                score: r.score,
                match_type: r.match_type,
                related_node_count: r.related_node_count,
            })
            .collect(),
    }))
}

async fn node_handler(State(container): State<Arc<Container>>, Path(id): Path<String>) -> Result<Json<Node>, ApiError> {
    let facade = container.search_facade();
    match facade.node_details(&id).await.map_err(ApiError)? {
        Some(node) => Ok(Json(node)),
        None => Err(ApiError(crate::domain::error::GraphError::NotFound(id))),
    }
}

async fn call_hierarchy_handler(
    State(container): State<Arc<Container>>,
    Json(body): Json<CallHierarchyBody>,
) -> Result<Json<CallHierarchyResponse>, ApiError> {
    let facade = container.search_facade();
    let direction = CallDirection::parse(&body.direction).unwrap_or(CallDirection::Both);
    let hierarchy = facade
        .call_hierarchy(&body.node_id, direction, body.max_depth)
        .await
        .map_err(ApiError)?;
    Ok(Json(CallHierarchyResponse {
        callers: hierarchy.callers.iter().map(ContextNodeJson::from).collect(),
        callees: hierarchy.callees.iter().map(ContextNodeJson::from).collect(),
    }))
}

async fn inheritance_hierarchy_handler(
    State(container): State<Arc<Container>>,
    Json(body): Json<InheritanceHierarchyBody>,
) -> Result<Json<InheritanceHierarchyResponse>, ApiError> {
    let facade = container.search_facade();
    let hierarchy = facade.inheritance_hierarchy(&body.node_id).await.map_err(ApiError)?;
    Ok(Json(InheritanceHierarchyResponse {
        ancestors: hierarchy.ancestors.iter().map(ContextNodeJson::from).collect(),
        descendants: hierarchy.descendants.iter().map(ContextNodeJson::from).collect(),
    }))
}

async fn explain_handler(
    State(container): State<Arc<Container>>,
    Query(params): Query<ExplainParams>,
) -> Result<Json<ExplainResponse>, ApiError> {
    let facade = container.search_facade();
    let config = SearchConfig::default();
    let (outcome, explanations) = facade.explain(&params.q, &config).await.map_err(ApiError)?;
    Ok(Json(ExplainResponse {
        query_type: format!("{:?}", outcome.intent.query_type),
        confidence: outcome.intent.confidence,
        entities: outcome.intent.entities.clone(),
        semantic_terms: outcome.intent.semantic_terms.clone(),
        explanations,
    }))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

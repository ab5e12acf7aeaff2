// src/api.rs
//! HTTP surface: health, direct evaluation of a provided batch, strategy
//! assessment, and the end-to-end research endpoint (retrieve + evaluate).

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::assess::{CredibilityStrategy, MultiDimensionalStrategy, QuickStrategy, SourceAssessment};
use crate::evaluation::EvaluationReport;
use crate::evaluator::CredibilityEvaluator;
use crate::retrieval::Retriever;
use crate::source::SourceBatch;

#[derive(Clone)]
pub struct AppState {
    evaluator: CredibilityEvaluator,
    quick: Arc<QuickStrategy>,
    multi: Arc<MultiDimensionalStrategy>,
    retriever: Arc<Retriever>,
}

impl AppState {
    pub fn new(
        evaluator: CredibilityEvaluator,
        quick: QuickStrategy,
        multi: MultiDimensionalStrategy,
        retriever: Retriever,
    ) -> Self {
        Self {
            evaluator,
            quick: Arc::new(quick),
            multi: Arc::new(multi),
            retriever: Arc::new(retriever),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/evaluate", post(evaluate))
        .route("/assess", post(assess))
        .route("/research", get(research))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Evaluate a caller-provided batch (no retrieval).
async fn evaluate(
    State(state): State<AppState>,
    Json(batch): Json<SourceBatch>,
) -> Json<EvaluationReport> {
    Json(state.evaluator.evaluate(&batch))
}

#[derive(Debug, Deserialize)]
struct AssessParams {
    /// "quick" or "multi" (default).
    #[serde(default)]
    strategy: Option<String>,
}

/// Run one of the credibility strategies over a caller-provided batch.
async fn assess(
    State(state): State<AppState>,
    Query(params): Query<AssessParams>,
    Json(batch): Json<SourceBatch>,
) -> Json<Vec<SourceAssessment>> {
    let strategy: &dyn CredibilityStrategy = match params.strategy.as_deref() {
        Some("quick") => state.quick.as_ref(),
        _ => state.multi.as_ref(),
    };
    Json(strategy.assess(&batch).await)
}

#[derive(Debug, Deserialize)]
struct ResearchParams {
    query: String,
}

/// Retrieve from all configured providers, then evaluate.
async fn research(
    State(state): State<AppState>,
    Query(params): Query<ResearchParams>,
) -> Json<EvaluationReport> {
    let batch = state.retriever.retrieve(&params.query).await;
    Json(state.evaluator.evaluate(&batch))
}

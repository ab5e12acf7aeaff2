//! Research-assistant credibility service — binary entrypoint.
//! Boots the Axum HTTP server, wiring heuristic tables, the evaluation
//! pipeline, strategies, retrieval providers, and Prometheus metrics.

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use source_credibility_analyzer::ai_adapter::build_client_from_config;
use source_credibility_analyzer::api::{self, AppState};
use source_credibility_analyzer::assess::{MultiDimensionalStrategy, QuickStrategy};
use source_credibility_analyzer::config::LlmConfig;
use source_credibility_analyzer::evaluator::CredibilityEvaluator;
use source_credibility_analyzer::heuristics::{HeuristicTables, TablesHandle};
use source_credibility_analyzer::metrics::Metrics;
use source_credibility_analyzer::retrieval::Retriever;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    // --- Heuristic tables (env-overridable, hot-reloadable) ---
    let tables = HeuristicTables::load()?;
    let metrics = Metrics::init(tables.version);
    let evaluator = CredibilityEvaluator::new(TablesHandle::new(tables));

    // --- Strategies ---
    let llm = LlmConfig::load()?;
    let quick = QuickStrategy::new(build_client_from_config(&llm));
    let multi = MultiDimensionalStrategy::new(evaluator.clone());

    // --- Retrieval providers from environment ---
    let retriever = Retriever::from_env(5);

    let state = AppState::new(evaluator, quick, multi, retriever);
    let router = api::router(state).merge(metrics.router());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "credibility service listening");
    axum::serve(listener, router).await?;

    Ok(())
}

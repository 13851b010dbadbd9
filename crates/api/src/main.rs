use axum::{extract::State, response::Html, routing::get, Json, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use percapita_core::domain::chart::ChartConfig;
use percapita_core::ingest::{DatasetSource, HttpDatasetSource};
use percapita_core::pipeline::{self, PipelineConfig};

mod error;
mod page;

use error::ApiError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = percapita_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let config = settings.pipeline_config();
    let source = match HttpDatasetSource::new(config.request_timeout()) {
        Ok(source) => source,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "failed to build dataset client");
            return Err(e);
        }
    };

    let state = AppState {
        config: Arc::new(config),
        source: Arc::new(source),
    };

    let app = Router::new()
        .route("/", get(home))
        .route("/chart.json", get(chart_json))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let port = settings.port.unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[derive(Clone)]
struct AppState {
    config: Arc<PipelineConfig>,
    source: Arc<dyn DatasetSource>,
}

async fn healthz() -> &'static str {
    "ok"
}

/// Every request runs the pipeline from scratch; nothing is cached.
async fn build_chart(state: &AppState) -> Result<ChartConfig, ApiError> {
    let output = pipeline::run(&state.config, state.source.as_ref()).await?;
    Ok(output.chart)
}

async fn home(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let chart = build_chart(&state).await?;
    let json = pipeline::chart::to_json(&chart)?;
    Ok(Html(page::render_chart_page(&chart.title.text, &json)))
}

async fn chart_json(State(state): State<AppState>) -> Result<Json<ChartConfig>, ApiError> {
    Ok(Json(build_chart(&state).await?))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &percapita_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

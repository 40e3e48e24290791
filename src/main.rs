use axum::http::HeaderValue;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use racewatch::config::Config;
use racewatch::metrics::MetricsService;
use racewatch::pipeline::PipelineConfig;
use racewatch::shared::AppState;
use racewatch::simulator::Simulator;
use racewatch::sse::SseHub;
use racewatch::store::repository::InMemoryRaceRepository;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "racewatch=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Invalid configuration: {error}");
            std::process::exit(1);
        }
    };

    info!("Starting race telemetry server");

    let race_repository = Arc::new(
        InMemoryRaceRepository::new(config.ring_buffer_capacity)
            .expect("ring buffer capacity already validated"),
    );
    let sse_hub = SseHub::new(config.heartbeat_interval);
    let metrics = Arc::new(MetricsService::new(60, 1024).expect("static metrics parameters"));

    let state = AppState::new(
        race_repository,
        sse_hub,
        metrics,
        PipelineConfig::default(),
        config.history_window_ms,
    );

    if config.simulator_enabled {
        Simulator::new(state.clone(), config.simulator_period).spawn();
    }

    let app = racewatch::build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    info!("Server running on http://localhost:{}", config.port);
    axum::serve(listener, app).await.unwrap();
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.allows_any_origin() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_lettings_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use bomahub::config::AppConfig;
use bomahub::error::AppError;
use bomahub::lettings::{LettingsEngine, MemoryStore};
use bomahub::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(MemoryStore::new());
    let engine = Arc::new(LettingsEngine::new(store));

    let app = with_lettings_routes(engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "lettings service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

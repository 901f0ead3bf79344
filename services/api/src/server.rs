use crate::cli::ServeArgs;
use crate::demo::sample_campus;
use crate::infra::{
    AppState, InMemoryApplicationStore, InMemoryCampusDirectory, InMemoryNotificationSink,
};
use crate::routes::with_placement_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

use placement::config::AppConfig;
use placement::error::AppError;
use placement::telemetry;
use placement::workflows::hiring::PlacementService;

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

    let store = Arc::new(InMemoryApplicationStore::default());
    let directory = Arc::new(InMemoryCampusDirectory::default());
    let sink = Arc::new(InMemoryNotificationSink::default());
    sample_campus(&directory);

    let service = Arc::new(PlacementService::new(store, directory, sink));
    let app = with_placement_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "placement portal engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}

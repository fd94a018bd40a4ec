use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryCatalogStore, InMemoryProfileStore, SessionDirectory, TracingNotifier,
};
use crate::routes::with_catalog_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use classifieds::catalog::{CatalogService, CatalogState};
use classifieds::config::AppConfig;
use classifieds::error::AppError;
use classifieds::telemetry;
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

    let store = Arc::new(InMemoryCatalogStore::default());
    let profiles = Arc::new(InMemoryProfileStore::default());
    let notifier = Arc::new(TracingNotifier);
    let sessions = Arc::new(SessionDirectory::new(&config.sessions, profiles.clone()));
    let service = Arc::new(CatalogService::new(store, profiles, notifier));

    let app = with_catalog_routes(CatalogState { service, sessions })
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "classifieds catalog ready");

    axum::serve(listener, app).await?;
    Ok(())
}

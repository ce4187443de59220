use crate::cli::ServeArgs;
use crate::infra::{
    AppState, Base64PayloadRenderer, InMemoryApplicationRepository, InMemoryNotificationStore,
    SidecarTextGateway,
};
use crate::routes::with_pass_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use buspass::config::AppConfig;
use buspass::error::AppError;
use buspass::telemetry;
use buspass::workflows::pass::applications::{PassApplicationService, VerificationConfig};
use buspass::workflows::pass::clock::SystemClock;
use buspass::workflows::pass::expiry::{ExpirySweep, ExpirySweepScheduler};
use buspass::workflows::pass::notifications::NotificationDispatcher;
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

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let notification_store = Arc::new(InMemoryNotificationStore::default());
    let dispatcher = Arc::new(NotificationDispatcher::new(notification_store));
    let clock = Arc::new(SystemClock);

    let pass_service = Arc::new(PassApplicationService::new(
        repository.clone(),
        dispatcher.clone(),
        Arc::new(SidecarTextGateway),
        Arc::new(Base64PayloadRenderer),
        clock.clone(),
        VerificationConfig {
            language_hint: config.extraction.language_hint.clone(),
            extraction_budget: config.extraction.timeout,
        },
    ));

    let sweep = Arc::new(ExpirySweep::new(repository, dispatcher, clock.clone()));
    let scheduler = ExpirySweepScheduler::new(sweep, clock, config.sweep);
    scheduler.start()?;

    let app = with_pass_routes(pass_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "bus pass lifecycle service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

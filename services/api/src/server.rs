use crate::cli::ServeArgs;
use crate::infra::{
    seed_users, AppState, InMemoryIdentityProvider, InMemoryLogStore, InMemoryUserDirectory,
};
use crate::routes::with_marriage_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use kua_workflow::config::AppConfig;
use kua_workflow::error::AppError;
use kua_workflow::telemetry;
use kua_workflow::workflows::marriage::{
    AdminOperations, ApplicationEventHandlers, WhatsAppDispatcher,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

/// Client for the WhatsApp gateway. Requests run with the client defaults: no timeout
/// override and no retry.
pub(crate) fn http_client() -> Result<reqwest::Client, AppError> {
    let client = reqwest::Client::builder().build()?;
    Ok(client)
}

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

    let notifier = Arc::new(WhatsAppDispatcher::new(
        http_client()?,
        &config.notifications,
    ));
    if !notifier.is_configured() {
        warn!("WHATSAPP_API_URL or WHATSAPP_API_KEY missing; notifications will be skipped");
    }

    let users = Arc::new(InMemoryUserDirectory::default());
    seed_users(&users, &config.bootstrap);
    if config.bootstrap.superadmin.is_none() {
        warn!("no bootstrap superadmin configured; createUser will deny every caller");
    }
    let logs = Arc::new(InMemoryLogStore::default());
    let identities = Arc::new(InMemoryIdentityProvider::default());

    let handlers = Arc::new(ApplicationEventHandlers::new(
        users.clone(),
        logs.clone(),
        notifier.clone(),
    ));
    let admin = Arc::new(AdminOperations::new(users, logs, identities, notifier));

    let app = with_marriage_routes(handlers, admin)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "KUA marriage workflow service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

use crate::cli::ServeArgs;
use crate::infra::{load_cap_table, AppState, EstimatedValuation};
use crate::routes::with_deposit_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use deposit_guard::config::AppConfig;
use deposit_guard::error::AppError;
use deposit_guard::telemetry;
use deposit_guard::workflows::deposit::{DepositReportService, InMemoryDepositRepository};
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

    let caps = load_cap_table(config.eligibility.cap_table_path.as_deref())?;
    let repository = Arc::new(InMemoryDepositRepository::default());
    let valuation = Arc::new(EstimatedValuation);
    let deposit_service = Arc::new(DepositReportService::new(repository, valuation, caps));

    let app = with_deposit_routes(deposit_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "deposit eligibility service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

use crate::cli::ServeArgs;
use crate::infra::{open_stores, AppState};
use crate::routes::with_survey_routes;
use crate::seed::seed_if_empty;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use trait_survey::assessment::SurveyService;
use trait_survey::config::{AppConfig, DataSourceKind};
use trait_survey::error::AppError;
use trait_survey::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(data_dir) = args.data_dir.take() {
        config.storage.data_source = DataSourceKind::File;
        config.storage.data_dir = data_dir;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let (questionnaires, results) = open_stores(&config.storage)?;
    if config.storage.seed_samples {
        seed_if_empty(questionnaires.as_ref(), results.as_ref())?;
    }
    let survey_service = Arc::new(SurveyService::new(
        questionnaires,
        results,
        config.survey,
    ));

    let app = with_survey_routes(survey_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        data_source = ?config.storage.data_source,
        %addr,
        "trait survey service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::analytics::{CandidateFilter, ResultFilter};
use super::attempt::Respondent;
use super::domain::{Answer, QuestionnaireId, ResultId, UserId};
use super::repository::{QuestionnaireRepository, ResultRepository};
use super::service::{QuestionnaireDraft, SurveyService, SurveyServiceError};

/// Body of a survey submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub user_id: UserId,
    pub user_name: String,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRequest {
    pub result_ids: Vec<ResultId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitAnalysisQuery {
    #[serde(default)]
    pub questionnaire_id: Option<QuestionnaireId>,
}

/// Router exposing questionnaire authoring, survey submission, and recruiter analytics.
pub fn survey_router<Q, R>(service: Arc<SurveyService<Q, R>>) -> Router
where
    Q: QuestionnaireRepository + 'static,
    R: ResultRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/questionnaires",
            get(list_questionnaires_handler::<Q, R>).post(create_questionnaire_handler::<Q, R>),
        )
        .route(
            "/api/v1/questionnaires/import",
            post(import_questionnaire_handler::<Q, R>),
        )
        .route(
            "/api/v1/questionnaires/:questionnaire_id",
            get(get_questionnaire_handler::<Q, R>)
                .put(update_questionnaire_handler::<Q, R>)
                .delete(delete_questionnaire_handler::<Q, R>),
        )
        .route(
            "/api/v1/questionnaires/:questionnaire_id/export",
            get(export_questionnaire_handler::<Q, R>),
        )
        .route(
            "/api/v1/questionnaires/:questionnaire_id/results",
            post(submit_handler::<Q, R>),
        )
        .route("/api/v1/results", get(search_results_handler::<Q, R>))
        .route(
            "/api/v1/results/:result_id",
            get(get_result_handler::<Q, R>).delete(delete_result_handler::<Q, R>),
        )
        .route(
            "/api/v1/results/:result_id/certificate",
            get(certificate_handler::<Q, R>),
        )
        .route(
            "/api/v1/analytics/traits",
            get(trait_analysis_handler::<Q, R>),
        )
        .route("/api/v1/analytics/compare", post(compare_handler::<Q, R>))
        .with_state(service)
}

fn error_response(error: SurveyServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (error.status_code(), axum::Json(payload)).into_response()
}

pub(crate) async fn list_questionnaires_handler<Q, R>(
    State(service): State<Arc<SurveyService<Q, R>>>,
) -> Response
where
    Q: QuestionnaireRepository + 'static,
    R: ResultRepository + 'static,
{
    match service.list_questionnaires() {
        Ok(questionnaires) => (StatusCode::OK, axum::Json(questionnaires)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_questionnaire_handler<Q, R>(
    State(service): State<Arc<SurveyService<Q, R>>>,
    axum::Json(draft): axum::Json<QuestionnaireDraft>,
) -> Response
where
    Q: QuestionnaireRepository + 'static,
    R: ResultRepository + 'static,
{
    match service.create_questionnaire(draft) {
        Ok(questionnaire) => (StatusCode::CREATED, axum::Json(questionnaire)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_questionnaire_handler<Q, R>(
    State(service): State<Arc<SurveyService<Q, R>>>,
    Path(questionnaire_id): Path<String>,
) -> Response
where
    Q: QuestionnaireRepository + 'static,
    R: ResultRepository + 'static,
{
    match service.get_questionnaire(&QuestionnaireId(questionnaire_id)) {
        Ok(questionnaire) => (StatusCode::OK, axum::Json(questionnaire)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_questionnaire_handler<Q, R>(
    State(service): State<Arc<SurveyService<Q, R>>>,
    Path(questionnaire_id): Path<String>,
    axum::Json(draft): axum::Json<QuestionnaireDraft>,
) -> Response
where
    Q: QuestionnaireRepository + 'static,
    R: ResultRepository + 'static,
{
    match service.update_questionnaire(&QuestionnaireId(questionnaire_id), draft) {
        Ok(questionnaire) => (StatusCode::OK, axum::Json(questionnaire)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_questionnaire_handler<Q, R>(
    State(service): State<Arc<SurveyService<Q, R>>>,
    Path(questionnaire_id): Path<String>,
) -> Response
where
    Q: QuestionnaireRepository + 'static,
    R: ResultRepository + 'static,
{
    match service.delete_questionnaire(&QuestionnaireId(questionnaire_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn export_questionnaire_handler<Q, R>(
    State(service): State<Arc<SurveyService<Q, R>>>,
    Path(questionnaire_id): Path<String>,
) -> Response
where
    Q: QuestionnaireRepository + 'static,
    R: ResultRepository + 'static,
{
    match service.export_questionnaire(&QuestionnaireId(questionnaire_id)) {
        Ok(export) => {
            let disposition =
                HeaderValue::from_str(&format!("attachment; filename=\"{}\"", export.file_name))
                    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, HeaderValue::from_static("application/json")),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                export.document,
            )
                .into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn import_questionnaire_handler<Q, R>(
    State(service): State<Arc<SurveyService<Q, R>>>,
    document: String,
) -> Response
where
    Q: QuestionnaireRepository + 'static,
    R: ResultRepository + 'static,
{
    match service.import_questionnaire(&document) {
        Ok(questionnaire) => (StatusCode::CREATED, axum::Json(questionnaire)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<Q, R>(
    State(service): State<Arc<SurveyService<Q, R>>>,
    Path(questionnaire_id): Path<String>,
    axum::Json(request): axum::Json<SubmissionRequest>,
) -> Response
where
    Q: QuestionnaireRepository + 'static,
    R: ResultRepository + 'static,
{
    let respondent = Respondent::new(request.user_id, request.user_name);
    match service.submit_answers(
        &QuestionnaireId(questionnaire_id),
        respondent,
        &request.answers,
    ) {
        Ok(result) => (StatusCode::CREATED, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn search_results_handler<Q, R>(
    State(service): State<Arc<SurveyService<Q, R>>>,
    Query(filter): Query<CandidateFilter>,
) -> Response
where
    Q: QuestionnaireRepository + 'static,
    R: ResultRepository + 'static,
{
    match service.search_results(&filter) {
        Ok(results) => (StatusCode::OK, axum::Json(results)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_result_handler<Q, R>(
    State(service): State<Arc<SurveyService<Q, R>>>,
    Path(result_id): Path<String>,
) -> Response
where
    Q: QuestionnaireRepository + 'static,
    R: ResultRepository + 'static,
{
    match service.get_result(&ResultId(result_id)) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_result_handler<Q, R>(
    State(service): State<Arc<SurveyService<Q, R>>>,
    Path(result_id): Path<String>,
) -> Response
where
    Q: QuestionnaireRepository + 'static,
    R: ResultRepository + 'static,
{
    match service.delete_result(&ResultId(result_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn certificate_handler<Q, R>(
    State(service): State<Arc<SurveyService<Q, R>>>,
    Path(result_id): Path<String>,
) -> Response
where
    Q: QuestionnaireRepository + 'static,
    R: ResultRepository + 'static,
{
    match service.result_view(&ResultId(result_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn trait_analysis_handler<Q, R>(
    State(service): State<Arc<SurveyService<Q, R>>>,
    Query(query): Query<TraitAnalysisQuery>,
) -> Response
where
    Q: QuestionnaireRepository + 'static,
    R: ResultRepository + 'static,
{
    let filter = ResultFilter::from_optional(query.questionnaire_id);
    match service.trait_analysis(&filter) {
        Ok(analysis) => (StatusCode::OK, axum::Json(analysis)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn compare_handler<Q, R>(
    State(service): State<Arc<SurveyService<Q, R>>>,
    axum::Json(request): axum::Json<ComparisonRequest>,
) -> Response
where
    Q: QuestionnaireRepository + 'static,
    R: ResultRepository + 'static,
{
    match service.compare(&request.result_ids) {
        Ok(comparison) => (StatusCode::OK, axum::Json(comparison)).into_response(),
        Err(error) => error_response(error),
    }
}

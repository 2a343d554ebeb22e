use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use trait_survey::assessment::{
    Answer, Questionnaire, QuestionnaireId, QuestionnaireRepository, Respondent,
    ResultRepository, SurveyAttempt, SurveyResult, SurveyServiceError, UserId,
};
use trait_survey::error::AppError;
use tracing::info;

const QUESTIONNAIRES: &str = include_str!("../seed/questionnaires.json");
const RESULTS: &str = include_str!("../seed/results.json");

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SampleResult {
    user_id: UserId,
    user_name: String,
    questionnaire_id: QuestionnaireId,
    days_ago: i64,
    answers: Vec<Answer>,
}

pub(crate) fn sample_questionnaires() -> Result<Vec<Questionnaire>, AppError> {
    let questionnaires: Vec<Questionnaire> = serde_json::from_str(QUESTIONNAIRES)
        .map_err(|err| AppError::Input(format!("sample questionnaires: {err}")))?;
    for questionnaire in &questionnaires {
        questionnaire
            .validate()
            .map_err(|err| AppError::Survey(SurveyServiceError::Validation(err)))?;
    }
    Ok(questionnaires)
}

/// Score the bundled sample answer sheets against `questionnaires`, completing the
/// most recent one at `now`.
pub(crate) fn sample_results(
    questionnaires: &[Questionnaire],
    now: DateTime<Utc>,
) -> Result<Vec<SurveyResult>, AppError> {
    let samples: Vec<SampleResult> = serde_json::from_str(RESULTS)
        .map_err(|err| AppError::Input(format!("sample results: {err}")))?;

    samples
        .into_iter()
        .map(|sample| -> Result<SurveyResult, AppError> {
            let questionnaire = questionnaires
                .iter()
                .find(|questionnaire| questionnaire.id == sample.questionnaire_id)
                .cloned()
                .ok_or_else(|| {
                    AppError::Survey(SurveyServiceError::QuestionnaireNotFound(
                        sample.questionnaire_id.clone(),
                    ))
                })?;
            let attempt = SurveyAttempt::from_answers(questionnaire, &sample.answers)
                .map_err(SurveyServiceError::from)?;
            let respondent = Respondent::new(sample.user_id, sample.user_name);
            let result = attempt
                .submit(respondent, now - Duration::days(sample.days_ago))
                .map_err(SurveyServiceError::from)?;
            Ok(result)
        })
        .collect()
}

/// Fill empty stores with the sample questionnaires and results.
///
/// Stores that already hold data are left alone, so restarting against a file data
/// source never duplicates the samples.
pub(crate) fn seed_if_empty<Q, R>(questionnaires: &Q, results: &R) -> Result<(), AppError>
where
    Q: QuestionnaireRepository,
    R: ResultRepository,
{
    if !questionnaires.list()?.is_empty() {
        return Ok(());
    }

    let samples = sample_questionnaires()?;
    for questionnaire in &samples {
        questionnaires.save(questionnaire.clone())?;
    }

    let mut seeded_results = 0;
    if results.list()?.is_empty() {
        for result in sample_results(&samples, Utc::now())? {
            results.insert(result)?;
            seeded_results += 1;
        }
    }

    info!(
        questionnaires = samples.len(),
        results = seeded_results,
        "seeded sample survey data"
    );
    Ok(())
}

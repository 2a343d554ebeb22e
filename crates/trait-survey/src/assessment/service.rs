use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use tracing::{info, warn};

use super::analytics::{
    compare_candidates, pool_trait_scores, CandidateComparison, CandidateFilter,
    ComparisonError, ResultFilter, TraitAnalysis,
};
use super::attempt::{Respondent, SubmissionError, SurveyAttempt};
use super::domain::{Answer, Question, Questionnaire, QuestionnaireId, ResultId, ValidationError};
use super::repository::{QuestionnaireRepository, RepositoryError, ResultRepository};
use super::result::{ResultView, SurveyResult};
use super::transfer::{
    export_file_name, export_questionnaire, import_questionnaire, ImportError,
    QuestionnaireExport,
};
use crate::config::SurveyConfig;

/// Admin-authored questionnaire content before it is assigned an id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuestionnaireDraft {
    pub title: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Service composing the repositories with the pure scoring core.
pub struct SurveyService<Q, R> {
    questionnaires: Arc<Q>,
    results: Arc<R>,
    config: SurveyConfig,
    rng: Mutex<StdRng>,
}

impl<Q, R> SurveyService<Q, R>
where
    Q: QuestionnaireRepository + 'static,
    R: ResultRepository + 'static,
{
    pub fn new(questionnaires: Arc<Q>, results: Arc<R>, config: SurveyConfig) -> Self {
        Self {
            questionnaires,
            results,
            config,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn list_questionnaires(&self) -> Result<Vec<Questionnaire>, SurveyServiceError> {
        Ok(self.questionnaires.list()?)
    }

    pub fn get_questionnaire(
        &self,
        id: &QuestionnaireId,
    ) -> Result<Questionnaire, SurveyServiceError> {
        self.questionnaires
            .fetch(id)?
            .ok_or_else(|| SurveyServiceError::QuestionnaireNotFound(id.clone()))
    }

    pub fn create_questionnaire(
        &self,
        draft: QuestionnaireDraft,
    ) -> Result<Questionnaire, SurveyServiceError> {
        let questionnaire = Questionnaire {
            id: QuestionnaireId::generate(),
            title: draft.title,
            questions: draft.questions,
        };
        questionnaire.validate()?;

        let stored = self.questionnaires.save(questionnaire)?;
        info!(questionnaire_id = %stored.id, title = %stored.title, "questionnaire created");
        Ok(stored)
    }

    /// Replace a questionnaire's content. Results already submitted keep their
    /// frozen scores.
    pub fn update_questionnaire(
        &self,
        id: &QuestionnaireId,
        draft: QuestionnaireDraft,
    ) -> Result<Questionnaire, SurveyServiceError> {
        let mut questionnaire = self.get_questionnaire(id)?;
        questionnaire.title = draft.title;
        questionnaire.questions = draft.questions;
        questionnaire.validate()?;

        let stored = self.questionnaires.save(questionnaire)?;
        info!(questionnaire_id = %stored.id, questions = stored.questions.len(), "questionnaire updated");
        Ok(stored)
    }

    pub fn delete_questionnaire(&self, id: &QuestionnaireId) -> Result<(), SurveyServiceError> {
        match self.questionnaires.delete(id) {
            Ok(()) => {
                info!(questionnaire_id = %id, "questionnaire deleted");
                Ok(())
            }
            Err(RepositoryError::NotFound) => {
                Err(SurveyServiceError::QuestionnaireNotFound(id.clone()))
            }
            Err(other) => Err(other.into()),
        }
    }

    pub fn export_questionnaire(
        &self,
        id: &QuestionnaireId,
    ) -> Result<QuestionnaireExport, SurveyServiceError> {
        let questionnaire = self.get_questionnaire(id)?;
        let document = export_questionnaire(&questionnaire).map_err(SurveyServiceError::Export)?;
        Ok(QuestionnaireExport {
            file_name: export_file_name(&questionnaire),
            document,
        })
    }

    /// Import an exported document under a fresh id. Nothing is stored on failure.
    pub fn import_questionnaire(&self, document: &str) -> Result<Questionnaire, SurveyServiceError> {
        let questionnaire = import_questionnaire(document)?;
        let stored = self.questionnaires.save(questionnaire)?;
        info!(questionnaire_id = %stored.id, title = %stored.title, "questionnaire imported");
        Ok(stored)
    }

    /// Begin a draft attempt against the current questionnaire snapshot.
    pub fn start_attempt(&self, id: &QuestionnaireId) -> Result<SurveyAttempt, SurveyServiceError> {
        let questionnaire = self.get_questionnaire(id)?;
        if !self.config.shuffle_questions {
            return Ok(SurveyAttempt::new(questionnaire));
        }

        let mut rng = self
            .rng
            .lock()
            .map_err(|_| RepositoryError::Unavailable("rng mutex poisoned".to_string()))?;
        Ok(SurveyAttempt::shuffled(questionnaire, &mut *rng))
    }

    /// Submit a finished attempt and persist the frozen result.
    pub fn submit_attempt(
        &self,
        attempt: SurveyAttempt,
        respondent: Respondent,
        completed_at: DateTime<Utc>,
    ) -> Result<SurveyResult, SurveyServiceError> {
        let result = attempt.submit(respondent, completed_at)?;
        let stored = self.results.insert(result)?;
        info!(
            result_id = %stored.id(),
            questionnaire_id = %stored.questionnaire_id(),
            total_score = stored.total_score(),
            max_score = stored.max_score(),
            "survey result submitted"
        );
        Ok(stored)
    }

    /// Submit a complete answer set in one step.
    pub fn submit_answers(
        &self,
        id: &QuestionnaireId,
        respondent: Respondent,
        answers: &[Answer],
    ) -> Result<SurveyResult, SurveyServiceError> {
        let questionnaire = self.get_questionnaire(id)?;
        let attempt = SurveyAttempt::from_answers(questionnaire, answers)?;
        self.submit_attempt(attempt, respondent, Utc::now())
    }

    pub fn list_results(&self) -> Result<Vec<SurveyResult>, SurveyServiceError> {
        Ok(self.results.list()?)
    }

    pub fn get_result(&self, id: &ResultId) -> Result<SurveyResult, SurveyServiceError> {
        self.results
            .fetch(id)?
            .ok_or_else(|| SurveyServiceError::ResultNotFound(id.clone()))
    }

    pub fn delete_result(&self, id: &ResultId) -> Result<(), SurveyServiceError> {
        match self.results.delete(id) {
            Ok(()) => {
                info!(result_id = %id, "survey result deleted");
                Ok(())
            }
            Err(RepositoryError::NotFound) => Err(SurveyServiceError::ResultNotFound(id.clone())),
            Err(other) => Err(other.into()),
        }
    }

    /// Certificate payload for one result.
    pub fn result_view(&self, id: &ResultId) -> Result<ResultView, SurveyServiceError> {
        let result = self.get_result(id)?;
        let questionnaire = self.questionnaires.fetch(result.questionnaire_id())?;
        if questionnaire.is_none() {
            warn!(
                result_id = %id,
                questionnaire_id = %result.questionnaire_id(),
                "questionnaire missing; trait breakdown unavailable"
            );
        }
        Ok(result.view(questionnaire.as_ref()))
    }

    /// Pooled trait percentages across every result the filter admits.
    pub fn trait_analysis(
        &self,
        filter: &ResultFilter,
    ) -> Result<TraitAnalysis, SurveyServiceError> {
        let results = self.results.list()?;
        let questionnaires = self.questionnaires.list()?;
        let analysis = pool_trait_scores(&results, &questionnaires, filter);
        if analysis.results_skipped > 0 {
            warn!(
                skipped = analysis.results_skipped,
                "results reference deleted questionnaires"
            );
        }
        Ok(analysis)
    }

    /// Side-by-side comparison of results taken against one questionnaire.
    pub fn compare(&self, ids: &[ResultId]) -> Result<CandidateComparison, SurveyServiceError> {
        let results = ids
            .iter()
            .map(|id| self.get_result(id))
            .collect::<Result<Vec<_>, _>>()?;

        let Some(first) = results.first() else {
            return Err(ComparisonError::NotEnoughResults { selected: 0 }.into());
        };
        let questionnaire = self.get_questionnaire(first.questionnaire_id())?;
        Ok(compare_candidates(&results, &questionnaire)?)
    }

    /// Candidate hub search, newest results first.
    pub fn search_results(
        &self,
        filter: &CandidateFilter,
    ) -> Result<Vec<SurveyResult>, SurveyServiceError> {
        let results = self.results.list()?;
        Ok(filter.apply(&results).into_iter().cloned().collect())
    }
}

/// Error raised by the survey service.
#[derive(Debug, thiserror::Error)]
pub enum SurveyServiceError {
    #[error("questionnaire '{0}' not found")]
    QuestionnaireNotFound(QuestionnaireId),
    #[error("result '{0}' not found")]
    ResultNotFound(ResultId),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Comparison(#[from] ComparisonError),
    #[error("failed to export questionnaire: {0}")]
    Export(#[source] serde_json::Error),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl SurveyServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SurveyServiceError::QuestionnaireNotFound(_)
            | SurveyServiceError::ResultNotFound(_)
            | SurveyServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            SurveyServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            SurveyServiceError::Validation(_)
            | SurveyServiceError::Submission(_)
            | SurveyServiceError::Import(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SurveyServiceError::Comparison(_) => StatusCode::BAD_REQUEST,
            SurveyServiceError::Export(_) | SurveyServiceError::Repository(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

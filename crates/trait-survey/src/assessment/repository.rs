use super::domain::{Questionnaire, QuestionnaireId, ResultId};
use super::result::SurveyResult;

/// Storage abstraction for authored questionnaires.
pub trait QuestionnaireRepository: Send + Sync {
    fn list(&self) -> Result<Vec<Questionnaire>, RepositoryError>;
    fn fetch(&self, id: &QuestionnaireId) -> Result<Option<Questionnaire>, RepositoryError>;
    /// Insert or replace by id.
    fn save(&self, questionnaire: Questionnaire) -> Result<Questionnaire, RepositoryError>;
    fn delete(&self, id: &QuestionnaireId) -> Result<(), RepositoryError>;
}

/// Storage abstraction for submitted results.
///
/// Results are never updated in place; they are inserted once and may be deleted.
pub trait ResultRepository: Send + Sync {
    fn list(&self) -> Result<Vec<SurveyResult>, RepositoryError>;
    fn fetch(&self, id: &ResultId) -> Result<Option<SurveyResult>, RepositoryError>;
    fn insert(&self, result: SurveyResult) -> Result<SurveyResult, RepositoryError>;
    fn delete(&self, id: &ResultId) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

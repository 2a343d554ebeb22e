//! Trait-scored questionnaires: authoring, answer capture, scoring, and the
//! analytics built on top of frozen survey results.
//!
//! Scoring ([`compute_score`]) and trait aggregation ([`aggregate_by_trait`]) are
//! pure functions over a questionnaire snapshot and an answer set. Everything that
//! touches storage lives behind the repository traits and the [`SurveyService`]
//! facade.

pub mod analytics;
pub mod attempt;
pub mod domain;
pub mod repository;
pub mod result;
pub mod router;
pub mod scoring;
pub mod service;
pub mod traits;
pub mod transfer;

#[cfg(test)]
mod tests;

pub use analytics::{
    compare_candidates, pool_trait_scores, CandidateComparison, CandidateFilter, CandidateSeries,
    ComparisonError, PooledTrait, ResultFilter, TraitAnalysis,
};
pub use attempt::{Respondent, SubmissionError, SurveyAttempt};
pub use domain::{
    likert_options, three_point_options, Answer, AnswerOption, Question, QuestionId,
    Questionnaire, QuestionnaireId, ResultId, UserId, ValidationError,
};
pub use repository::{QuestionnaireRepository, RepositoryError, ResultRepository};
pub use result::{ResultView, SurveyResult, TraitScoreView};
pub use router::{survey_router, ComparisonRequest, SubmissionRequest, TraitAnalysisQuery};
pub use scoring::{compute_score, percentage, ScoreSummary};
pub use service::{QuestionnaireDraft, SurveyService, SurveyServiceError};
pub use traits::{aggregate_by_trait, TraitAggregate, TraitBreakdown};
pub use transfer::{
    export_file_name, export_questionnaire, import_questionnaire, ImportError,
    QuestionnaireExport,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Answer, Questionnaire, QuestionnaireId, ResultId, UserId};
use super::scoring::{percentage, ScoreSummary};
use super::traits::{aggregate_by_trait, TraitBreakdown};

/// Frozen outcome of one completed questionnaire attempt.
///
/// Scores, the respondent's name, and the questionnaire title are snapshots taken at
/// submission. Later questionnaire edits never change them. There is no way to
/// mutate a result once built; it can only be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResult {
    id: ResultId,
    user_id: UserId,
    user_name: String,
    questionnaire_id: QuestionnaireId,
    questionnaire_title: String,
    answers: Vec<Answer>,
    total_score: i64,
    max_score: i64,
    completed_at: DateTime<Utc>,
}

impl SurveyResult {
    pub(crate) fn freeze(
        user_id: UserId,
        user_name: String,
        questionnaire: &Questionnaire,
        answers: Vec<Answer>,
        summary: ScoreSummary,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ResultId::generate(),
            user_id,
            user_name,
            questionnaire_id: questionnaire.id.clone(),
            questionnaire_title: questionnaire.title.clone(),
            answers,
            total_score: summary.total_score,
            max_score: summary.max_score,
            completed_at,
        }
    }

    pub fn id(&self) -> &ResultId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn questionnaire_id(&self) -> &QuestionnaireId {
        &self.questionnaire_id
    }

    pub fn questionnaire_title(&self) -> &str {
        &self.questionnaire_title
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn total_score(&self) -> i64 {
        self.total_score
    }

    pub fn max_score(&self) -> i64 {
        self.max_score
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Overall percentage from the frozen totals.
    pub fn percentage(&self) -> u32 {
        percentage(self.total_score, self.max_score)
    }

    /// Per-trait breakdown of this result's answers against `questionnaire`.
    pub fn trait_breakdown(&self, questionnaire: &Questionnaire) -> TraitBreakdown {
        aggregate_by_trait(questionnaire, &self.answers)
    }

    /// Certificate and candidate-card payload.
    ///
    /// `questionnaire` is the current version of the questionnaire this result was
    /// taken against, if it still exists. Without it the trait section cannot be
    /// displayed, but the frozen overall score still can.
    pub fn view(&self, questionnaire: Option<&Questionnaire>) -> ResultView {
        let traits = questionnaire.map(|questionnaire| {
            self.trait_breakdown(questionnaire)
                .iter()
                .map(TraitScoreView::from)
                .collect()
        });

        ResultView {
            result_id: self.id.clone(),
            user_name: self.user_name.clone(),
            questionnaire_id: self.questionnaire_id.clone(),
            questionnaire_title: self.questionnaire_title.clone(),
            total_score: self.total_score,
            max_score: self.max_score,
            percentage: self.percentage(),
            completed_at: self.completed_at,
            traits,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    pub result_id: ResultId,
    pub user_name: String,
    pub questionnaire_id: QuestionnaireId,
    pub questionnaire_title: String,
    pub total_score: i64,
    pub max_score: i64,
    pub percentage: u32,
    pub completed_at: DateTime<Utc>,
    pub traits: Option<Vec<TraitScoreView>>,
}

impl ResultView {
    pub fn can_display_traits(&self) -> bool {
        self.traits.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraitScoreView {
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub achieved: i64,
    pub possible: i64,
    pub percentage: u32,
}

impl From<&super::traits::TraitAggregate> for TraitScoreView {
    fn from(aggregate: &super::traits::TraitAggregate) -> Self {
        Self {
            trait_name: aggregate.trait_name.clone(),
            achieved: aggregate.achieved,
            possible: aggregate.possible,
            percentage: aggregate.percentage(),
        }
    }
}

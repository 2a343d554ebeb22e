use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::domain::{Answer, QuestionId, Questionnaire};

/// Achieved and attainable points for one questionnaire attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub total_score: i64,
    pub max_score: i64,
}

impl ScoreSummary {
    pub fn percentage(&self) -> u32 {
        percentage(self.total_score, self.max_score)
    }
}

/// Score an answer set against a questionnaire snapshot.
///
/// `max_score` always covers every question, answered or not. Unanswered questions
/// contribute zero to `total_score`. Answers naming a question the questionnaire does
/// not contain are ignored, and a repeated question id keeps its last score.
pub fn compute_score(questionnaire: &Questionnaire, answers: &[Answer]) -> ScoreSummary {
    let resolved = resolve_answers(questionnaire, answers);

    let mut total_score = 0i64;
    let mut max_score = 0i64;
    for question in &questionnaire.questions {
        max_score += i64::from(question.max_score());
        if let Some(score) = resolved.get(question.id()) {
            total_score += i64::from(*score);
        }
    }

    ScoreSummary {
        total_score,
        max_score,
    }
}

/// Whole-number percentage of `achieved` over `possible`, rounding halves up.
///
/// A non-positive `possible` yields 0. Negative `achieved` clamps to 0.
pub fn percentage(achieved: i64, possible: i64) -> u32 {
    if possible <= 0 || achieved <= 0 {
        return 0;
    }

    let achieved = i128::from(achieved);
    let possible = i128::from(possible);
    let rounded = (achieved * 200 + possible) / (possible * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Index answers by question id, last write wins, dropping ids the questionnaire lacks.
pub(crate) fn resolve_answers<'a>(
    questionnaire: &Questionnaire,
    answers: &'a [Answer],
) -> HashMap<&'a QuestionId, i32> {
    let mut resolved = HashMap::with_capacity(answers.len());
    for answer in answers {
        if questionnaire.question(&answer.question_id).is_some() {
            resolved.insert(&answer.question_id, answer.score);
        }
    }
    resolved
}

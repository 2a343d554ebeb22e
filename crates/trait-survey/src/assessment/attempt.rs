use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::domain::{Answer, Question, QuestionId, Questionnaire, UserId};
use super::result::SurveyResult;
use super::scoring::compute_score;

/// Who is taking the survey, captured by value at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Respondent {
    pub user_id: UserId,
    pub user_name: String,
}

impl Respondent {
    pub fn new(user_id: impl Into<UserId>, user_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
        }
    }
}

/// An in-progress answer sheet for one questionnaire.
///
/// The attempt owns a snapshot of the questionnaire so admin edits made while a
/// respondent is mid-survey cannot change what they are answering. Partial answer
/// sets are allowed until [`SurveyAttempt::submit`].
#[derive(Debug, Clone)]
pub struct SurveyAttempt {
    questionnaire: Questionnaire,
    order: Vec<usize>,
    selections: HashMap<QuestionId, i32>,
}

impl SurveyAttempt {
    pub fn new(questionnaire: Questionnaire) -> Self {
        let order = (0..questionnaire.questions.len()).collect();
        Self {
            questionnaire,
            order,
            selections: HashMap::new(),
        }
    }

    /// Start an attempt that presents questions in a random order.
    pub fn shuffled<R: Rng + ?Sized>(questionnaire: Questionnaire, rng: &mut R) -> Self {
        let mut attempt = Self::new(questionnaire);
        attempt.order.shuffle(rng);
        attempt
    }

    /// Rebuild an attempt from a submitted answer list, validating every entry.
    pub fn from_answers(
        questionnaire: Questionnaire,
        answers: &[Answer],
    ) -> Result<Self, SubmissionError> {
        let mut attempt = Self::new(questionnaire);
        for answer in answers {
            attempt.select(&answer.question_id, answer.score)?;
        }
        Ok(attempt)
    }

    pub fn questionnaire(&self) -> &Questionnaire {
        &self.questionnaire
    }

    /// Questions in presentation order.
    pub fn presented_questions(&self) -> impl Iterator<Item = &Question> {
        self.order
            .iter()
            .map(move |index| &self.questionnaire.questions[*index])
    }

    /// Record the score of the chosen option, replacing any earlier choice.
    pub fn select(&mut self, question_id: &QuestionId, score: i32) -> Result<(), SubmissionError> {
        let question = self.lookup(question_id)?;
        if !question.offers_score(score) {
            return Err(SubmissionError::ScoreNotOffered {
                question_id: question_id.0.clone(),
                score,
            });
        }
        self.selections.insert(question_id.clone(), score);
        Ok(())
    }

    /// Record a choice by the option's position within the question.
    pub fn select_option(
        &mut self,
        question_id: &QuestionId,
        index: usize,
    ) -> Result<(), SubmissionError> {
        let question = self.lookup(question_id)?;
        let score = question
            .options()
            .get(index)
            .map(|option| option.score)
            .ok_or_else(|| SubmissionError::OptionOutOfRange {
                question_id: question_id.0.clone(),
                index,
            })?;
        self.selections.insert(question_id.clone(), score);
        Ok(())
    }

    pub fn clear(&mut self, question_id: &QuestionId) {
        self.selections.remove(question_id);
    }

    pub fn selection(&self, question_id: &QuestionId) -> Option<i32> {
        self.selections.get(question_id).copied()
    }

    /// Questions still lacking an answer, in questionnaire order.
    pub fn unanswered(&self) -> Vec<&QuestionId> {
        self.questionnaire
            .questions
            .iter()
            .map(Question::id)
            .filter(|id| !self.selections.contains_key(*id))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.selections.len() == self.questionnaire.questions.len()
    }

    /// `(answered, total)` question counts.
    pub fn progress(&self) -> (usize, usize) {
        (self.selections.len(), self.questionnaire.questions.len())
    }

    /// Current selections as answers, in questionnaire order.
    pub fn answers(&self) -> Vec<Answer> {
        self.questionnaire
            .questions
            .iter()
            .filter_map(|question| {
                self.selections
                    .get(question.id())
                    .map(|score| Answer::new(question.id().clone(), *score))
            })
            .collect()
    }

    /// Score the attempt and freeze it into a [`SurveyResult`].
    pub fn submit(
        self,
        respondent: Respondent,
        completed_at: DateTime<Utc>,
    ) -> Result<SurveyResult, SubmissionError> {
        let missing: Vec<String> = self
            .unanswered()
            .into_iter()
            .map(|id| id.0.clone())
            .collect();
        if !missing.is_empty() {
            return Err(SubmissionError::Incomplete { missing });
        }

        let answers = self.answers();
        let summary = compute_score(&self.questionnaire, &answers);
        Ok(SurveyResult::freeze(
            respondent.user_id,
            respondent.user_name.trim().to_string(),
            &self.questionnaire,
            answers,
            summary,
            completed_at,
        ))
    }

    fn lookup(&self, question_id: &QuestionId) -> Result<&Question, SubmissionError> {
        self.questionnaire
            .question(question_id)
            .ok_or_else(|| SubmissionError::UnknownQuestion {
                question_id: question_id.0.clone(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("question '{question_id}' is not part of this questionnaire")]
    UnknownQuestion { question_id: String },
    #[error("question '{question_id}' has no option scored {score}")]
    ScoreNotOffered { question_id: String, score: i32 },
    #[error("question '{question_id}' has no option at position {index}")]
    OptionOutOfRange { question_id: String, index: usize },
    #[error("unanswered questions: {}", missing.join(", "))]
    Incomplete { missing: Vec<String> },
}

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Mint a fresh identifier that cannot collide with existing local data.
            pub fn generate() -> Self {
                Self(format!("{}-{}", $prefix, uuid::Uuid::new_v4()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identifier of a questionnaire, globally unique.
    QuestionnaireId,
    "q"
);
string_id!(
    /// Identifier of a question, unique within its questionnaire.
    QuestionId,
    "qt"
);
string_id!(
    /// Identifier of a submitted survey result.
    ResultId,
    "res"
);
string_id!(UserId, "user");

/// One selectable answer carrying an integer score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub text: String,
    pub score: i32,
}

impl AnswerOption {
    pub fn new(text: impl Into<String>, score: i32) -> Self {
        Self {
            text: text.into(),
            score,
        }
    }
}

/// Five point agreement scale scored 1 through 5.
pub fn likert_options() -> Vec<AnswerOption> {
    vec![
        AnswerOption::new("Strongly Disagree", 1),
        AnswerOption::new("Disagree", 2),
        AnswerOption::new("Neutral", 3),
        AnswerOption::new("Agree", 4),
        AnswerOption::new("Strongly Agree", 5),
    ]
}

/// Three point agreement scale scored 1 through 3.
pub fn three_point_options() -> Vec<AnswerOption> {
    vec![
        AnswerOption::new("Disagree", 1),
        AnswerOption::new("Neutral", 2),
        AnswerOption::new("Agree", 3),
    ]
}

/// A single trait-tagged question. The option list is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionDocument")]
pub struct Question {
    id: QuestionId,
    text: String,
    #[serde(rename = "trait")]
    trait_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    behavior: Option<String>,
    options: Vec<AnswerOption>,
}

/// Unvalidated wire shape; every [`Question`] is deserialized through it.
#[derive(Deserialize)]
struct QuestionDocument {
    id: QuestionId,
    text: String,
    #[serde(rename = "trait")]
    trait_name: String,
    #[serde(default)]
    behavior: Option<String>,
    options: Vec<AnswerOption>,
}

impl TryFrom<QuestionDocument> for Question {
    type Error = ValidationError;

    fn try_from(document: QuestionDocument) -> Result<Self, Self::Error> {
        let question = Question::new(
            document.id,
            document.text,
            document.trait_name,
            document.options,
        )?;
        Ok(match document.behavior {
            Some(behavior) => question.with_behavior(behavior),
            None => question,
        })
    }
}

impl Question {
    pub fn new(
        id: impl Into<QuestionId>,
        text: impl Into<String>,
        trait_name: impl Into<String>,
        options: Vec<AnswerOption>,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        if options.is_empty() {
            return Err(ValidationError::EmptyOptions {
                question_id: id.0,
            });
        }

        Ok(Self {
            id,
            text: text.into(),
            trait_name: trait_name.into(),
            behavior: None,
            options,
        })
    }

    pub fn with_behavior(mut self, behavior: impl Into<String>) -> Self {
        self.behavior = Some(behavior.into());
        self
    }

    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn trait_name(&self) -> &str {
        &self.trait_name
    }

    pub fn behavior(&self) -> Option<&str> {
        self.behavior.as_deref()
    }

    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    /// Replace the option list, keeping the non-empty invariant.
    pub fn set_options(&mut self, options: Vec<AnswerOption>) -> Result<(), ValidationError> {
        if options.is_empty() {
            return Err(ValidationError::EmptyOptions {
                question_id: self.id.0.clone(),
            });
        }
        self.options = options;
        Ok(())
    }

    /// Highest score any option of this question awards.
    pub fn max_score(&self) -> i32 {
        self.options
            .iter()
            .map(|option| option.score)
            .max()
            .unwrap_or(0)
    }

    pub fn offers_score(&self, score: i32) -> bool {
        self.options.iter().any(|option| option.score == score)
    }
}

/// An authored questionnaire. Owns its questions by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Questionnaire {
    pub id: QuestionnaireId,
    pub title: String,
    pub questions: Vec<Question>,
}

impl Questionnaire {
    pub fn new(id: impl Into<QuestionnaireId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            questions: Vec::new(),
        }
    }

    pub fn with_question(mut self, question: Question) -> Self {
        self.questions.push(question);
        self
    }

    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| &question.id == id)
    }

    /// Distinct traits in the order they first appear.
    pub fn traits(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.questions
            .iter()
            .map(Question::trait_name)
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Sum of every question's highest option score.
    pub fn max_score(&self) -> i64 {
        self.questions
            .iter()
            .map(|question| i64::from(question.max_score()))
            .sum()
    }

    /// Checks applied whenever an admin saves a questionnaire.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::BlankTitle);
        }

        let mut seen = HashSet::new();
        for question in &self.questions {
            if !seen.insert(&question.id) {
                return Err(ValidationError::DuplicateQuestion {
                    question_id: question.id.0.clone(),
                });
            }
            if question.options.is_empty() {
                return Err(ValidationError::EmptyOptions {
                    question_id: question.id.0.clone(),
                });
            }
        }

        Ok(())
    }
}

/// The score of the option a respondent picked for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: QuestionId,
    pub score: i32,
}

impl Answer {
    pub fn new(question_id: impl Into<QuestionId>, score: i32) -> Self {
        Self {
            question_id: question_id.into(),
            score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("question '{question_id}' must offer at least one option")]
    EmptyOptions { question_id: String },
    #[error("questionnaire title must not be blank")]
    BlankTitle,
    #[error("question id '{question_id}' appears more than once")]
    DuplicateQuestion { question_id: String },
}

use serde_json::Value;

use super::domain::{Question, Questionnaire, QuestionnaireId, ValidationError};

/// A downloadable questionnaire document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionnaireExport {
    pub file_name: String,
    pub document: String,
}

/// Render a questionnaire as the pretty-printed JSON document admins download.
pub fn export_questionnaire(questionnaire: &Questionnaire) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(questionnaire)
}

/// Suggested download name, with whitespace in the title replaced by underscores.
pub fn export_file_name(questionnaire: &Questionnaire) -> String {
    let stem: String = questionnaire
        .title
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("{stem}.json")
}

/// Parse an exported questionnaire document.
///
/// The document must carry a non-blank `title` string and an array `questions`
/// field. Every question is validated, and the imported questionnaire always gets a
/// freshly generated id so it cannot collide with data already stored locally.
pub fn import_questionnaire(document: &str) -> Result<Questionnaire, ImportError> {
    let value: Value = serde_json::from_str(document).map_err(ImportError::InvalidJson)?;
    let Value::Object(mut fields) = value else {
        return Err(ImportError::NotAnObject);
    };

    let title = match fields.remove("title") {
        Some(Value::String(title)) if !title.trim().is_empty() => title,
        _ => return Err(ImportError::MissingTitle),
    };

    let Some(Value::Array(entries)) = fields.remove("questions") else {
        return Err(ImportError::MissingQuestions);
    };

    let questions = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value::<Question>(entry)
                .map_err(|source| ImportError::InvalidQuestion { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let questionnaire = Questionnaire {
        id: QuestionnaireId::generate(),
        title,
        questions,
    };
    questionnaire.validate()?;
    Ok(questionnaire)
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("document is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("document must be a JSON object")]
    NotAnObject,
    #[error("document is missing a non-empty 'title' string")]
    MissingTitle,
    #[error("document is missing a 'questions' array")]
    MissingQuestions,
    #[error("question #{} is invalid: {source}", index + 1)]
    InvalidQuestion {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::domain::{likert_options, three_point_options};
    use serde_json::json;

    fn questionnaire() -> Questionnaire {
        Questionnaire::new("q1", "Graduate Role Readiness")
            .with_question(
                Question::new("q1-1", "I lead", "Leadership", likert_options())
                    .unwrap()
                    .with_behavior("Initiative"),
            )
            .with_question(
                Question::new("q1-2", "I share", "Teamwork", three_point_options()).unwrap(),
            )
    }

    #[test]
    fn round_trip_preserves_content_but_not_id() {
        let original = questionnaire();
        let document = export_questionnaire(&original).expect("exports");
        let imported = import_questionnaire(&document).expect("imports");

        assert_ne!(imported.id, original.id);
        assert_eq!(imported.title, original.title);
        assert_eq!(imported.questions, original.questions);
    }

    #[test]
    fn rejects_missing_or_blank_title() {
        let missing = json!({ "questions": [] }).to_string();
        assert!(matches!(
            import_questionnaire(&missing),
            Err(ImportError::MissingTitle)
        ));

        let blank = json!({ "title": "", "questions": [] }).to_string();
        assert!(matches!(
            import_questionnaire(&blank),
            Err(ImportError::MissingTitle)
        ));

        let wrong_type = json!({ "title": 12, "questions": [] }).to_string();
        assert!(matches!(
            import_questionnaire(&wrong_type),
            Err(ImportError::MissingTitle)
        ));
    }

    #[test]
    fn rejects_non_array_questions() {
        let document = json!({ "title": "Readiness", "questions": { "a": 1 } }).to_string();
        assert!(matches!(
            import_questionnaire(&document),
            Err(ImportError::MissingQuestions)
        ));
    }

    #[test]
    fn rejects_questions_without_options() {
        let document = json!({
            "title": "Readiness",
            "questions": [
                { "id": "a", "text": "t", "trait": "Grit", "options": [{ "text": "x", "score": 1 }] },
                { "id": "b", "text": "t", "trait": "Grit", "options": [] }
            ]
        })
        .to_string();

        match import_questionnaire(&document) {
            Err(ImportError::InvalidQuestion { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected invalid question, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_json_and_non_objects() {
        assert!(matches!(
            import_questionnaire("{ not json"),
            Err(ImportError::InvalidJson(_))
        ));
        assert!(matches!(
            import_questionnaire("[1, 2]"),
            Err(ImportError::NotAnObject)
        ));
    }

    #[test]
    fn imported_empty_questionnaire_is_allowed() {
        let document = json!({ "id": "q1", "title": "Draft", "questions": [] }).to_string();
        let imported = import_questionnaire(&document).expect("imports");
        assert_ne!(imported.id.as_str(), "q1");
        assert!(imported.questions.is_empty());
    }

    #[test]
    fn export_file_name_replaces_whitespace() {
        assert_eq!(
            export_file_name(&questionnaire()),
            "Graduate_Role_Readiness.json"
        );
    }
}

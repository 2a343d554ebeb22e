use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::assessment::domain::{
    likert_options, three_point_options, AnswerOption, Question, QuestionId, Questionnaire,
    QuestionnaireId, ResultId,
};
use crate::assessment::repository::{QuestionnaireRepository, RepositoryError, ResultRepository};
use crate::assessment::result::SurveyResult;
use crate::assessment::{survey_router, Respondent, SurveyService};
use crate::config::SurveyConfig;

pub(super) fn readiness() -> Questionnaire {
    Questionnaire::new("q1", "Graduate Role Readiness")
        .with_question(
            Question::new(
                "q1-1",
                "I take the lead when a group stalls.",
                "Leadership",
                likert_options(),
            )
            .expect("valid question")
            .with_behavior("Initiative"),
        )
        .with_question(
            Question::new(
                "q1-2",
                "I share credit with my teammates.",
                "Teamwork",
                likert_options(),
            )
            .expect("valid question")
            .with_behavior("Collaboration"),
        )
        .with_question(
            Question::new(
                "q1-3",
                "I break large problems into smaller ones.",
                "Problem Solving",
                likert_options(),
            )
            .expect("valid question")
            .with_behavior("Analytical Thinking"),
        )
}

/// Two honesty questions on a 3 point scale and one reliability question with a
/// wider, non-contiguous scale.
pub(super) fn workplace() -> Questionnaire {
    Questionnaire::new("q2", "Professional Workplace Assessment")
        .with_question(
            Question::new("q2-1", "I report my own mistakes.", "Honesty", three_point_options())
                .expect("valid question"),
        )
        .with_question(
            Question::new(
                "q2-2",
                "I correct records that favour me.",
                "Honesty",
                three_point_options(),
            )
            .expect("valid question"),
        )
        .with_question(
            Question::new(
                "q2-3",
                "I meet the deadlines I commit to.",
                "Reliability",
                vec![
                    AnswerOption::new("Rarely", 0),
                    AnswerOption::new("Usually", 5),
                    AnswerOption::new("Always", 10),
                ],
            )
            .expect("valid question"),
        )
}

pub(super) fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) type MemoryService = SurveyService<MemoryQuestionnaires, MemoryResults>;

pub(super) fn build_service() -> (MemoryService, Arc<MemoryQuestionnaires>, Arc<MemoryResults>) {
    let questionnaires = Arc::new(MemoryQuestionnaires::with(vec![readiness(), workplace()]));
    let results = Arc::new(MemoryResults::default());
    let service = SurveyService::new(
        questionnaires.clone(),
        results.clone(),
        SurveyConfig::default(),
    );
    (service, questionnaires, results)
}

/// Take `questionnaire_id` as `user_name`, answering with `(question id, score)` pairs.
pub(super) fn take(
    service: &MemoryService,
    questionnaire_id: &str,
    user_name: &str,
    scores: &[(&str, i32)],
    completed_at: DateTime<Utc>,
) -> SurveyResult {
    let mut attempt = service
        .start_attempt(&QuestionnaireId::from(questionnaire_id))
        .expect("attempt starts");
    for (question_id, score) in scores {
        attempt
            .select(&QuestionId::from(*question_id), *score)
            .expect("score offered");
    }
    let respondent = Respondent::new(
        format!("user-{}", user_name.to_lowercase().replace(' ', "-")),
        user_name,
    );
    service
        .submit_attempt(attempt, respondent, completed_at)
        .expect("submission succeeds")
}

#[derive(Default, Clone)]
pub(super) struct MemoryQuestionnaires {
    records: Arc<Mutex<Vec<Questionnaire>>>,
}

impl MemoryQuestionnaires {
    pub(super) fn with(questionnaires: Vec<Questionnaire>) -> Self {
        Self {
            records: Arc::new(Mutex::new(questionnaires)),
        }
    }

    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl QuestionnaireRepository for MemoryQuestionnaires {
    fn list(&self) -> Result<Vec<Questionnaire>, RepositoryError> {
        Ok(self.records.lock().expect("repository mutex poisoned").clone())
    }

    fn fetch(&self, id: &QuestionnaireId) -> Result<Option<Questionnaire>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn save(&self, questionnaire: Questionnaire) -> Result<Questionnaire, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.iter_mut().find(|record| record.id == questionnaire.id) {
            Some(existing) => *existing = questionnaire.clone(),
            None => guard.push(questionnaire.clone()),
        }
        Ok(questionnaire)
    }

    fn delete(&self, id: &QuestionnaireId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let before = guard.len();
        guard.retain(|record| &record.id != id);
        if guard.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryResults {
    records: Arc<Mutex<Vec<SurveyResult>>>,
}

impl MemoryResults {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl ResultRepository for MemoryResults {
    fn list(&self) -> Result<Vec<SurveyResult>, RepositoryError> {
        Ok(self.records.lock().expect("repository mutex poisoned").clone())
    }

    fn fetch(&self, id: &ResultId) -> Result<Option<SurveyResult>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| record.id() == id).cloned())
    }

    fn insert(&self, result: SurveyResult) -> Result<SurveyResult, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|record| record.id() == result.id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(result.clone());
        Ok(result)
    }

    fn delete(&self, id: &ResultId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let before = guard.len();
        guard.retain(|record| record.id() != id);
        if guard.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

pub(super) struct UnavailableRepository;

impl QuestionnaireRepository for UnavailableRepository {
    fn list(&self) -> Result<Vec<Questionnaire>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn fetch(&self, _id: &QuestionnaireId) -> Result<Option<Questionnaire>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn save(&self, _questionnaire: Questionnaire) -> Result<Questionnaire, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn delete(&self, _id: &QuestionnaireId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }
}

impl ResultRepository for UnavailableRepository {
    fn list(&self) -> Result<Vec<SurveyResult>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn fetch(&self, _id: &ResultId) -> Result<Option<SurveyResult>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn insert(&self, _result: SurveyResult) -> Result<SurveyResult, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn delete(&self, _id: &ResultId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    survey_router(Arc::new(service))
}

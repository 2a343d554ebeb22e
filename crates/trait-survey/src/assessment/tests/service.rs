use super::common::*;
use std::sync::Arc;

use axum::http::StatusCode;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::assessment::attempt::{SubmissionError, SurveyAttempt};
use crate::assessment::domain::{
    likert_options, Answer, Question, QuestionId, QuestionnaireId, ResultId, ValidationError,
};
use crate::assessment::repository::{RepositoryError, ResultRepository};
use crate::assessment::transfer::ImportError;
use crate::assessment::{QuestionnaireDraft, Respondent, SurveyService, SurveyServiceError};
use crate::config::SurveyConfig;

#[test]
fn create_assigns_fresh_id_and_validates() {
    let (service, questionnaires, _) = build_service();

    let created = service
        .create_questionnaire(QuestionnaireDraft {
            title: "Customer Focus".to_string(),
            questions: vec![
                Question::new("cf-1", "I follow up", "Service", likert_options()).unwrap(),
            ],
        })
        .expect("create succeeds");
    assert!(created.id.as_str().starts_with("q-"));
    assert_eq!(questionnaires.len(), 3);

    let blank = service.create_questionnaire(QuestionnaireDraft {
        title: "   ".to_string(),
        questions: Vec::new(),
    });
    assert!(matches!(
        blank,
        Err(SurveyServiceError::Validation(ValidationError::BlankTitle))
    ));

    let duplicated = service.create_questionnaire(QuestionnaireDraft {
        title: "Twice".to_string(),
        questions: vec![
            Question::new("d-1", "a", "Grit", likert_options()).unwrap(),
            Question::new("d-1", "b", "Grit", likert_options()).unwrap(),
        ],
    });
    assert!(matches!(
        duplicated,
        Err(SurveyServiceError::Validation(
            ValidationError::DuplicateQuestion { .. }
        ))
    ));
    assert_eq!(questionnaires.len(), 3);
}

#[test]
fn results_keep_frozen_scores_after_questionnaire_edits() {
    let (service, _, _) = build_service();
    let result = take(
        &service,
        "q1",
        "Alice Moreno",
        &[("q1-1", 5), ("q1-2", 4), ("q1-3", 3)],
        at(1, 9),
    );

    let mut questions = readiness().questions;
    questions.push(Question::new("q1-4", "I adapt", "Adaptability", likert_options()).unwrap());
    service
        .update_questionnaire(
            &QuestionnaireId::from("q1"),
            QuestionnaireDraft {
                title: "Graduate Role Readiness v2".to_string(),
                questions,
            },
        )
        .expect("update succeeds");

    let stored = service.get_result(result.id()).expect("result present");
    assert_eq!(stored.total_score(), 12);
    assert_eq!(stored.max_score(), 15);
    assert_eq!(stored.questionnaire_title(), "Graduate Role Readiness");

    let view = service.result_view(result.id()).expect("view builds");
    assert_eq!(view.percentage, 80);
    let traits = view.traits.expect("questionnaire still exists");
    let adaptability = traits
        .iter()
        .find(|entry| entry.trait_name == "Adaptability")
        .expect("new trait shown");
    assert_eq!((adaptability.achieved, adaptability.possible), (0, 5));
}

#[test]
fn update_of_unknown_questionnaire_is_not_found() {
    let (service, _, _) = build_service();
    let outcome = service.update_questionnaire(
        &QuestionnaireId::from("missing"),
        QuestionnaireDraft {
            title: "Anything".to_string(),
            questions: Vec::new(),
        },
    );
    match outcome {
        Err(error @ SurveyServiceError::QuestionnaireNotFound(_)) => {
            assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn submit_answers_requires_every_question() {
    let (service, _, results) = build_service();

    let outcome = service.submit_answers(
        &QuestionnaireId::from("q1"),
        Respondent::new("user-1", "Alice"),
        &[Answer::new("q1-1", 4), Answer::new("q1-3", 2)],
    );

    match outcome {
        Err(SurveyServiceError::Submission(SubmissionError::Incomplete { missing })) => {
            assert_eq!(missing, vec!["q1-2".to_string()]);
        }
        other => panic!("expected incomplete submission, got {other:?}"),
    }
    assert_eq!(results.len(), 0);
}

#[test]
fn submit_answers_rejects_scores_and_questions_outside_the_questionnaire() {
    let (service, _, results) = build_service();

    let unoffered = service.submit_answers(
        &QuestionnaireId::from("q2"),
        Respondent::new("user-1", "Alice"),
        &[
            Answer::new("q2-1", 3),
            Answer::new("q2-2", 3),
            Answer::new("q2-3", 7),
        ],
    );
    assert!(matches!(
        unoffered,
        Err(SurveyServiceError::Submission(
            SubmissionError::ScoreNotOffered { score: 7, .. }
        ))
    ));

    let stray = service.submit_answers(
        &QuestionnaireId::from("q1"),
        Respondent::new("user-1", "Alice"),
        &[Answer::new("q2-1", 3)],
    );
    match stray {
        Err(error @ SurveyServiceError::Submission(SubmissionError::UnknownQuestion { .. })) => {
            assert_eq!(error.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        }
        other => panic!("expected unknown question, got {other:?}"),
    }
    assert_eq!(results.len(), 0);
}

#[test]
fn submit_answers_freezes_scores_and_trims_name() {
    let (service, _, results) = build_service();

    let stored = service
        .submit_answers(
            &QuestionnaireId::from("q2"),
            Respondent::new("user-7", "  Priya Natarajan "),
            &[
                Answer::new("q2-3", 5),
                Answer::new("q2-1", 3),
                Answer::new("q2-2", 1),
                Answer::new("q2-1", 2),
            ],
        )
        .expect("submission succeeds");

    assert_eq!(stored.user_name(), "Priya Natarajan");
    assert_eq!(stored.total_score(), 8);
    assert_eq!(stored.max_score(), 16);
    assert_eq!(stored.percentage(), 50);
    assert_eq!(
        stored.answers(),
        &[
            Answer::new("q2-1", 2),
            Answer::new("q2-2", 1),
            Answer::new("q2-3", 5),
        ]
    );
    assert_eq!(results.len(), 1);
}

#[test]
fn shuffled_attempts_present_every_question_once_and_score_the_same() {
    let (questionnaires, results) = {
        let (_, questionnaires, results) = build_service();
        (questionnaires, results)
    };
    let service = SurveyService::new(
        questionnaires,
        results,
        SurveyConfig {
            shuffle_questions: true,
        },
    );

    let attempt = service
        .start_attempt(&QuestionnaireId::from("q1"))
        .expect("attempt starts");
    let mut presented: Vec<&str> = attempt
        .presented_questions()
        .map(|question| question.id().as_str())
        .collect();
    presented.sort_unstable();
    assert_eq!(presented, vec!["q1-1", "q1-2", "q1-3"]);

    let mut rng = StdRng::seed_from_u64(11);
    let mut shuffled = SurveyAttempt::shuffled(readiness(), &mut rng);
    let mut ordered = SurveyAttempt::new(readiness());
    for (id, score) in [("q1-1", 5), ("q1-2", 1), ("q1-3", 4)] {
        shuffled.select(&QuestionId::from(id), score).unwrap();
        ordered.select(&QuestionId::from(id), score).unwrap();
    }
    let first = shuffled
        .submit(Respondent::new("user-1", "A"), at(5, 9))
        .expect("complete");
    let second = ordered
        .submit(Respondent::new("user-1", "A"), at(5, 9))
        .expect("complete");
    assert_eq!(first.total_score(), second.total_score());
    assert_eq!(first.answers(), second.answers());
}

#[test]
fn result_view_degrades_when_questionnaire_is_deleted() {
    let (service, _, _) = build_service();
    let result = take(
        &service,
        "q2",
        "Carol",
        &[("q2-1", 3), ("q2-2", 3), ("q2-3", 10)],
        at(3, 9),
    );

    service
        .delete_questionnaire(&QuestionnaireId::from("q2"))
        .expect("delete succeeds");

    let view = service.result_view(result.id()).expect("view builds");
    assert!(!view.can_display_traits());
    assert_eq!(view.percentage, 100);
    assert_eq!(view.questionnaire_title, "Professional Workplace Assessment");
}

#[test]
fn deleted_results_are_gone() {
    let (service, _, results) = build_service();
    let result = take(
        &service,
        "q1",
        "Alice",
        &[("q1-1", 1), ("q1-2", 1), ("q1-3", 1)],
        at(1, 9),
    );

    service.delete_result(result.id()).expect("delete succeeds");
    assert_eq!(results.len(), 0);
    assert!(matches!(
        service.get_result(result.id()),
        Err(SurveyServiceError::ResultNotFound(_))
    ));
    assert!(matches!(
        service.delete_result(result.id()),
        Err(SurveyServiceError::ResultNotFound(_))
    ));
    assert!(matches!(
        service.delete_questionnaire(&QuestionnaireId::from("nope")),
        Err(SurveyServiceError::QuestionnaireNotFound(_))
    ));
}

#[test]
fn export_then_import_creates_a_new_questionnaire() {
    let (service, questionnaires, _) = build_service();

    let export = service
        .export_questionnaire(&QuestionnaireId::from("q1"))
        .expect("export succeeds");
    assert_eq!(export.file_name, "Graduate_Role_Readiness.json");

    let imported = service
        .import_questionnaire(&export.document)
        .expect("import succeeds");
    assert_ne!(imported.id.as_str(), "q1");
    assert_eq!(imported.questions, readiness().questions);
    assert_eq!(questionnaires.len(), 3);

    let rejected = service.import_questionnaire(r#"{ "title": "Broken" }"#);
    match rejected {
        Err(error @ SurveyServiceError::Import(ImportError::MissingQuestions)) => {
            assert_eq!(error.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        }
        other => panic!("expected import failure, got {other:?}"),
    }
    assert_eq!(questionnaires.len(), 3);
}

#[test]
fn repository_outages_surface_as_internal_errors() {
    let service = SurveyService::new(
        Arc::new(UnavailableRepository),
        Arc::new(UnavailableRepository),
        SurveyConfig::default(),
    );

    match service.list_questionnaires() {
        Err(error @ SurveyServiceError::Repository(RepositoryError::Unavailable(_))) => {
            assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
        other => panic!("expected repository failure, got {other:?}"),
    }

    assert!(matches!(
        service.get_result(&ResultId::from("res-1")),
        Err(SurveyServiceError::Repository(_))
    ));
}

#[test]
fn memory_results_reject_duplicate_ids() {
    let (service, _, results) = build_service();
    let result = take(
        &service,
        "q1",
        "Alice",
        &[("q1-1", 1), ("q1-2", 1), ("q1-3", 1)],
        at(1, 9),
    );

    match results.insert(result) {
        Err(RepositoryError::Conflict) => {}
        other => panic!("expected conflict, got {other:?}"),
    }
    let conflict = SurveyServiceError::Repository(RepositoryError::Conflict);
    assert_eq!(conflict.status_code(), StatusCode::CONFLICT);
}

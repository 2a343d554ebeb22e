use crate::infra::{parse_json_file, AppSurveyService, QuestionnaireStore, ResultStore};
use crate::seed::seed_if_empty;
use chrono::Utc;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use trait_survey::assessment::{
    aggregate_by_trait, compute_score, Answer, Question, Questionnaire, QuestionnaireId,
    Respondent, ResultFilter, ResultView, SurveyService, SurveyServiceError, TraitScoreView,
};
use trait_survey::config::SurveyConfig;
use trait_survey::error::AppError;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Questionnaire document, in the export format
    #[arg(long)]
    pub(crate) questionnaire: PathBuf,
    /// JSON array of `{ "questionId", "score" }` answers
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Print the report as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Present the demo attempt's questions in a random order
    #[arg(long)]
    pub(crate) shuffle: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScoreReport {
    pub(crate) questionnaire_title: String,
    pub(crate) total_score: i64,
    pub(crate) max_score: i64,
    pub(crate) percentage: u32,
    pub(crate) unanswered: Vec<String>,
    pub(crate) traits: Vec<TraitScoreView>,
}

/// Score an answer set without persisting anything. Unanswered questions count as 0.
pub(crate) fn score_report(questionnaire: &Questionnaire, answers: &[Answer]) -> ScoreReport {
    let summary = compute_score(questionnaire, answers);
    let unanswered = questionnaire
        .questions
        .iter()
        .map(Question::id)
        .filter(|id| !answers.iter().any(|answer| &answer.question_id == *id))
        .map(|id| id.to_string())
        .collect();

    ScoreReport {
        questionnaire_title: questionnaire.title.clone(),
        total_score: summary.total_score,
        max_score: summary.max_score,
        percentage: summary.percentage(),
        unanswered,
        traits: aggregate_by_trait(questionnaire, answers)
            .iter()
            .map(TraitScoreView::from)
            .collect(),
    }
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let questionnaire: Questionnaire =
        parse_json_file(&args.questionnaire).map_err(AppError::Input)?;
    questionnaire
        .validate()
        .map_err(|err| AppError::Survey(SurveyServiceError::Validation(err)))?;
    let answers: Vec<Answer> = parse_json_file(&args.answers).map_err(AppError::Input)?;

    let report = score_report(&questionnaire, &answers);
    if args.json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|err| AppError::Survey(SurveyServiceError::Export(err)))?;
        println!("{rendered}");
        return Ok(());
    }

    println!("{}", report.questionnaire_title);
    println!(
        "Score: {}/{} ({}%)",
        report.total_score, report.max_score, report.percentage
    );
    if !report.unanswered.is_empty() {
        println!("Unanswered (scored as 0): {}", report.unanswered.join(", "));
    }
    println!("\nTrait breakdown");
    for entry in &report.traits {
        println!(
            "- {}: {}/{} ({}%)",
            entry.trait_name, entry.achieved, entry.possible, entry.percentage
        );
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let questionnaires = Arc::new(QuestionnaireStore::in_memory());
    let results = Arc::new(ResultStore::in_memory());
    seed_if_empty(questionnaires.as_ref(), results.as_ref())?;
    let service: AppSurveyService = SurveyService::new(
        questionnaires,
        results,
        SurveyConfig {
            shuffle_questions: args.shuffle,
        },
    );

    println!("Trait survey demo");
    println!("\nQuestionnaires");
    for questionnaire in service.list_questionnaires()? {
        println!(
            "- {} [{}]: {} questions, traits {}",
            questionnaire.title,
            questionnaire.id,
            questionnaire.questions.len(),
            questionnaire.traits().join(", ")
        );
    }

    let readiness = QuestionnaireId::from("q1");
    let mut attempt = service.start_attempt(&readiness)?;
    let presented: Vec<_> = attempt
        .presented_questions()
        .map(|question| question.id().clone())
        .collect();
    println!("\nDemo attempt on {readiness}");
    for (position, question_id) in presented.iter().enumerate() {
        attempt
            .select_option(question_id, position % 5)
            .map_err(SurveyServiceError::from)?;
        let (answered, total) = attempt.progress();
        println!("  answered {question_id} ({answered}/{total})");
    }
    let submitted = service.submit_attempt(
        attempt,
        Respondent::new("user-demo", "Jordan Lee"),
        Utc::now(),
    )?;
    render_certificate(&service.result_view(submitted.id())?);

    println!("\nRecent results");
    for result in service.search_results(&Default::default())? {
        println!(
            "- {} | {} | {}/{} ({}%)",
            result.user_name(),
            result.questionnaire_title(),
            result.total_score(),
            result.max_score(),
            result.percentage()
        );
    }

    let analysis = service.trait_analysis(&ResultFilter::All)?;
    println!(
        "\nPooled trait analysis ({} results)",
        analysis.results_considered
    );
    for entry in &analysis.traits {
        println!(
            "- {}: {}/{} ({}%)",
            entry.trait_name, entry.achieved, entry.possible, entry.percentage
        );
    }

    let same_questionnaire: Vec<_> = service
        .list_results()?
        .into_iter()
        .filter(|result| result.questionnaire_id() == &readiness)
        .map(|result| result.id().clone())
        .collect();
    let comparison = service.compare(&same_questionnaire)?;
    println!("\nComparison: {}", comparison.questionnaire_title);
    println!("  axes: {}", comparison.axes.join(" | "));
    for candidate in &comparison.candidates {
        let scores: Vec<String> = candidate
            .trait_percentages
            .iter()
            .map(|value| format!("{value}%"))
            .collect();
        println!(
            "  {} ({}%): {}",
            candidate.user_name,
            candidate.overall_percentage,
            scores.join(" | ")
        );
    }

    Ok(())
}

fn render_certificate(view: &ResultView) {
    println!("\nCertificate for {}", view.user_name);
    println!(
        "  {}: {}/{} ({}%) on {}",
        view.questionnaire_title,
        view.total_score,
        view.max_score,
        view.percentage,
        view.completed_at.format("%Y-%m-%d")
    );
    match &view.traits {
        Some(traits) => {
            for entry in traits {
                println!("  - {}: {}%", entry.trait_name, entry.percentage);
            }
        }
        None => println!("  Trait breakdown unavailable: questionnaire was deleted"),
    }
}

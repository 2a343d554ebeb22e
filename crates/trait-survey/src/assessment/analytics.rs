//! Recruiter-facing compositions of the trait aggregator: pooled trait analysis
//! across many results, side-by-side candidate comparison, and candidate search.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{Questionnaire, QuestionnaireId, ResultId};
use super::result::SurveyResult;
use super::scoring::percentage;
use super::traits::TraitBreakdown;

/// Which results feed a pooled trait analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResultFilter {
    #[default]
    All,
    Questionnaire(QuestionnaireId),
}

impl ResultFilter {
    pub fn from_optional(questionnaire_id: Option<QuestionnaireId>) -> Self {
        match questionnaire_id {
            Some(id) => Self::Questionnaire(id),
            None => Self::All,
        }
    }

    pub fn admits(&self, result: &SurveyResult) -> bool {
        match self {
            ResultFilter::All => true,
            ResultFilter::Questionnaire(id) => result.questionnaire_id() == id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PooledTrait {
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub achieved: i64,
    pub possible: i64,
    pub percentage: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitAnalysis {
    pub results_considered: usize,
    pub results_skipped: usize,
    pub traits: Vec<PooledTrait>,
}

impl TraitAnalysis {
    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    pub fn get(&self, trait_name: &str) -> Option<&PooledTrait> {
        self.traits
            .iter()
            .find(|entry| entry.trait_name == trait_name)
    }
}

/// Pool trait scores across every result the filter admits.
///
/// Each result is aggregated against its own questionnaire, the achieved and
/// possible sums are added up per trait, and the percentage is taken of the sums.
/// Results whose questionnaire no longer exists are counted in `results_skipped`.
/// Traits come back strongest first; equal ratios keep first-seen order.
pub fn pool_trait_scores(
    results: &[SurveyResult],
    questionnaires: &[Questionnaire],
    filter: &ResultFilter,
) -> TraitAnalysis {
    let mut pooled = TraitBreakdown::default();
    let mut considered = 0;
    let mut skipped = 0;

    for result in results.iter().filter(|result| filter.admits(result)) {
        let Some(questionnaire) = questionnaires
            .iter()
            .find(|questionnaire| &questionnaire.id == result.questionnaire_id())
        else {
            skipped += 1;
            continue;
        };

        pooled.absorb(&result.trait_breakdown(questionnaire));
        considered += 1;
    }

    let mut traits: Vec<PooledTrait> = pooled
        .into_vec()
        .into_iter()
        .map(|entry| PooledTrait {
            percentage: percentage(entry.achieved, entry.possible),
            trait_name: entry.trait_name,
            achieved: entry.achieved,
            possible: entry.possible,
        })
        .collect();
    traits.sort_by(|a, b| compare_ratio(b.achieved, b.possible, a.achieved, a.possible));

    TraitAnalysis {
        results_considered: considered,
        results_skipped: skipped,
        traits,
    }
}

fn compare_ratio(left_num: i64, left_den: i64, right_num: i64, right_den: i64) -> Ordering {
    match (left_den > 0, right_den > 0) {
        (false, false) => Ordering::Equal,
        (false, true) => 0.cmp(&right_num.signum()),
        (true, false) => left_num.signum().cmp(&0),
        (true, true) => (i128::from(left_num) * i128::from(right_den))
            .cmp(&(i128::from(right_num) * i128::from(left_den))),
    }
}

/// One candidate's line on the comparison chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSeries {
    pub result_id: ResultId,
    pub user_name: String,
    pub overall_percentage: u32,
    /// Percentages aligned with [`CandidateComparison::axes`].
    pub trait_percentages: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateComparison {
    pub questionnaire_id: QuestionnaireId,
    pub questionnaire_title: String,
    pub axes: Vec<String>,
    pub candidates: Vec<CandidateSeries>,
}

impl CandidateComparison {
    pub fn score_for(&self, result_id: &ResultId, trait_name: &str) -> Option<u32> {
        let axis = self.axes.iter().position(|axis| axis == trait_name)?;
        self.candidates
            .iter()
            .find(|candidate| &candidate.result_id == result_id)
            .and_then(|candidate| candidate.trait_percentages.get(axis).copied())
    }
}

/// Overlay several candidates' trait percentages for one questionnaire.
///
/// Every result keeps its own percentages; nothing is pooled. The axes are the
/// union of all candidates' traits in first-seen order, and a candidate lacking a
/// trait reads 0 on that axis.
pub fn compare_candidates(
    results: &[SurveyResult],
    questionnaire: &Questionnaire,
) -> Result<CandidateComparison, ComparisonError> {
    if results.len() < 2 {
        return Err(ComparisonError::NotEnoughResults {
            selected: results.len(),
        });
    }

    if let Some(stray) = results
        .iter()
        .find(|result| result.questionnaire_id() != &questionnaire.id)
    {
        return Err(ComparisonError::MixedQuestionnaires {
            expected: questionnaire.id.clone(),
            found: stray.questionnaire_id().clone(),
        });
    }

    let breakdowns: Vec<TraitBreakdown> = results
        .iter()
        .map(|result| result.trait_breakdown(questionnaire))
        .collect();

    let mut axes: Vec<String> = Vec::new();
    for breakdown in &breakdowns {
        for name in breakdown.trait_names() {
            if !axes.iter().any(|axis| axis == name) {
                axes.push(name.to_string());
            }
        }
    }

    let candidates = results
        .iter()
        .zip(&breakdowns)
        .map(|(result, breakdown)| CandidateSeries {
            result_id: result.id().clone(),
            user_name: result.user_name().to_string(),
            overall_percentage: result.percentage(),
            trait_percentages: axes
                .iter()
                .map(|axis| {
                    breakdown
                        .get(axis)
                        .map(|aggregate| aggregate.percentage())
                        .unwrap_or(0)
                })
                .collect(),
        })
        .collect();

    Ok(CandidateComparison {
        questionnaire_id: questionnaire.id.clone(),
        questionnaire_title: questionnaire.title.clone(),
        axes,
        candidates,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComparisonError {
    #[error("select at least two results to compare (selected {selected})")]
    NotEnoughResults { selected: usize },
    #[error("results must share one questionnaire (expected {expected}, found {found})")]
    MixedQuestionnaires {
        expected: QuestionnaireId,
        found: QuestionnaireId,
    },
}

/// Candidate hub search criteria. Every criterion is optional and inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateFilter {
    /// Case-insensitive substring of the candidate name.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub questionnaire_id: Option<QuestionnaireId>,
    #[serde(default)]
    pub min_percentage: Option<u32>,
    #[serde(default)]
    pub max_percentage: Option<u32>,
    #[serde(default)]
    pub completed_from: Option<NaiveDate>,
    #[serde(default)]
    pub completed_to: Option<NaiveDate>,
}

impl CandidateFilter {
    pub fn matches(&self, result: &SurveyResult) -> bool {
        if let Some(name) = self.name.as_deref() {
            let needle = name.trim().to_lowercase();
            if !result.user_name().to_lowercase().contains(&needle) {
                return false;
            }
        }

        if let Some(id) = &self.questionnaire_id {
            if result.questionnaire_id() != id {
                return false;
            }
        }

        let score = result.percentage();
        if self.min_percentage.is_some_and(|min| score < min)
            || self.max_percentage.is_some_and(|max| score > max)
        {
            return false;
        }

        let completed_on = result.completed_at().date_naive();
        if self.completed_from.is_some_and(|from| completed_on < from)
            || self.completed_to.is_some_and(|to| completed_on > to)
        {
            return false;
        }

        true
    }

    /// Matching results, most recently completed first.
    pub fn apply<'a>(&self, results: &'a [SurveyResult]) -> Vec<&'a SurveyResult> {
        let mut matches: Vec<&SurveyResult> = results
            .iter()
            .filter(|result| self.matches(result))
            .collect();
        matches.sort_by(|a, b| b.completed_at().cmp(&a.completed_at()));
        matches
    }
}

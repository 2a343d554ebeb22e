use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::domain::{Answer, Questionnaire};
use super::scoring::{percentage, resolve_answers};

/// Achieved versus attainable points for one trait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitAggregate {
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub achieved: i64,
    pub possible: i64,
}

impl TraitAggregate {
    pub fn percentage(&self) -> u32 {
        percentage(self.achieved, self.possible)
    }
}

/// Per-trait aggregates keyed by trait name, kept in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitBreakdown {
    entries: Vec<TraitAggregate>,
}

impl TraitBreakdown {
    pub fn iter(&self) -> std::slice::Iter<'_, TraitAggregate> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, trait_name: &str) -> Option<&TraitAggregate> {
        self.entries
            .iter()
            .find(|entry| entry.trait_name == trait_name)
    }

    pub fn trait_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.trait_name.as_str())
    }

    pub fn total_achieved(&self) -> i64 {
        self.entries.iter().map(|entry| entry.achieved).sum()
    }

    pub fn total_possible(&self) -> i64 {
        self.entries.iter().map(|entry| entry.possible).sum()
    }

    /// Fold another breakdown into this one, summing matching traits and
    /// appending traits not seen before.
    pub fn absorb(&mut self, other: &TraitBreakdown) {
        for entry in &other.entries {
            match self
                .entries
                .iter_mut()
                .find(|existing| existing.trait_name == entry.trait_name)
            {
                Some(existing) => {
                    existing.achieved += entry.achieved;
                    existing.possible += entry.possible;
                }
                None => self.entries.push(entry.clone()),
            }
        }
    }

    pub fn into_vec(self) -> Vec<TraitAggregate> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a TraitBreakdown {
    type Item = &'a TraitAggregate;
    type IntoIter = std::slice::Iter<'a, TraitAggregate>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Group a questionnaire's questions by trait and total the answers per group.
///
/// Traits compare by exact, case-sensitive string equality. `possible` sums each
/// question's highest option score; `achieved` sums the matching answers, with a
/// missing answer counting as zero. Summed over all groups the result reproduces
/// [`compute_score`](super::scoring::compute_score) exactly.
pub fn aggregate_by_trait(questionnaire: &Questionnaire, answers: &[Answer]) -> TraitBreakdown {
    let resolved = resolve_answers(questionnaire, answers);
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<TraitAggregate> = Vec::new();

    for question in &questionnaire.questions {
        let index = *positions.entry(question.trait_name()).or_insert_with(|| {
            entries.push(TraitAggregate {
                trait_name: question.trait_name().to_string(),
                achieved: 0,
                possible: 0,
            });
            entries.len() - 1
        });

        let entry = &mut entries[index];
        entry.possible += i64::from(question.max_score());
        if let Some(score) = resolved.get(question.id()) {
            entry.achieved += i64::from(*score);
        }
    }

    TraitBreakdown { entries }
}

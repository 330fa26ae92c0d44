use std::cmp::Ordering;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::bank::{Bank, Stage};

/// Which banks the list shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Overdue,
    Stage(Stage),
}

impl Filter {
    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Overdue => "overdue",
            Filter::Stage(stage) => stage.label(),
        }
    }
}

/// Sort order for the visible list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Overdue first, then dated ascending, then undated
    #[default]
    NextAction,
    /// Case-insensitive ascending
    Name,
    /// Descending volume potential
    Volume,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            SortKey::NextAction => "next action",
            SortKey::Name => "name",
            SortKey::Volume => "volume",
        }
    }
}

/// Per-stage record counts, one pass over the snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageCounts {
    pub unknown: usize,
    pub compatible: usize,
    pub sampled: usize,
    pub converted: usize,
}

impl StageCounts {
    pub fn get(&self, stage: Stage) -> usize {
        match stage {
            Stage::Unknown => self.unknown,
            Stage::Compatible => self.compatible,
            Stage::Sampled => self.sampled,
            Stage::Converted => self.converted,
        }
    }

    pub fn total(&self) -> usize {
        self.unknown + self.compatible + self.sampled + self.converted
    }
}

pub fn stage_counts(banks: &[Bank]) -> StageCounts {
    let mut counts = StageCounts::default();
    for bank in banks {
        match bank.stage {
            Stage::Unknown => counts.unknown += 1,
            Stage::Compatible => counts.compatible += 1,
            Stage::Sampled => counts.sampled += 1,
            Stage::Converted => counts.converted += 1,
        }
    }
    counts
}

/// A bank is overdue when its next-action date has passed: the date is
/// set and strictly before the current calendar day. No date, never
/// overdue.
pub fn is_overdue(bank: &Bank, today: NaiveDate) -> bool {
    bank.next_action.is_some_and(|date| date < today)
}

pub fn overdue_count(banks: &[Bank], today: NaiveDate) -> usize {
    banks.iter().filter(|b| is_overdue(b, today)).count()
}

/// Build the case-insensitive substring matcher for a search query.
/// Returns None for an empty query. The escaped pattern makes this plain
/// substring search; the regex form is what the list renderer uses for
/// match highlighting.
pub fn search_matcher(query: &str) -> Option<Regex> {
    if query.is_empty() {
        return None;
    }
    Regex::new(&format!("(?i){}", regex::escape(query))).ok()
}

/// Search matches against name, location, and contact.
fn matches_search(bank: &Bank, re: &Regex) -> bool {
    re.is_match(&bank.name) || re.is_match(&bank.location) || re.is_match(&bank.contact)
}

fn passes_filter(bank: &Bank, filter: Filter, today: NaiveDate) -> bool {
    match filter {
        Filter::All => true,
        Filter::Overdue => is_overdue(bank, today),
        Filter::Stage(stage) => bank.stage == stage,
    }
}

/// Derive the visible list: filter, then search, then sort. Returns
/// indices into the snapshot in display order. The sorts are stable, so
/// ties keep the snapshot's name ordering.
pub fn visible_banks(
    banks: &[Bank],
    filter: Filter,
    query: &str,
    sort: SortKey,
    today: NaiveDate,
) -> Vec<usize> {
    let matcher = search_matcher(query);

    let mut visible: Vec<usize> = banks
        .iter()
        .enumerate()
        .filter(|(_, bank)| passes_filter(bank, filter, today))
        .filter(|(_, bank)| matcher.as_ref().is_none_or(|re| matches_search(bank, re)))
        .map(|(i, _)| i)
        .collect();

    match sort {
        SortKey::NextAction => {
            visible.sort_by(|&a, &b| next_action_order(&banks[a], &banks[b], today));
        }
        SortKey::Name => {
            visible.sort_by(|&a, &b| {
                banks[a]
                    .name
                    .to_lowercase()
                    .cmp(&banks[b].name.to_lowercase())
                    .then_with(|| banks[a].name.cmp(&banks[b].name))
            });
        }
        SortKey::Volume => {
            visible.sort_by(|&a, &b| banks[b].volume_potential.cmp(&banks[a].volume_potential));
        }
    }

    visible
}

/// Overdue ≺ dated ≺ undated. Dated non-overdue banks order by date
/// ascending; overdue banks have no tie-break beyond stability.
fn next_action_order(a: &Bank, b: &Bank, today: NaiveDate) -> Ordering {
    let rank = |bank: &Bank| {
        if is_overdue(bank, today) {
            0
        } else if bank.next_action.is_some() {
            1
        } else {
            2
        }
    };

    match rank(a).cmp(&rank(b)) {
        Ordering::Equal if rank(a) == 1 => a.next_action.cmp(&b.next_action),
        ordering => ordering,
    }
}

//! Shown/rank bookkeeping shared by the count, AP, cost and loss measures.

use super::{is_retrieved_relevant, Action, JudgmentEvent};

/// What the tally recorded for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Withheld; no counter moved except possibly feedback.
    Skipped,
    Shown,
    /// Shown and counted as a relevant find.
    Found,
}

/// Running counters over the shown part of a stream.
///
/// Withheld (`NS`) documents do not advance `num_shown` or `last_rank`, so
/// `last_rank` is the rank within the reviewed sequence, not the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct RankTally {
    pub num_shown: usize,
    pub num_feedback: usize,
    pub last_rank: usize,
    pub last_rel: usize,
    pub rels_found: usize,
    find_rule: FindRule,
}

/// Which judgments count as a relevant find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindRule {
    /// Codes 1 and 2.
    Retrieved,
    /// Any positive code, including the not-retrieved codes 3 and 4.
    AnyPositive,
}

impl FindRule {
    fn matches(self, judgment: i32) -> bool {
        match self {
            FindRule::Retrieved => is_retrieved_relevant(judgment),
            FindRule::AnyPositive => judgment > 0,
        }
    }
}

impl Default for RankTally {
    fn default() -> Self {
        Self::new()
    }
}

impl RankTally {
    pub fn new() -> Self {
        Self::with_rule(FindRule::Retrieved)
    }

    pub fn any_positive() -> Self {
        Self::with_rule(FindRule::AnyPositive)
    }

    pub fn with_rule(find_rule: FindRule) -> Self {
        Self {
            num_shown: 0,
            num_feedback: 0,
            last_rank: 0,
            last_rel: 0,
            rels_found: 0,
            find_rule,
        }
    }

    pub fn record(&mut self, event: &JudgmentEvent) -> Step {
        let step = if event.action.is_shown() {
            self.num_shown += 1;
            self.last_rank += 1;
            if self.find_rule.matches(event.judgment) {
                self.rels_found += 1;
                self.last_rel = self.last_rank;
                Step::Found
            } else {
                Step::Shown
            }
        } else {
            Step::Skipped
        };

        // Feedback is tracked apart from the shown branch.
        if event.action == Action::ActiveFeedback {
            self.num_feedback += 1;
        }
        step
    }
}

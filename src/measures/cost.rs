use super::{
    field, Action, AggRule, EvalMeasure, FieldValue, JudgmentEvent, Manifest, RankTally, Topic,
};
use crate::config::{CostModel, WithheldPolicy};

const MANIFEST: Manifest = &[
    field("total_cost", AggRule::Mean),
    field("total_cost_uniform", AggRule::Mean),
    field("total_cost_weighted", AggRule::Mean),
    field("savings_uniform", AggRule::Mean),
    field("savings_weighted", AggRule::Mean),
];

/// Review cost of the stream plus a penalty for relevant documents it missed.
///
/// Every rank pays the assessment cost (or the withheld cost under
/// [`WithheldPolicy::ChargeWithheld`]), plus the feedback cost on `AF`.
/// A relevant find here is any positive judgment.
///
/// Two penalties price the unshown documents a distrustful reviewer would
/// still have to read, with `Mr` missing relevant and `Nu` unshown documents:
/// - uniform: `Nu * CP * Mr / R`, 0 when the topic has no relevant documents
/// - weighted: `sum(i = 1..Mr-1) Nu * CP / 2^i`
///
/// Savings divide each penalised total by the cost of assessing the whole list.
#[derive(Debug, Clone)]
pub struct CostBasedMeasure {
    topic: Topic,
    model: CostModel,
    tally: RankTally,
    total_cost: f64,
    max_assessment_cost: f64,
    total_cost_uniform: f64,
    total_cost_weighted: f64,
    savings_uniform: f64,
    savings_weighted: f64,
}

impl CostBasedMeasure {
    pub fn new(topic: &Topic, model: CostModel) -> Self {
        let max_assessment_cost = topic.num_docs as f64 * model.assessment;
        Self {
            topic: topic.clone(),
            model,
            tally: RankTally::any_positive(),
            total_cost: 0.0,
            max_assessment_cost,
            total_cost_uniform: 0.0,
            total_cost_weighted: 0.0,
            savings_uniform: 0.0,
            savings_weighted: 0.0,
        }
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn total_cost_uniform(&self) -> f64 {
        self.total_cost_uniform
    }

    pub fn total_cost_weighted(&self) -> f64 {
        self.total_cost_weighted
    }

    pub fn savings_uniform(&self) -> f64 {
        self.savings_uniform
    }

    pub fn savings_weighted(&self) -> f64 {
        self.savings_weighted
    }

    fn rank_cost(&self, action: Action) -> f64 {
        let base = match (self.model.withheld_policy, action) {
            (WithheldPolicy::ChargeWithheld, Action::NotShown) => self.model.withheld,
            _ => self.model.assessment,
        };
        if action == Action::ActiveFeedback {
            base + self.model.feedback
        } else {
            base
        }
    }

    fn uniform_penalty(&self, missing: usize, unshown: usize) -> f64 {
        if self.topic.num_rels == 0 {
            return 0.0;
        }
        (unshown as f64 * self.model.penalty * missing as f64) / self.topic.num_rels as f64
    }

    fn weighted_penalty(&self, missing: usize, unshown: usize) -> f64 {
        let unit = unshown as f64 * self.model.penalty;
        let mut penalty = 0.0;
        let mut divisor = 1.0;
        for _ in 1..missing {
            divisor *= 2.0;
            penalty += unit / divisor;
        }
        penalty
    }
}

impl EvalMeasure for CostBasedMeasure {
    fn update(&mut self, event: &JudgmentEvent) {
        self.tally.record(event);
        self.total_cost += self.rank_cost(event.action);
    }

    fn finalize(&mut self) {
        // Codes 3 and 4 count as finds here, so finds can exceed the known total.
        let missing = self.topic.num_rels.saturating_sub(self.tally.rels_found);
        let unshown = self.topic.num_docs.saturating_sub(self.tally.num_shown);

        self.total_cost_uniform = self.total_cost + self.uniform_penalty(missing, unshown);
        self.total_cost_weighted = self.total_cost + self.weighted_penalty(missing, unshown);

        if self.max_assessment_cost > 0.0 {
            self.savings_uniform = self.total_cost_uniform / self.max_assessment_cost;
            self.savings_weighted = self.total_cost_weighted / self.max_assessment_cost;
        } else {
            log::warn!("topic {}: empty ranking, savings set to 0", self.topic.topic_id);
            self.savings_uniform = 0.0;
            self.savings_weighted = 0.0;
        }
    }

    fn manifest(&self) -> Manifest {
        MANIFEST
    }

    fn value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "total_cost" => Some(self.total_cost.into()),
            "total_cost_uniform" => Some(self.total_cost_uniform.into()),
            "total_cost_weighted" => Some(self.total_cost_weighted.into()),
            "savings_uniform" => Some(self.savings_uniform.into()),
            "savings_weighted" => Some(self.savings_weighted.into()),
            _ => None,
        }
    }
}

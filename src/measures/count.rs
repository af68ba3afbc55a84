use super::{field, AggRule, EvalMeasure, FieldValue, JudgmentEvent, Manifest, RankTally, Topic};

const MANIFEST: Manifest = &[
    field("num_shown", AggRule::Sum),
    field("num_feedback", AggRule::Sum),
    field("rels_found", AggRule::Sum),
    field("last_rel", AggRule::Mean),
    field("last_rank", AggRule::Mean),
    field("min_req", AggRule::Mean),
];

/// Shown/feedback counts and the rank of the last relevant document found.
#[derive(Debug, Clone)]
pub struct CountBasedMeasures {
    topic: Topic,
    tally: RankTally,
    /// Fraction of the list that must be reviewed to reach `last_rel`.
    min_req: f64,
}

impl CountBasedMeasures {
    pub fn new(topic: &Topic) -> Self {
        Self {
            topic: topic.clone(),
            tally: RankTally::new(),
            min_req: 0.0,
        }
    }

    pub fn tally(&self) -> &RankTally {
        &self.tally
    }

    pub fn min_req(&self) -> f64 {
        self.min_req
    }
}

impl EvalMeasure for CountBasedMeasures {
    fn update(&mut self, event: &JudgmentEvent) {
        self.tally.record(event);
    }

    fn finalize(&mut self) {
        if self.topic.num_docs == 0 {
            log::warn!("topic {}: empty ranking, min_req set to 0", self.topic.topic_id);
            self.min_req = 0.0;
            return;
        }
        self.min_req = self.tally.last_rel as f64 / self.topic.num_docs as f64;
    }

    fn manifest(&self) -> Manifest {
        MANIFEST
    }

    fn value(&self, field: &str) -> Option<FieldValue> {
        let t = &self.tally;
        match field {
            "num_shown" => Some(t.num_shown.into()),
            "num_feedback" => Some(t.num_feedback.into()),
            "rels_found" => Some(t.rels_found.into()),
            "last_rel" => Some(t.last_rel.into()),
            "last_rank" => Some(t.last_rank.into()),
            "min_req" => Some(self.min_req.into()),
            _ => None,
        }
    }
}

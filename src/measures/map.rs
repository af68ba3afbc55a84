use super::tally::Step;
use super::{field, AggRule, EvalMeasure, FieldValue, JudgmentEvent, Manifest, RankTally, Topic};

const MANIFEST: Manifest = &[field("ap", AggRule::Mean)];

/// Average Precision over the reviewed stream.
///
/// Precision is taken at each relevant find, with rank counted over shown
/// documents only, and the sum is divided by the topic's known relevant count.
/// A topic with no relevant documents scores 0.
#[derive(Debug, Clone)]
pub struct MapBasedMeasures {
    topic: Topic,
    tally: RankTally,
    ap: f64,
}

impl MapBasedMeasures {
    pub fn new(topic: &Topic) -> Self {
        Self {
            topic: topic.clone(),
            tally: RankTally::new(),
            ap: 0.0,
        }
    }

    pub fn ap(&self) -> f64 {
        self.ap
    }
}

impl EvalMeasure for MapBasedMeasures {
    fn update(&mut self, event: &JudgmentEvent) {
        if self.tally.record(event) == Step::Found {
            self.ap += self.tally.rels_found as f64 / self.tally.last_rank as f64;
        }
    }

    fn finalize(&mut self) {
        if self.topic.num_rels == 0 {
            log::warn!("topic {}: no relevant documents, ap set to 0", self.topic.topic_id);
            self.ap = 0.0;
            return;
        }
        self.ap /= self.topic.num_rels as f64;
    }

    fn manifest(&self) -> Manifest {
        MANIFEST
    }

    fn value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "ap" => Some(self.ap.into()),
            _ => None,
        }
    }
}

use super::{field, AggRule, EvalMeasure, FieldValue, JudgmentEvent, Manifest, RankTally, Topic};

const MANIFEST: Manifest = &[
    field("r", AggRule::Mean),
    field("loss_e", AggRule::Mean),
    field("loss_r", AggRule::Mean),
    field("loss_er", AggRule::Mean),
];

/// Recall deficit plus review effort.
///
/// `loss_r = (1 - r)^2` and `loss_e = (b / N)^2 * (shown / (R + b))^2`, where
/// `b` is the smoothing parameter. A topic with no relevant documents has
/// nothing to miss: `r` is 1 and `loss_r` is 0.
#[derive(Debug, Clone)]
pub struct LossBasedMeasures {
    topic: Topic,
    tally: RankTally,
    smoothing: f64,
    r: f64,
    loss_r: f64,
    loss_e: f64,
    loss_er: f64,
}

impl LossBasedMeasures {
    pub fn new(topic: &Topic, smoothing: f64) -> Self {
        Self {
            topic: topic.clone(),
            tally: RankTally::new(),
            smoothing,
            r: 0.0,
            loss_r: 0.0,
            loss_e: 0.0,
            loss_er: 0.0,
        }
    }

    pub fn recall(&self) -> f64 {
        self.r
    }

    pub fn loss_r(&self) -> f64 {
        self.loss_r
    }

    pub fn loss_e(&self) -> f64 {
        self.loss_e
    }

    pub fn loss_er(&self) -> f64 {
        self.loss_er
    }
}

impl EvalMeasure for LossBasedMeasures {
    fn update(&mut self, event: &JudgmentEvent) {
        self.tally.record(event);
    }

    fn finalize(&mut self) {
        let b = self.smoothing;
        let rels = self.topic.num_rels as f64;

        if self.topic.num_rels == 0 {
            log::warn!(
                "topic {}: no relevant documents, recall set to 1",
                self.topic.topic_id
            );
            self.r = 1.0;
            self.loss_r = 0.0;
        } else {
            self.r = self.tally.rels_found as f64 / rels;
            self.loss_r = (1.0 - self.r).powi(2);
        }

        self.loss_e = if self.topic.num_docs == 0 {
            0.0
        } else {
            let scale = b / self.topic.num_docs as f64;
            let effort = self.tally.num_shown as f64 / (rels + b);
            scale.powi(2) * effort.powi(2)
        };
        self.loss_er = self.loss_r + self.loss_e;
    }

    fn manifest(&self) -> Manifest {
        MANIFEST
    }

    fn value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "r" => Some(self.r.into()),
            "loss_e" => Some(self.loss_e.into()),
            "loss_r" => Some(self.loss_r.into()),
            "loss_er" => Some(self.loss_er.into()),
            _ => None,
        }
    }
}

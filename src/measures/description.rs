use super::{field, AggRule, EvalMeasure, FieldValue, JudgmentEvent, Manifest, Topic};

const MANIFEST: Manifest = &[
    field("topic_id", AggRule::Sum),
    field("num_docs", AggRule::Sum),
    field("num_rels", AggRule::Sum),
];

/// Topic identity only; updates and finalize are no-ops.
#[derive(Debug, Clone)]
pub struct DescriptionMeasures {
    topic: Topic,
}

impl DescriptionMeasures {
    pub fn new(topic: &Topic) -> Self {
        Self {
            topic: topic.clone(),
        }
    }
}

impl EvalMeasure for DescriptionMeasures {
    fn update(&mut self, _event: &JudgmentEvent) {}

    fn finalize(&mut self) {}

    fn manifest(&self) -> Manifest {
        MANIFEST
    }

    fn value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "topic_id" => Some(FieldValue::Text(self.topic.topic_id.clone())),
            "num_docs" => Some(self.topic.num_docs.into()),
            "num_rels" => Some(self.topic.num_rels.into()),
            _ => None,
        }
    }
}

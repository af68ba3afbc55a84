use super::{
    field, is_retrieved_relevant, AggRule, EvalMeasure, FieldValue, JudgmentEvent, Manifest, Topic,
};

const MANIFEST: Manifest = &[
    field("area", AggRule::Mean),
    field("max_area", AggRule::Mean),
    field("norm_area", AggRule::Mean),
];

/// Area under the cumulative-gain curve of the shown documents.
///
/// Each shown document contributes the gain before it plus half its own gain
/// (trapezoidal integration). Ranks never shown extend the curve flat at the
/// final gain. The best achievable area puts every relevant document first:
/// `R * N - R^2 / 2`.
#[derive(Debug, Clone)]
pub struct AreaBasedMeasures {
    topic: Topic,
    num_shown: usize,
    cg: usize,
    area: f64,
    max_area: f64,
    norm_area: f64,
}

impl AreaBasedMeasures {
    pub fn new(topic: &Topic) -> Self {
        let rels = topic.num_rels as f64;
        Self {
            topic: topic.clone(),
            num_shown: 0,
            cg: 0,
            area: 0.0,
            max_area: rels * topic.num_docs as f64 - (rels * rels) / 2.0,
            norm_area: 0.0,
        }
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn max_area(&self) -> f64 {
        self.max_area
    }

    pub fn norm_area(&self) -> f64 {
        self.norm_area
    }
}

impl EvalMeasure for AreaBasedMeasures {
    fn update(&mut self, event: &JudgmentEvent) {
        if !event.action.is_shown() {
            return;
        }
        let v = usize::from(is_retrieved_relevant(event.value));
        self.area += self.cg as f64 + 0.5 * v as f64;
        self.cg += v;
        self.num_shown += 1;
    }

    fn finalize(&mut self) {
        let not_shown = self.topic.num_docs.saturating_sub(self.num_shown);
        if not_shown > 0 {
            self.area += (not_shown * self.cg) as f64;
        }

        if self.max_area > 0.0 {
            self.norm_area = self.area / self.max_area;
        } else {
            log::warn!(
                "topic {}: maximum area is {}, norm_area set to 0",
                self.topic.topic_id,
                self.max_area
            );
            self.norm_area = 0.0;
        }
    }

    fn manifest(&self) -> Manifest {
        MANIFEST
    }

    fn value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "area" => Some(self.area.into()),
            "max_area" => Some(self.max_area.into()),
            "norm_area" => Some(self.norm_area.into()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measures::test_support::*;

    #[test]
    fn perfect_ranking_fills_maximum_area() {
        let mut m = AreaBasedMeasures::new(&Topic::new("T1", 4, 2));
        run(&mut m, &[nf(1), nf(1), nf(0), nf(0)]);
        assert!(approx(m.area(), 6.0));
        assert!(approx(m.max_area(), 6.0));
        assert!(approx(m.norm_area(), 1.0));
    }

    #[test]
    fn late_relevant_documents_shrink_area() {
        // 0 + 0 + 0.5 + 1.5
        let mut m = AreaBasedMeasures::new(&Topic::new("T1", 4, 2));
        run(&mut m, &[nf(0), nf(0), nf(1), af(2)]);
        assert!(approx(m.area(), 2.0));
        assert!(approx(m.norm_area(), 2.0 / 6.0));
    }

    #[test]
    fn unshown_tail_extends_flat() {
        // shown: 0.5 + 1.0, then two unshown ranks at cg 1
        let mut m = AreaBasedMeasures::new(&Topic::new("T1", 4, 1));
        run(&mut m, &[nf(1), nf(0), ns(1), ns(0)]);
        assert!(approx(m.area(), 3.5));
        assert!(approx(m.max_area(), 3.5));
        assert!(approx(m.norm_area(), 1.0));
    }

    #[test]
    fn no_relevant_documents_has_zero_norm_area() {
        let mut m = AreaBasedMeasures::new(&Topic::new("T1", 3, 0));
        run(&mut m, &[nf(0), nf(0), nf(0)]);
        assert_eq!(m.max_area(), 0.0);
        assert_eq!(m.norm_area(), 0.0);
    }
}

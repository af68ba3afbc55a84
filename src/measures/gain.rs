use super::{
    field, is_retrieved_relevant, Action, AggRule, EvalMeasure, FieldValue, JudgmentEvent,
    Manifest, Topic, DECILES,
};

const MANIFEST: Manifest = &[
    field("total_cg", AggRule::Mean),
    field("max_cg", AggRule::Mean),
    field("ncg", AggRule::Mean),
    field("cgat", AggRule::List),
    field("ncgat", AggRule::List),
    field("threshold", AggRule::Mean),
    field("norm_threshold", AggRule::Mean),
    field("threshold_cg", AggRule::Mean),
    field("threshold_ncg", AggRule::Mean),
];

/// Slots 0..=10 are reported; 11 catches the snapshot taken at the last rank.
const SLOTS: usize = 12;
const FINAL_SLOT: usize = 10;

/// Rank and cumulative gain when the reviewer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Checkpoint {
    rank: usize,
    cg: usize,
}

/// Cumulative gain with decile snapshots and a stop-point checkpoint.
///
/// Gain accrues over every rank, shown or not: codes 1 and 2 of `value` earn
/// one unit. The checkpoint is taken at the first withheld rank and never
/// moved by later ones; a stream with no withheld rank checkpoints at its end.
///
/// Topics with fewer than ten documents have a decile step of zero and take no
/// intermediate snapshots. With no relevant documents every normalised value
/// is 0.
#[derive(Debug, Clone)]
pub struct GainBasedMeasures {
    topic: Topic,
    max_cg: usize,
    total_cg: usize,
    ncg: f64,
    cgat: [usize; SLOTS],
    last_rank: usize,
    step: usize,
    first_withheld: Option<Checkpoint>,
    threshold: Checkpoint,
    norm_threshold: f64,
    threshold_ncg: f64,
}

impl GainBasedMeasures {
    pub fn new(topic: &Topic) -> Self {
        Self {
            topic: topic.clone(),
            max_cg: topic.num_rels,
            total_cg: 0,
            ncg: 0.0,
            cgat: [0; SLOTS],
            last_rank: 0,
            step: topic.num_docs / 10,
            first_withheld: None,
            threshold: Checkpoint {
                rank: topic.num_docs,
                cg: 0,
            },
            norm_threshold: 0.0,
            threshold_ncg: 0.0,
        }
    }

    pub fn total_cg(&self) -> usize {
        self.total_cg
    }

    pub fn ncg(&self) -> f64 {
        self.ncg
    }

    pub fn threshold(&self) -> usize {
        self.threshold.rank
    }

    pub fn threshold_cg(&self) -> usize {
        self.threshold.cg
    }

    /// Reported decile curve: cumulative gain at 0%, 10%, .., 100%.
    pub fn cgat(&self) -> Vec<f64> {
        self.cgat[..DECILES].iter().map(|&cg| cg as f64).collect()
    }

    pub fn ncgat(&self) -> Vec<f64> {
        self.cgat[..DECILES]
            .iter()
            .map(|&cg| self.normalise(cg))
            .collect()
    }

    fn normalise(&self, cg: usize) -> f64 {
        if self.max_cg == 0 {
            0.0
        } else {
            cg as f64 / self.max_cg as f64
        }
    }
}

impl EvalMeasure for GainBasedMeasures {
    fn update(&mut self, event: &JudgmentEvent) {
        self.last_rank += 1;
        if is_retrieved_relevant(event.value) {
            self.total_cg += 1;
        }

        if self.step > 0 && self.last_rank % self.step == 0 {
            let pos = self.last_rank * 10 / self.topic.num_docs + 1;
            if let Some(slot) = self.cgat.get_mut(pos) {
                *slot = self.total_cg;
            }
        }

        if event.action == Action::NotShown && self.first_withheld.is_none() {
            self.first_withheld = Some(Checkpoint {
                rank: self.last_rank,
                cg: self.total_cg,
            });
        }
    }

    fn finalize(&mut self) {
        self.cgat[FINAL_SLOT] = self.total_cg;
        self.threshold = self.first_withheld.unwrap_or(Checkpoint {
            rank: self.last_rank,
            cg: self.total_cg,
        });

        if self.max_cg == 0 {
            log::warn!(
                "topic {}: no relevant documents, normalised gain set to 0",
                self.topic.topic_id
            );
        }
        self.ncg = self.normalise(self.total_cg);
        self.threshold_ncg = self.normalise(self.threshold.cg);
        self.norm_threshold = if self.topic.num_docs == 0 {
            0.0
        } else {
            self.threshold.rank as f64 / self.topic.num_docs as f64
        };
    }

    fn manifest(&self) -> Manifest {
        MANIFEST
    }

    fn value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "total_cg" => Some(self.total_cg.into()),
            "max_cg" => Some(self.max_cg.into()),
            "ncg" => Some(self.ncg.into()),
            "cgat" => Some(FieldValue::List(self.cgat())),
            "ncgat" => Some(FieldValue::List(self.ncgat())),
            "threshold" => Some(self.threshold.rank.into()),
            "norm_threshold" => Some(self.norm_threshold.into()),
            "threshold_cg" => Some(self.threshold.cg.into()),
            "threshold_ncg" => Some(self.threshold_ncg.into()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measures::test_support::*;

    fn stream(
        len: usize,
        relevant_at: &[usize],
        withheld_from: Option<usize>,
    ) -> Vec<JudgmentEvent> {
        (1..=len)
            .map(|rank| {
                let code = if relevant_at.contains(&rank) { 1 } else { 0 };
                match withheld_from {
                    Some(start) if rank >= start => ns(code),
                    _ => nf(code),
                }
            })
            .collect()
    }

    #[test]
    fn decile_curve_is_monotone_and_closed() {
        let mut m = GainBasedMeasures::new(&Topic::new("T1", 100, 5));
        run(&mut m, &stream(100, &[3, 15, 16, 47, 88], None));
        let cgat = m.cgat();
        assert_eq!(cgat.len(), DECILES);
        assert!(cgat.windows(2).all(|w| w[0] <= w[1]), "{:?}", cgat);
        assert_eq!(cgat[10], m.total_cg() as f64);
        assert!(approx(m.ncg(), m.total_cg() as f64 / 5.0));
        assert!(approx(m.ncg(), 1.0));
    }

    #[test]
    fn snapshot_slot_follows_rank_fraction() {
        // step 10: rank 10 lands in slot 2, rank 50 in slot 6
        let mut m = GainBasedMeasures::new(&Topic::new("T1", 100, 3));
        run(&mut m, &stream(100, &[1, 45, 99], None));
        let cgat = m.cgat();
        assert_eq!(cgat[2], 1.0);
        assert_eq!(cgat[6], 2.0);
        assert_eq!(cgat[10], 3.0);
    }

    #[test]
    fn threshold_is_first_withheld_rank() {
        let mut m = GainBasedMeasures::new(&Topic::new("T1", 10, 2));
        let mut events = stream(10, &[1, 8], Some(4));
        // a later shown rank must not move the checkpoint either
        events[6] = nf(0);
        run(&mut m, &events);
        assert_eq!(m.threshold(), 4);
        assert_eq!(m.threshold_cg(), 1);
        assert_eq!(m.value("norm_threshold"), Some(FieldValue::Float(0.4)));
        assert_eq!(m.value("threshold_ncg"), Some(FieldValue::Float(0.5)));
        // gain keeps accruing past the threshold
        assert_eq!(m.total_cg(), 2);
    }

    #[test]
    fn withheld_at_last_rank_is_kept() {
        let mut m = GainBasedMeasures::new(&Topic::new("T1", 3, 1));
        run(&mut m, &[nf(1), nf(0), ns(0)]);
        assert_eq!(m.threshold(), 3);
        assert_eq!(m.threshold_cg(), 1);
    }

    #[test]
    fn no_withheld_rank_checkpoints_at_end() {
        let mut m = GainBasedMeasures::new(&Topic::new("T1", 4, 2));
        run(&mut m, &[nf(1), nf(0), nf(1), nf(0)]);
        assert_eq!(m.threshold(), 4);
        assert_eq!(m.threshold_cg(), 2);
        assert_eq!(m.value("norm_threshold"), Some(FieldValue::Float(1.0)));
    }

    #[test]
    fn not_retrieved_values_earn_no_gain() {
        let mut m = GainBasedMeasures::new(&Topic::new("T1", 3, 3));
        run(&mut m, &[nf(3), nf(4), nf(2)]);
        assert_eq!(m.total_cg(), 1);
    }

    #[test]
    fn short_topic_skips_snapshots() {
        let mut m = GainBasedMeasures::new(&Topic::new("T1", 4, 2));
        run(&mut m, &[nf(1), nf(1), nf(0), nf(0)]);
        let cgat = m.cgat();
        assert!(cgat[..10].iter().all(|&v| v == 0.0));
        assert_eq!(cgat[10], 2.0);
    }

    #[test]
    fn no_relevant_documents_normalise_to_zero() {
        let mut m = GainBasedMeasures::new(&Topic::new("T1", 12, 0));
        run(&mut m, &stream(12, &[], None));
        assert_eq!(m.ncg(), 0.0);
        assert!(m.ncgat().iter().all(|&v| v == 0.0));
        assert_eq!(m.value("threshold_ncg"), Some(FieldValue::Float(0.0)));
    }

    #[test]
    fn empty_ranking() {
        let mut m = GainBasedMeasures::new(&Topic::new("T0", 0, 0));
        run(&mut m, &[]);
        assert_eq!(m.threshold(), 0);
        assert_eq!(m.value("norm_threshold"), Some(FieldValue::Float(0.0)));
    }
}

//! Evaluation driver: per-topic lifecycle checks, run files, aggregation and reporting.

pub mod aggregate;
pub mod report;
pub mod run;

pub use aggregate::Aggregator;
pub use report::{format_aggregate, format_topic, to_json, Report};
pub use run::{load_runs, parse_runs, TopicRun};

use crate::config::Config;
use crate::error::{EvalError, Result};
use crate::measures::{
    EvalMeasure, FieldValue, JudgmentEvent, Manifest, Measure, MeasureKind, Topic,
};

/// One measure for one topic, with the stream contract enforced.
///
/// Exactly `num_docs` updates in rank order, then one `finalize`, then reads.
/// Any other sequence is a caller bug and fails immediately.
#[derive(Debug, Clone)]
pub struct TopicMeasure {
    topic: Topic,
    measure: Measure,
    updates: usize,
    finalized: bool,
}

impl TopicMeasure {
    pub fn new(kind: MeasureKind, topic: Topic, config: &Config) -> Self {
        let measure = Measure::new(kind, &topic, config);
        Self {
            topic,
            measure,
            updates: 0,
            finalized: false,
        }
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn kind(&self) -> MeasureKind {
        self.measure.kind()
    }

    pub fn manifest(&self) -> Manifest {
        self.measure.manifest()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn update(&mut self, event: &JudgmentEvent) -> Result<()> {
        if self.finalized {
            return Err(EvalError::UpdateAfterFinalize {
                topic: self.topic.topic_id.clone(),
            });
        }
        if self.updates == self.topic.num_docs {
            return Err(EvalError::TooManyUpdates {
                topic: self.topic.topic_id.clone(),
                expected: self.topic.num_docs,
            });
        }
        let expected = self.updates + 1;
        if let Some(rank) = event.rank {
            if rank != expected {
                return Err(EvalError::OutOfOrder {
                    topic: self.topic.topic_id.clone(),
                    expected,
                    got: rank,
                });
            }
        }
        self.measure.update(event);
        self.updates = expected;
        Ok(())
    }

    pub fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Err(EvalError::AlreadyFinalized {
                topic: self.topic.topic_id.clone(),
            });
        }
        if self.updates != self.topic.num_docs {
            return Err(EvalError::IncompleteStream {
                topic: self.topic.topic_id.clone(),
                expected: self.topic.num_docs,
                received: self.updates,
            });
        }
        self.measure.finalize();
        self.finalized = true;
        Ok(())
    }

    /// A manifest field's value; only readable after `finalize`.
    pub fn value(&self, field: &str) -> Result<FieldValue> {
        if !self.finalized {
            return Err(EvalError::NotFinalized {
                topic: self.topic.topic_id.clone(),
                field: field.to_string(),
            });
        }
        self.measure
            .value(field)
            .ok_or_else(|| EvalError::UnknownField(format!("{}.{}", self.kind(), field)))
    }

    /// Every manifest field, in manifest order.
    pub fn values(&self) -> Result<Vec<(&'static str, FieldValue)>> {
        self.manifest()
            .iter()
            .map(|entry| Ok((entry.name, self.value(entry.name)?)))
            .collect()
    }
}

/// Requested kinds in order, with repeats dropped.
pub fn unique_kinds(kinds: &[MeasureKind]) -> Vec<MeasureKind> {
    let mut unique = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        if !unique.contains(&kind) {
            unique.push(kind);
        }
    }
    unique
}

/// Run every requested measure over one topic's stream.
///
/// A kind requested more than once is computed once.
pub fn evaluate_topic(
    run: &TopicRun,
    kinds: &[MeasureKind],
    config: &Config,
) -> Result<Vec<TopicMeasure>> {
    let topic = run.topic();
    if topic.is_degenerate() {
        log::warn!(
            "topic {}: degenerate (num_docs={}, num_rels={})",
            topic.topic_id,
            topic.num_docs,
            topic.num_rels
        );
    }

    let mut measures: Vec<TopicMeasure> = unique_kinds(kinds)
        .into_iter()
        .map(|kind| TopicMeasure::new(kind, topic.clone(), config))
        .collect();

    for event in &run.events {
        for measure in &mut measures {
            measure.update(event)?;
        }
    }
    for measure in &mut measures {
        measure.finalize()?;
    }

    log::debug!(
        "topic {}: {} ranks, {} measures finalized",
        topic.topic_id,
        run.events.len(),
        measures.len()
    );
    Ok(measures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measures::Action;

    fn event(judgment: i32, action: Action) -> JudgmentEvent {
        JudgmentEvent::new(judgment, judgment, action)
    }

    fn measure(kind: MeasureKind, num_docs: usize, num_rels: usize) -> TopicMeasure {
        TopicMeasure::new(kind, Topic::new("T1", num_docs, num_rels), &Config::default())
    }

    #[test]
    fn full_lifecycle() {
        let mut m = measure(MeasureKind::Map, 2, 1);
        m.update(&event(1, Action::NoFeedback)).unwrap();
        m.update(&event(0, Action::NoFeedback)).unwrap();
        m.finalize().unwrap();
        assert_eq!(m.value("ap").unwrap(), FieldValue::Float(1.0));
        assert_eq!(m.values().unwrap().len(), 1);
    }

    #[test]
    fn read_before_finalize_fails() {
        let m = measure(MeasureKind::Count, 1, 1);
        let err = m.value("num_shown").unwrap_err();
        assert!(matches!(err, EvalError::NotFinalized { .. }));
        assert!(m.values().is_err());
    }

    #[test]
    fn update_after_finalize_fails() {
        let mut m = measure(MeasureKind::Gain, 0, 0);
        m.finalize().unwrap();
        let err = m.update(&event(0, Action::NotShown)).unwrap_err();
        assert!(matches!(err, EvalError::UpdateAfterFinalize { .. }));
    }

    #[test]
    fn finalize_twice_fails() {
        let mut m = measure(MeasureKind::Area, 0, 0);
        m.finalize().unwrap();
        assert!(matches!(
            m.finalize().unwrap_err(),
            EvalError::AlreadyFinalized { .. }
        ));
    }

    #[test]
    fn too_many_and_too_few_updates_fail() {
        let mut m = measure(MeasureKind::Cost, 1, 1);
        m.update(&event(1, Action::NoFeedback)).unwrap();
        assert!(matches!(
            m.update(&event(0, Action::NoFeedback)).unwrap_err(),
            EvalError::TooManyUpdates { expected: 1, .. }
        ));

        let mut short = measure(MeasureKind::Loss, 3, 1);
        short.update(&event(1, Action::NoFeedback)).unwrap();
        assert!(matches!(
            short.finalize().unwrap_err(),
            EvalError::IncompleteStream {
                expected: 3,
                received: 1,
                ..
            }
        ));
    }

    #[test]
    fn explicit_ranks_must_be_consecutive() {
        let mut m = measure(MeasureKind::Count, 3, 1);
        let mut first = event(1, Action::NoFeedback);
        first.rank = Some(1);
        m.update(&first).unwrap();
        let mut skipped = event(0, Action::NoFeedback);
        skipped.rank = Some(3);
        assert!(matches!(
            m.update(&skipped).unwrap_err(),
            EvalError::OutOfOrder {
                expected: 2,
                got: 3,
                ..
            }
        ));
    }

    #[test]
    fn unknown_field_is_reported() {
        let mut m = measure(MeasureKind::Description, 0, 0);
        m.finalize().unwrap();
        assert!(matches!(
            m.value("ap").unwrap_err(),
            EvalError::UnknownField(_)
        ));
    }

    #[test]
    fn evaluate_topic_runs_every_kind() {
        let run = TopicRun {
            topic_id: "T1".to_string(),
            num_docs: Some(4),
            num_rels: 2,
            events: vec![
                event(1, Action::NoFeedback),
                event(1, Action::ActiveFeedback),
                event(0, Action::NotShown),
                event(0, Action::NotShown),
            ],
        };
        let measures = evaluate_topic(&run, &MeasureKind::ALL, &Config::default()).unwrap();
        assert_eq!(measures.len(), MeasureKind::ALL.len());
        assert!(measures.iter().all(TopicMeasure::is_finalized));
        let gain = measures
            .iter()
            .find(|m| m.kind() == MeasureKind::Gain)
            .unwrap();
        assert_eq!(gain.value("threshold").unwrap(), FieldValue::Int(3));
    }

    #[test]
    fn repeated_kinds_are_computed_once() {
        assert_eq!(
            unique_kinds(&[MeasureKind::Gain, MeasureKind::Count, MeasureKind::Gain]),
            vec![MeasureKind::Gain, MeasureKind::Count]
        );

        let run = TopicRun {
            topic_id: "T1".to_string(),
            num_docs: None,
            num_rels: 1,
            events: vec![event(1, Action::NoFeedback), event(0, Action::ActiveFeedback)],
        };
        let measures = evaluate_topic(
            &run,
            &[MeasureKind::Count, MeasureKind::Count],
            &Config::default(),
        )
        .unwrap();
        assert_eq!(measures.len(), 1);

        let mut aggregator = Aggregator::new();
        for m in &measures {
            aggregator.add(m).unwrap();
        }
        let fields = aggregator.finish();
        let shown = fields.iter().find(|f| f.name == "num_shown").unwrap();
        assert_eq!(shown.value, FieldValue::Int(2));
    }

    #[test]
    fn evaluate_topic_rejects_length_mismatch() {
        let run = TopicRun {
            topic_id: "T1".to_string(),
            num_docs: Some(3),
            num_rels: 1,
            events: vec![event(1, Action::NoFeedback)],
        };
        let err = evaluate_topic(&run, &[MeasureKind::Map], &Config::default()).unwrap_err();
        assert!(err.is_contract_violation());
    }
}

//! Incremental evaluation measures for interactive retrieval runs.
//!
//! Every measure consumes one [`JudgmentEvent`] per rank, in rank order, and is
//! finalized once after the last rank. Which fields it exposes, and how they
//! combine across topics, is declared by its [`Manifest`].

pub mod area;
pub mod cost;
pub mod count;
pub mod description;
pub mod gain;
pub mod loss;
pub mod map;
pub mod tally;

pub use area::AreaBasedMeasures;
pub use cost::CostBasedMeasure;
pub use count::CountBasedMeasures;
pub use description::DescriptionMeasures;
pub use gain::GainBasedMeasures;
pub use loss::LossBasedMeasures;
pub use map::MapBasedMeasures;
pub use tally::RankTally;

use crate::config::Config;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Simulated-user behaviour at a rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Document withheld from the reviewer.
    #[serde(rename = "NS")]
    NotShown,
    /// Shown, no feedback elicited.
    #[serde(rename = "NF")]
    NoFeedback,
    /// Shown, active feedback elicited.
    #[serde(rename = "AF")]
    ActiveFeedback,
}

impl Action {
    pub fn is_shown(self) -> bool {
        self != Action::NotShown
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NS" => Ok(Action::NotShown),
            "NF" => Ok(Action::NoFeedback),
            "AF" => Ok(Action::ActiveFeedback),
            other => Err(format!("unknown action code: {}", other)),
        }
    }
}

/// Relevance codes 1 and 2: relevant and retrieved by the original system.
/// 3 (absolutely relevant, not retrieved) and 4 (relevant, not retrieved) earn nothing.
pub fn is_retrieved_relevant(code: i32) -> bool {
    code > 0 && code < 3
}

/// One rank position of a topic's stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgmentEvent {
    /// Optional explicit 1-based rank, checked against delivery order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
    /// Graded relevance: -1 unjudged, 0 non-relevant, 1-2 relevant, 3-4 relevant not retrieved.
    pub judgment: i32,
    /// Gain code, same domain as `judgment`.
    pub value: i32,
    pub action: Action,
}

impl JudgmentEvent {
    pub fn new(judgment: i32, value: i32, action: Action) -> Self {
        Self {
            rank: None,
            judgment,
            value,
            action,
        }
    }
}

/// Immutable per-topic context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub topic_id: String,
    pub num_docs: usize,
    pub num_rels: usize,
}

impl Topic {
    pub fn new(topic_id: impl Into<String>, num_docs: usize, num_rels: usize) -> Self {
        Self {
            topic_id: topic_id.into(),
            num_docs,
            num_rels,
        }
    }

    /// Topics where normalisation by `num_rels` or `num_docs` needs a fallback.
    pub fn is_degenerate(&self) -> bool {
        self.num_rels == 0 || self.num_docs == 0
    }
}

/// How a field combines across topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggRule {
    Sum,
    Mean,
    /// Fixed-length sequence combined point-wise.
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestEntry {
    pub name: &'static str,
    pub rule: AggRule,
}

pub type Manifest = &'static [ManifestEntry];

pub(crate) const fn field(name: &'static str, rule: AggRule) -> ManifestEntry {
    ManifestEntry { name, rule }
}

/// Length of every `LIST` field: one value per decile, 0% through 100%.
pub const DECILES: usize = 11;

/// A finalized output value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    List(Vec<f64>),
    Text(String),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<usize> for FieldValue {
    fn from(v: usize) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

/// The incremental interface every measure implements.
///
/// Implementations assume the caller honours the stream contract (exactly
/// `num_docs` updates in rank order, then one `finalize`); the checked
/// wrapper is [`crate::eval::TopicMeasure`].
pub trait EvalMeasure {
    fn update(&mut self, event: &JudgmentEvent);

    /// Divisions and normalisation happen here and nowhere else.
    fn finalize(&mut self);

    fn manifest(&self) -> Manifest;

    /// Value of a manifest field; `None` if the name is not in the manifest.
    fn value(&self, field: &str) -> Option<FieldValue>;
}

/// The closed set of measure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureKind {
    Description,
    Count,
    Map,
    Gain,
    Area,
    Cost,
    Loss,
}

impl MeasureKind {
    pub const ALL: [MeasureKind; 7] = [
        MeasureKind::Description,
        MeasureKind::Count,
        MeasureKind::Map,
        MeasureKind::Gain,
        MeasureKind::Area,
        MeasureKind::Cost,
        MeasureKind::Loss,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MeasureKind::Description => "description",
            MeasureKind::Count => "count",
            MeasureKind::Map => "map",
            MeasureKind::Gain => "gain",
            MeasureKind::Area => "area",
            MeasureKind::Cost => "cost",
            MeasureKind::Loss => "loss",
        }
    }
}

impl fmt::Display for MeasureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeasureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        MeasureKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == lower)
            .ok_or_else(|| {
                let known: Vec<&str> = MeasureKind::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown measure '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// One measure state, dispatched uniformly over the kinds.
#[derive(Debug, Clone)]
pub enum Measure {
    Description(DescriptionMeasures),
    Count(CountBasedMeasures),
    Map(MapBasedMeasures),
    Gain(GainBasedMeasures),
    Area(AreaBasedMeasures),
    Cost(CostBasedMeasure),
    Loss(LossBasedMeasures),
}

impl Measure {
    pub fn new(kind: MeasureKind, topic: &Topic, config: &Config) -> Self {
        match kind {
            MeasureKind::Description => Measure::Description(DescriptionMeasures::new(topic)),
            MeasureKind::Count => Measure::Count(CountBasedMeasures::new(topic)),
            MeasureKind::Map => Measure::Map(MapBasedMeasures::new(topic)),
            MeasureKind::Gain => Measure::Gain(GainBasedMeasures::new(topic)),
            MeasureKind::Area => Measure::Area(AreaBasedMeasures::new(topic)),
            MeasureKind::Cost => Measure::Cost(CostBasedMeasure::new(topic, config.cost.clone())),
            MeasureKind::Loss => {
                Measure::Loss(LossBasedMeasures::new(topic, config.loss.smoothing))
            }
        }
    }

    pub fn kind(&self) -> MeasureKind {
        match self {
            Measure::Description(_) => MeasureKind::Description,
            Measure::Count(_) => MeasureKind::Count,
            Measure::Map(_) => MeasureKind::Map,
            Measure::Gain(_) => MeasureKind::Gain,
            Measure::Area(_) => MeasureKind::Area,
            Measure::Cost(_) => MeasureKind::Cost,
            Measure::Loss(_) => MeasureKind::Loss,
        }
    }

    fn inner(&self) -> &dyn EvalMeasure {
        match self {
            Measure::Description(m) => m,
            Measure::Count(m) => m,
            Measure::Map(m) => m,
            Measure::Gain(m) => m,
            Measure::Area(m) => m,
            Measure::Cost(m) => m,
            Measure::Loss(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn EvalMeasure {
        match self {
            Measure::Description(m) => m,
            Measure::Count(m) => m,
            Measure::Map(m) => m,
            Measure::Gain(m) => m,
            Measure::Area(m) => m,
            Measure::Cost(m) => m,
            Measure::Loss(m) => m,
        }
    }
}

impl EvalMeasure for Measure {
    fn update(&mut self, event: &JudgmentEvent) {
        self.inner_mut().update(event)
    }

    fn finalize(&mut self) {
        self.inner_mut().finalize()
    }

    fn manifest(&self) -> Manifest {
        self.inner().manifest()
    }

    fn value(&self, field: &str) -> Option<FieldValue> {
        self.inner().value(field)
    }
}

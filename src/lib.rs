pub mod config;
pub mod error;
pub mod eval;
pub mod measures;

pub use config::Config;
pub use error::{EvalError, Result};
pub use eval::{evaluate_topic, Aggregator, TopicMeasure, TopicRun};
pub use measures::{Action, AggRule, EvalMeasure, FieldValue, JudgmentEvent, MeasureKind, Topic};

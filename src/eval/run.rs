//! Run file input: one entry per topic with its ranked judgment stream.
//!
//! ```json
//! [
//!   {
//!     "topic_id": "CD008054",
//!     "num_docs": 3,
//!     "num_rels": 2,
//!     "events": [
//!       { "rank": 1, "judgment": 1, "value": 1, "action": "AF" },
//!       { "judgment": 0, "value": 0, "action": "NF" },
//!       { "judgment": 1, "value": 1, "action": "NS" }
//!     ]
//!   }
//! ]
//! ```

use crate::error::{EvalError, Result};
use crate::measures::{JudgmentEvent, Topic};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// One topic's ranked stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRun {
    pub topic_id: String,
    /// Number of ranked positions; defaults to the number of events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_docs: Option<usize>,
    /// Known relevant documents for the topic (ground truth).
    pub num_rels: usize,
    #[serde(default)]
    pub events: Vec<JudgmentEvent>,
}

impl TopicRun {
    pub fn topic(&self) -> Topic {
        Topic::new(
            self.topic_id.clone(),
            self.num_docs.unwrap_or(self.events.len()),
            self.num_rels,
        )
    }
}

/// Parse and validate run JSON.
///
/// A declared `num_docs` that disagrees with the event count is left for the
/// measure lifecycle to reject, so the error names the contract it breaks.
pub fn parse_runs(json: &str) -> Result<Vec<TopicRun>> {
    let runs: Vec<TopicRun> = serde_json::from_str(json)?;
    validate_runs(&runs)?;
    Ok(runs)
}

fn validate_runs(runs: &[TopicRun]) -> Result<()> {
    let mut seen = HashSet::new();
    for run in runs {
        if run.topic_id.trim().is_empty() {
            return Err(EvalError::InvalidInput("empty topic_id".to_string()));
        }
        if !seen.insert(run.topic_id.as_str()) {
            return Err(EvalError::InvalidInput(format!(
                "duplicate topic_id: {}",
                run.topic_id
            )));
        }
    }
    Ok(())
}

/// Read a run file from disk.
pub fn load_runs(path: &Path) -> Result<Vec<TopicRun>> {
    let json = std::fs::read_to_string(path)?;
    let runs = parse_runs(&json)?;
    log::info!("Loaded {} topics from {}", runs.len(), path.display());
    Ok(runs)
}

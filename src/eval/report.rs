//! Text and JSON reporting of finalized scores.
//!
//! Text output is one `<topic> <field> <value>` line per field. Floats are
//! rounded to the configured precision, integers are printed as is, and
//! `LIST` fields expand to one `<field>@<pct>` line per decile.

use super::aggregate::AggregateField;
use super::TopicMeasure;
use crate::error::Result;
use crate::measures::FieldValue;
use serde::Serialize;
use serde_json::{Map, Value};

/// Topic id used for aggregate lines.
pub const AGGREGATE_ID: &str = "all";

fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

fn format_float(value: f64, precision: u32) -> String {
    format!("{:.*}", precision as usize, value)
}

fn push_lines(
    lines: &mut Vec<String>,
    topic_id: &str,
    name: &str,
    value: &FieldValue,
    precision: u32,
) {
    match value {
        FieldValue::Int(v) => lines.push(format!("{} {} {}", topic_id, name, v)),
        FieldValue::Float(v) => {
            lines.push(format!("{} {} {}", topic_id, name, format_float(*v, precision)))
        }
        FieldValue::Text(v) => lines.push(format!("{} {} {}", topic_id, name, v)),
        FieldValue::List(points) => {
            for (i, point) in points.iter().enumerate() {
                lines.push(format!(
                    "{} {}@{} {}",
                    topic_id,
                    name,
                    i * 10,
                    format_float(*point, precision)
                ));
            }
        }
    }
}

/// Text lines for one finalized topic measure.
pub fn format_topic(measure: &TopicMeasure, precision: u32) -> Result<Vec<String>> {
    let topic_id = measure.topic().topic_id.as_str();
    let mut lines = Vec::new();
    for (name, value) in measure.values()? {
        push_lines(&mut lines, topic_id, name, &value, precision);
    }
    Ok(lines)
}

/// Text lines for aggregated fields, under topic id `all`.
pub fn format_aggregate(fields: &[AggregateField], precision: u32) -> Vec<String> {
    let mut lines = Vec::new();
    for field in fields {
        push_lines(&mut lines, AGGREGATE_ID, field.name, &field.value, precision);
    }
    lines
}

fn json_value(value: &FieldValue, precision: u32) -> Value {
    match value {
        FieldValue::Int(v) => Value::from(*v),
        FieldValue::Float(v) => Value::from(round_to(*v, precision)),
        FieldValue::Text(v) => Value::from(v.as_str()),
        FieldValue::List(points) => Value::Array(
            points
                .iter()
                .map(|p| Value::from(round_to(*p, precision)))
                .collect(),
        ),
    }
}

/// Scores for one topic (or the aggregate), keyed by field name.
#[derive(Debug, Clone, Serialize)]
pub struct TopicScores {
    pub topic_id: String,
    pub measures: Map<String, Value>,
}

/// Full JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub topics: Vec<TopicScores>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all: Option<TopicScores>,
    #[serde(skip)]
    precision: u32,
}

impl Report {
    pub fn new(precision: u32) -> Self {
        Self {
            topics: Vec::new(),
            all: None,
            precision,
        }
    }

    /// Add every measure computed for one topic.
    pub fn push_topic(&mut self, topic_id: &str, measures: &[TopicMeasure]) -> Result<()> {
        let mut scores = Map::new();
        for measure in measures {
            for (name, value) in measure.values()? {
                scores.insert(name.to_string(), json_value(&value, self.precision));
            }
        }
        self.topics.push(TopicScores {
            topic_id: topic_id.to_string(),
            measures: scores,
        });
        Ok(())
    }

    pub fn set_aggregate(&mut self, fields: &[AggregateField]) {
        let measures = fields
            .iter()
            .map(|f| (f.name.to_string(), json_value(&f.value, self.precision)))
            .collect();
        self.all = Some(TopicScores {
            topic_id: AGGREGATE_ID.to_string(),
            measures,
        });
    }
}

pub fn to_json(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::eval::{evaluate_topic, Aggregator, TopicRun};
    use crate::measures::{Action, JudgmentEvent, MeasureKind};

    fn sample_run() -> TopicRun {
        TopicRun {
            topic_id: "T1".to_string(),
            num_docs: None,
            num_rels: 3,
            events: [1, 0, 1, 0]
                .iter()
                .map(|&j| JudgmentEvent::new(j, j, Action::NoFeedback))
                .collect(),
        }
    }

    #[test]
    fn floats_are_rounded_and_ints_are_not() {
        let measures = evaluate_topic(
            &sample_run(),
            &[MeasureKind::Count, MeasureKind::Map],
            &Config::default(),
        )
        .unwrap();
        let mut lines = Vec::new();
        for m in &measures {
            lines.extend(format_topic(m, 3).unwrap());
        }
        assert!(lines.contains(&"T1 num_shown 4".to_string()));
        assert!(lines.contains(&"T1 min_req 0.750".to_string()));
        // (1 + 2/3) / 3
        assert!(lines.contains(&"T1 ap 0.556".to_string()));
    }

    #[test]
    fn list_fields_expand_per_decile() {
        let measures =
            evaluate_topic(&sample_run(), &[MeasureKind::Gain], &Config::default()).unwrap();
        let lines = format_topic(&measures[0], 2).unwrap();
        let cgat: Vec<&String> = lines.iter().filter(|l| l.starts_with("T1 cgat@")).collect();
        assert_eq!(cgat.len(), 11);
        assert_eq!(cgat[0], "T1 cgat@0 0.00");
        assert_eq!(cgat[10], "T1 cgat@100 2.00");
    }

    #[test]
    fn aggregate_lines_use_all() {
        let mut aggregator = Aggregator::new();
        let measures =
            evaluate_topic(&sample_run(), &[MeasureKind::Description], &Config::default())
                .unwrap();
        for m in measures {
            aggregator.add(&m).unwrap();
        }
        let lines = format_aggregate(&aggregator.finish(), 3);
        assert_eq!(lines, vec!["all topic_id 1", "all num_docs 4", "all num_rels 3"]);
    }

    #[test]
    fn json_report() {
        let run = sample_run();
        let kinds = [MeasureKind::Map, MeasureKind::Gain];
        let measures = evaluate_topic(&run, &kinds, &Config::default()).unwrap();
        let mut report = Report::new(3);
        report.push_topic(&run.topic_id, &measures).unwrap();
        let mut aggregator = Aggregator::new();
        for m in &measures {
            aggregator.add(m).unwrap();
        }
        report.set_aggregate(&aggregator.finish());

        let value: Value = serde_json::from_str(&to_json(&report).unwrap()).unwrap();
        assert_eq!(value["topics"][0]["topic_id"], "T1");
        assert_eq!(value["topics"][0]["measures"]["ap"], 0.556);
        assert_eq!(value["topics"][0]["measures"]["total_cg"], 2);
        assert_eq!(value["topics"][0]["measures"]["cgat"].as_array().unwrap().len(), 11);
        assert_eq!(value["all"]["topic_id"], "all");
        assert!(value.get("precision").is_none());
    }
}

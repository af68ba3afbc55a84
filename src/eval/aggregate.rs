//! Cross-topic aggregation driven by each measure's manifest.

use super::TopicMeasure;
use crate::error::Result;
use crate::measures::{AggRule, FieldValue, MeasureKind, DECILES};
use std::collections::HashMap;

/// One aggregated field.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateField {
    pub kind: MeasureKind,
    pub name: &'static str,
    pub rule: AggRule,
    pub value: FieldValue,
}

#[derive(Debug, Clone)]
struct Column {
    kind: MeasureKind,
    name: &'static str,
    rule: AggRule,
    values: Vec<FieldValue>,
}

/// Collects finalized per-topic values and combines them per field.
///
/// `SUM` keeps integers as integers and counts text fields (so `topic_id`
/// sums to the number of topics); `MEAN` averages over the topics that
/// reported the field; `LIST` averages point-wise.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    columns: Vec<Column>,
    index: HashMap<(MeasureKind, &'static str), usize>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, measure: &TopicMeasure) -> Result<()> {
        let kind = measure.kind();
        for entry in measure.manifest() {
            let value = measure.value(entry.name)?;
            let slot = match self.index.get(&(kind, entry.name)) {
                Some(&slot) => slot,
                None => {
                    self.columns.push(Column {
                        kind,
                        name: entry.name,
                        rule: entry.rule,
                        values: Vec::new(),
                    });
                    let slot = self.columns.len() - 1;
                    self.index.insert((kind, entry.name), slot);
                    slot
                }
            };
            self.columns[slot].values.push(value);
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Aggregated fields in the order they were first seen.
    pub fn finish(self) -> Vec<AggregateField> {
        self.columns
            .into_iter()
            .map(|column| {
                let value = match column.rule {
                    AggRule::Sum => sum(&column.values),
                    AggRule::Mean => FieldValue::Float(mean(&column.values)),
                    AggRule::List => FieldValue::List(pointwise_mean(&column.values)),
                };
                AggregateField {
                    kind: column.kind,
                    name: column.name,
                    rule: column.rule,
                    value,
                }
            })
            .collect()
    }
}

fn sum(values: &[FieldValue]) -> FieldValue {
    if values.iter().all(|v| matches!(v, FieldValue::Int(_))) {
        let total = values
            .iter()
            .map(|v| match v {
                FieldValue::Int(i) => *i,
                _ => 0,
            })
            .sum();
        return FieldValue::Int(total);
    }
    if values.iter().all(|v| matches!(v, FieldValue::Text(_))) {
        return FieldValue::Int(values.len() as i64);
    }
    FieldValue::Float(values.iter().filter_map(FieldValue::as_f64).sum())
}

fn mean(values: &[FieldValue]) -> f64 {
    let numbers: Vec<f64> = values.iter().filter_map(FieldValue::as_f64).collect();
    if numbers.is_empty() {
        return 0.0;
    }
    numbers.iter().sum::<f64>() / numbers.len() as f64
}

fn pointwise_mean(values: &[FieldValue]) -> Vec<f64> {
    let mut totals = vec![0.0; DECILES];
    let mut count = 0usize;
    for value in values {
        if let FieldValue::List(points) = value {
            for (total, point) in totals.iter_mut().zip(points) {
                *total += point;
            }
            count += 1;
        }
    }
    if count > 0 {
        for total in &mut totals {
            *total /= count as f64;
        }
    }
    totals
}

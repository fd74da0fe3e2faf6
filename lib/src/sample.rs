use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A timestamped record whose numeric fields can be looked up by name.
///
/// Samplers only ever read through this trait, so callers can downsample
/// their own row types without first converting them into [`Sample`].
pub trait Point {
    type Timestamp: Ord;

    fn timestamp(&self) -> &Self::Timestamp;

    /// Raw field lookup. `None` means the field is absent or null.
    fn field(&self, key: &str) -> Option<f64>;

    /// The field value if it is usable for arithmetic, i.e. present and not NaN.
    fn value(&self, key: &str) -> Option<f64> {
        self.field(key).filter(|v| !v.is_nan())
    }
}

// Sample is a single data point: a timestamp plus named numeric fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample<T> {
    pub timestamp: T,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Option<f64>>,
}

impl<T> Sample<T> {
    pub fn new(timestamp: T) -> Self {
        Sample {
            timestamp,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter. Pass `None` to record an explicit null.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Option<f64>>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

impl<T: Ord> Point for Sample<T> {
    type Timestamp = T;

    fn timestamp(&self) -> &T {
        &self.timestamp
    }

    fn field(&self, key: &str) -> Option<f64> {
        self.fields.get(key).copied().flatten()
    }
}

/// One series of a multi-series set, e.g. the same metric from one dataset tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSeries<S> {
    pub label: String,
    pub series: Vec<S>,
}

impl<S> LabeledSeries<S> {
    pub fn new(label: impl Into<String>, series: Vec<S>) -> Self {
        LabeledSeries {
            label: label.into(),
            series,
        }
    }
}

/// The reduced form of a [`LabeledSeries`], borrowing its samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Downsampled<'a, S> {
    pub label: &'a str,
    pub series: Vec<&'a S>,
}

impl<'a, S> Downsampled<'a, S> {
    pub(crate) fn unchanged(labeled: &'a LabeledSeries<S>) -> Self {
        Downsampled {
            label: &labeled.label,
            series: labeled.series.iter().collect(),
        }
    }

    pub(crate) fn pick(labeled: &'a LabeledSeries<S>, indices: &[usize]) -> Self {
        Downsampled {
            label: &labeled.label,
            series: indices.iter().map(|&i| &labeled.series[i]).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_nan_are_not_values() {
        let s = Sample::new(0)
            .with("a", 1.5)
            .with("b", None)
            .with("c", f64::NAN);
        assert_eq!(s.value("a"), Some(1.5));
        assert_eq!(s.value("b"), None);
        assert_eq!(s.value("c"), None);
        assert_eq!(s.value("missing"), None);
        assert!(s.field("c").is_some_and(f64::is_nan));
    }

    #[test]
    fn fields_flatten_in_json() {
        let s = Sample::new(42).with("value", 3.0).with("gap", None);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"{"timestamp":42,"gap":null,"value":3.0}"#);

        let back: Sample<i64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}

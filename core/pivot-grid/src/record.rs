//! FILENAME: core/pivot-grid/src/record.rs
//! Source records: the flat table the pivot is computed from.
//!
//! A record maps field names to raw scalars. The schema is whatever the
//! first record carries; the engine never copies records, it only reads
//! them for the duration of one aggregation call.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A raw scalar from the source table.
/// Deserializes from plain JSON values (`null`, numbers, strings, booleans).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
}

/// One row of the source table.
pub type Record = FxHashMap<String, RecordValue>;

impl RecordValue {
    /// The text used for this value inside a composite key.
    /// Empty values become an empty segment.
    pub fn segment(&self) -> String {
        match self {
            RecordValue::Empty => String::new(),
            RecordValue::Number(n) => n.to_string(),
            RecordValue::Text(s) => s.clone(),
            RecordValue::Boolean(b) => b.to_string(),
        }
    }

    /// Numeric reading of the value, `None` when it is not a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RecordValue::Empty => None,
            RecordValue::Number(n) => Some(*n).filter(|n| !n.is_nan()),
            RecordValue::Text(s) => parse_number(s),
            RecordValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
        }
    }
}

impl From<f64> for RecordValue {
    fn from(value: f64) -> Self {
        RecordValue::Number(value)
    }
}

impl From<i64> for RecordValue {
    fn from(value: i64) -> Self {
        RecordValue::Number(value as f64)
    }
}

impl From<i32> for RecordValue {
    fn from(value: i32) -> Self {
        RecordValue::Number(f64::from(value))
    }
}

impl From<&str> for RecordValue {
    fn from(value: &str) -> Self {
        RecordValue::Text(value.to_string())
    }
}

impl From<String> for RecordValue {
    fn from(value: String) -> Self {
        RecordValue::Text(value)
    }
}

impl From<bool> for RecordValue {
    fn from(value: bool) -> Self {
        RecordValue::Boolean(value)
    }
}

impl<T: Into<RecordValue>> From<Option<T>> for RecordValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(RecordValue::Empty, Into::into)
    }
}

/// Builds a record from `(field, value)` pairs.
pub fn record<I, K, V>(pairs: I) -> Record
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<RecordValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Parses text as a number. Blank text, NaN and infinities are rejected.
/// Blank text is deliberately not read as 0, so blanks are skipped by
/// value fields and sort as text in keys.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Returns the selected fields that the sample record does not carry,
/// in selection order and without duplicates.
pub fn missing_fields<'a>(
    sample: &Record,
    fields: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for field in fields {
        if !sample.contains_key(field) && !missing.iter().any(|m| m == field) {
            missing.push(field.to_string());
        }
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_forms() {
        assert_eq!(RecordValue::Empty.segment(), "");
        assert_eq!(RecordValue::Number(30.0).segment(), "30");
        assert_eq!(RecordValue::Number(2.5).segment(), "2.5");
        assert_eq!(RecordValue::from("Eng").segment(), "Eng");
        assert_eq!(RecordValue::Boolean(true).segment(), "true");
    }

    #[test]
    fn test_numeric_reading() {
        assert_eq!(RecordValue::from(" 12.5 ").as_number(), Some(12.5));
        assert_eq!(RecordValue::from("abc").as_number(), None);
        assert_eq!(RecordValue::from("").as_number(), None);
        assert_eq!(RecordValue::from("NaN").as_number(), None);
        assert_eq!(RecordValue::Empty.as_number(), None);
        assert_eq!(RecordValue::Number(f64::NAN).as_number(), None);
        assert_eq!(RecordValue::Boolean(true).as_number(), Some(1.0));
    }

    #[test]
    fn test_missing_fields_deduplicated() {
        let sample = record([("dept", "X"), ("role", "Eng")]);
        let missing = missing_fields(&sample, ["dept", "region", "sales", "region"]);
        assert_eq!(missing, vec!["region".to_string(), "sales".to_string()]);
    }

    #[test]
    fn test_deserialize_from_json() {
        let rows: Vec<Record> =
            serde_json::from_str(r#"[{"dept":"X","sales":10,"note":null,"ok":true}]"#).unwrap();
        assert_eq!(rows[0]["dept"], RecordValue::Text("X".into()));
        assert_eq!(rows[0]["sales"], RecordValue::Number(10.0));
        assert_eq!(rows[0]["note"], RecordValue::Empty);
        assert_eq!(rows[0]["ok"], RecordValue::Boolean(true));
    }
}

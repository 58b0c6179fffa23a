//! FILENAME: core/pivot-grid/src/key.rs
//! Composite group keys.
//!
//! A composite key is the ordered tuple of a record's values for one axis.
//! Keys are kept structured (one owned string per segment) so a value that
//! happens to contain the delimiter can never split into two segments. The
//! delimited string form exists only for collaborators that need a flat
//! representation, and encoding rejects values it could not round-trip.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{PivotError, Result};
use crate::record::{parse_number, Record};

/// Reserved separator used by the string form of a key (ASCII Unit Separator).
pub const KEY_DELIMITER: char = '\u{1F}';

/// Ordered field values for one axis of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompositeKey {
    segments: SmallVec<[String; 4]>,
}

impl CompositeKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CompositeKey {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Reads `fields` from `record` in order. Absent fields give empty segments.
    pub fn from_record(record: &Record, fields: &[String]) -> Self {
        CompositeKey {
            segments: fields
                .iter()
                .map(|f| record.get(f).map(|v| v.segment()).unwrap_or_default())
                .collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn segment(&self, level: usize) -> Option<&str> {
        self.segments.get(level).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The first `len` segments (all of them if the key is shorter).
    pub fn prefix(&self, len: usize) -> &[String] {
        &self.segments[..len.min(self.segments.len())]
    }

    /// True when this key starts with `prefix`.
    pub fn has_prefix(&self, prefix: &[String]) -> bool {
        self.segments.starts_with(prefix)
    }

    /// Joins the segments with [`KEY_DELIMITER`].
    pub fn encode(&self) -> Result<String> {
        if let Some(bad) = self.segments.iter().find(|s| s.contains(KEY_DELIMITER)) {
            return Err(PivotError::DelimiterInValue { value: bad.clone() });
        }
        let mut out = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push(KEY_DELIMITER);
            }
            out.push_str(segment);
        }
        Ok(out)
    }

    /// Splits a string produced by [`CompositeKey::encode`].
    pub fn decode(text: &str) -> Self {
        CompositeKey::new(text.split(KEY_DELIMITER))
    }

    /// Human-readable form, blank segments replaced by `blank_label`.
    pub fn display(&self, blank_label: &str, separator: &str) -> String {
        self.segments
            .iter()
            .map(|s| display_segment(s, blank_label))
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display("(blank)", " / "))
    }
}

impl Ord for CompositeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_keys(&self.segments, &other.segments)
    }
}

impl PartialOrd for CompositeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Label shown for a key segment.
pub fn display_segment<'a>(segment: &'a str, blank_label: &'a str) -> &'a str {
    if segment.is_empty() {
        blank_label
    } else {
        segment
    }
}

/// Segment-wise key order: the first differing segment decides, and a key
/// that runs out of segments first sorts first.
pub fn compare_keys(a: &[String], b: &[String]) -> Ordering {
    for (sa, sb) in a.iter().zip(b.iter()) {
        let ord = compare_segments(sa, sb);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

/// Two numeric segments compare by value, two text segments by code point.
/// A numeric segment sorts before a text one even where code-point order
/// would put the text first (`"(none)"` after `"5"`); comparing mixed pairs
/// by code point would make the order intransitive. Equal numbers written
/// differently ("1" and "1.0") fall back to code-point order.
pub fn compare_segments(a: &str, b: &str) -> Ordering {
    match (parse_number(a), parse_number(b)) {
        (Some(na), Some(nb)) => na
            .partial_cmp(&nb)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

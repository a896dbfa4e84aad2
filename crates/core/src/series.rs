//! Label segmentation and shared input guards.
//!
//! A label sequence partitions the timeline into alternating anomaly and
//! normal segments. The segmentation is driven by a two-state machine seeded
//! from the first label and flipped at every value change, so the final
//! segment goes through the same transition as every other one.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};

/// Whether a segment is a ground-truth anomaly or normal operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    Anomaly,
    Normal,
}

impl SegmentKind {
    pub fn from_label(label: u8) -> Self {
        if label == 1 {
            SegmentKind::Anomaly
        } else {
            SegmentKind::Normal
        }
    }

    /// The state entered when crossing a label boundary.
    pub fn flip(self) -> Self {
        match self {
            SegmentKind::Anomaly => SegmentKind::Normal,
            SegmentKind::Normal => SegmentKind::Anomaly,
        }
    }

    pub fn is_anomaly(self) -> bool {
        self == SegmentKind::Anomaly
    }
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentKind::Anomaly => write!(f, "anomaly"),
            SegmentKind::Normal => write!(f, "normal"),
        }
    }
}

/// A maximal run of constant label value, covering `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    pub kind: SegmentKind,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Detection-credit tolerance around the start of an anomaly segment.
///
/// `advance` steps of early credit and `delay` steps of late credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToleranceWindow {
    pub advance: usize,
    pub delay: usize,
}

impl ToleranceWindow {
    pub const fn new(advance: usize, delay: usize) -> Self {
        Self { advance, delay }
    }

    /// Index range inspected for a hit on `segment`.
    ///
    /// Clamped to 0 below and to the segment's own end above, so it never
    /// reaches into the following segment.
    pub fn credit_range(&self, segment: &Segment) -> Range<usize> {
        let lo = segment.start.saturating_sub(self.advance);
        let hi = segment
            .start
            .saturating_add(self.delay)
            .saturating_add(1)
            .min(segment.end);
        lo..hi
    }
}

impl Default for ToleranceWindow {
    fn default() -> Self {
        Self::new(1, 7)
    }
}

/// Iterator over the segments of a label sequence.
///
/// Produced by [`segments`]. Yields segments in order; together they tile
/// `[0, labels.len())` exactly.
pub struct Segments<'a> {
    labels: &'a [u8],
    pos: usize,
    state: SegmentKind,
}

impl Iterator for Segments<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        if self.pos >= self.labels.len() {
            return None;
        }

        let start = self.pos;
        let value = self.labels[start];
        let end = self.labels[start..]
            .iter()
            .position(|&l| l != value)
            .map_or(self.labels.len(), |offset| start + offset);

        let segment = Segment {
            start,
            end,
            kind: self.state,
        };
        self.state = self.state.flip();
        self.pos = end;
        Some(segment)
    }
}

/// Split `labels` into alternating segments.
///
/// Labels are expected to be validated with [`ensure_binary_labels`] first;
/// the kind of every segment after the first is derived by alternation.
pub fn segments(labels: &[u8]) -> Segments<'_> {
    let state = labels
        .first()
        .map_or(SegmentKind::Normal, |&l| SegmentKind::from_label(l));
    Segments {
        labels,
        pos: 0,
        state,
    }
}

pub fn ensure_same_length(
    left: &'static str,
    left_len: usize,
    right: &'static str,
    right_len: usize,
) -> Result<()> {
    if left_len != right_len {
        return Err(EvalError::LengthMismatch {
            left,
            left_len,
            right,
            right_len,
        });
    }
    Ok(())
}

pub fn ensure_non_empty<T>(what: &'static str, values: &[T]) -> Result<()> {
    if values.is_empty() {
        return Err(EvalError::EmptyInput { what });
    }
    Ok(())
}

pub fn ensure_binary_labels(labels: &[u8]) -> Result<()> {
    match labels.iter().position(|&l| l > 1) {
        Some(index) => Err(EvalError::InvalidLabel {
            index,
            value: labels[index],
        }),
        None => Ok(()),
    }
}

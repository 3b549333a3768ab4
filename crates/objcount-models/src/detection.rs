//! Detection records and label aggregation.
//!
//! The model runtime returns one [`Detection`] per object it found. Only
//! detections scoring strictly above [`CONFIDENCE_THRESHOLD`] are counted.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Minimum score (exclusive) for a detection to be counted.
pub const CONFIDENCE_THRESHOLD: f64 = 0.85;

/// Pixel-space bounding box of a detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

/// A single object detected by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Detection {
    /// Category name (e.g. "cat")
    pub label: String,
    /// Confidence in [0, 1]
    pub score: f64,
    /// Region of the object. Not used for counting.
    #[serde(rename = "box", default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

impl Detection {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
            bbox: None,
        }
    }

    /// Whether this detection clears the confidence threshold.
    pub fn is_confident(&self) -> bool {
        self.score > CONFIDENCE_THRESHOLD
    }
}

/// Occurrence count per label.
///
/// Serializes as a plain JSON object (`{"cat": 2, "dog": 1}`). Entry order
/// carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct LabelCounts(BTreeMap<String, u32>);

impl LabelCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the count for a label, starting from zero.
    pub fn increment(&mut self, label: &str) {
        *self.0.entry(label.to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, label: &str) -> Option<u32> {
        self.0.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of counted detections across all labels.
    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }
}

/// Aggregate detections into per-label counts, keeping only those above
/// [`CONFIDENCE_THRESHOLD`].
pub fn count_labels<'a, I>(detections: I) -> LabelCounts
where
    I: IntoIterator<Item = &'a Detection>,
{
    let mut counts = LabelCounts::new();
    for detection in detections.into_iter().filter(|d| d.is_confident()) {
        counts.increment(&detection.label);
    }
    counts
}

//! Lookup catalogs: entry types and emotions.
//!
//! Both are global reference data. Rows are inserted by
//! [`crate::bootstrap::bootstrap`] and are read-only afterwards.

use serde::{Deserialize, Serialize};

/// Category of an entry, e.g. "Gratitude".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryType {
  pub id:   i64,
  #[serde(rename = "typeName")]
  pub name: String,
}

/// A tag from the fixed emotion catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emotion {
  pub id:   i64,
  #[serde(rename = "emotionName")]
  pub name: String,
}

/// Entry types present on a fresh install, in catalog (id) order.
pub const DEFAULT_ENTRY_TYPES: &[&str] =
  &["Memory", "Letting Go", "Gratitude", "Reflection", "Inspiration"];

/// Emotions present on a fresh install, in catalog (id) order.
pub const DEFAULT_EMOTIONS: &[&str] = &[
  "Happy",
  "Sad",
  "Angry",
  "Peaceful",
  "Grateful",
  "Anxious",
  "Hopeful",
  "Overwhelmed",
  "Loved",
  "Lonely",
];

//! Journal entries and their emotion associations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  catalog::{Emotion, EntryType},
  de::null_as_default,
};

// ─── Entry ───────────────────────────────────────────────────────────────────

/// A fully hydrated entry: type and emotion names resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
  pub id:         i64,
  /// Set at creation; never reassigned.
  pub owner_id:   Uuid,
  pub title:      String,
  pub content:    String,
  pub recipient:  String,
  pub entry_type: EntryType,
  /// In association order, which is the de-duplicated input order.
  pub emotions:   Vec<Emotion>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// Client payload for creating or fully replacing an entry.
///
/// Every field defaults, and `null` reads as the default, so that a missing
/// field surfaces as a validation error rather than a deserialisation
/// failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryInput {
  #[serde(deserialize_with = "null_as_default")]
  pub title:         String,
  #[serde(deserialize_with = "null_as_default")]
  pub content:       String,
  #[serde(deserialize_with = "null_as_default")]
  pub recipient:     String,
  #[serde(deserialize_with = "null_as_default")]
  pub entry_type_id: i64,
  #[serde(deserialize_with = "null_as_default")]
  pub emotion_ids:   Vec<i64>,
}

/// An [`EntryInput`] that passed validation. Emotion ids are distinct and
/// keep the order of their first occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
  pub title:         String,
  pub content:       String,
  pub recipient:     String,
  pub entry_type_id: i64,
  pub emotion_ids:   Vec<i64>,
}

const REQUIRED_FIELDS: &str =
  "title, content and entry type are required, including at least one emotion";

impl EntryInput {
  /// Check required fields and collapse duplicate emotion ids.
  ///
  /// Does not check that referenced ids exist; that needs the store.
  pub fn validate(self) -> Result<EntryDraft> {
    if self.title.trim().is_empty()
      || self.content.trim().is_empty()
      || self.entry_type_id <= 0
      || self.emotion_ids.is_empty()
    {
      return Err(Error::Validation(REQUIRED_FIELDS.to_owned()));
    }

    if let Some(bad) = self.emotion_ids.iter().find(|id| **id <= 0) {
      return Err(Error::Validation(format!("invalid emotion id: {bad}")));
    }

    let mut emotion_ids = Vec::with_capacity(self.emotion_ids.len());
    for id in self.emotion_ids {
      if !emotion_ids.contains(&id) {
        emotion_ids.push(id);
      }
    }

    Ok(EntryDraft {
      title: self.title,
      content: self.content,
      recipient: self.recipient,
      entry_type_id: self.entry_type_id,
      emotion_ids,
    })
  }
}

//! Pagination and aggregation types.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Pagination ──────────────────────────────────────────────────────────────

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Larger requested page sizes are clamped to this value.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  page:      u32,
  page_size: u32,
}

impl PageRequest {
  /// Rejects `page < 1` and `page_size < 1`; clamps `page_size` to
  /// [`MAX_PAGE_SIZE`].
  pub fn new(page: i64, page_size: i64) -> Result<Self> {
    if page < 1 {
      return Err(Error::Validation("page must be at least 1".to_owned()));
    }
    if page_size < 1 {
      return Err(Error::Validation("pageSize must be at least 1".to_owned()));
    }
    let page = u32::try_from(page)
      .map_err(|_| Error::Validation("page is too large".to_owned()))?;
    let page_size = page_size.min(i64::from(MAX_PAGE_SIZE)) as u32;
    Ok(Self { page, page_size })
  }

  pub fn page(&self) -> u32 { self.page }

  pub fn page_size(&self) -> u32 { self.page_size }

  /// Number of rows to skip.
  pub fn offset(&self) -> u64 {
    u64::from(self.page - 1) * u64::from(self.page_size)
  }
}

impl Default for PageRequest {
  fn default() -> Self { Self { page: 1, page_size: DEFAULT_PAGE_SIZE } }
}

/// One page of results plus the figures needed to page through the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
  pub data:        Vec<T>,
  pub page:        u32,
  pub page_size:   u32,
  pub total_count: u64,
  pub total_pages: u64,
}

impl<T> Page<T> {
  pub fn new(data: Vec<T>, request: PageRequest, total_count: u64) -> Self {
    Self {
      data,
      page: request.page(),
      page_size: request.page_size(),
      total_count,
      total_pages: total_count.div_ceil(u64::from(request.page_size())),
    }
  }
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

/// How often one emotion was tagged across a user's entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionCount {
  pub emotion: String,
  pub count:   u64,
}

/// How many entries reference one entry type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTypeCount {
  #[serde(rename = "type")]
  pub entry_type: String,
  pub count:      u64,
}

/// System-wide figures for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatistics {
  pub total_users:           u64,
  pub total_entries:         u64,
  /// At most [`TOP_ENTRY_TYPES`] items, most used first.
  pub most_used_entry_types: Vec<EntryTypeCount>,
}

pub const TOP_ENTRY_TYPES: usize = 5;

/// Count emotion names, most frequent first.
///
/// Ties keep the order in which each name was first seen, so the caller
/// controls tie-breaking through the iteration order.
pub fn tally_emotions<I, S>(names: I) -> Vec<EmotionCount>
where
  I: IntoIterator<Item = S>,
  S: Into<String>,
{
  let mut counts: Vec<EmotionCount> = Vec::new();
  for name in names {
    let name = name.into();
    match counts.iter_mut().find(|c| c.emotion == name) {
      Some(c) => c.count += 1,
      None => counts.push(EmotionCount { emotion: name, count: 1 }),
    }
  }
  // `sort_by` is stable, which preserves first-seen order among equals.
  counts.sort_by(|a, b| b.count.cmp(&a.count));
  counts
}

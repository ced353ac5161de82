//! Serde helpers for client payloads.

use serde::{Deserialize, Deserializer};

/// Deserialise `null` as `T::default()`.
///
/// Pair with a container-level `#[serde(default)]` so an absent field and an
/// explicit `null` both reach validation as an empty value.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

//! Resolution strategies and the id heuristics they rely on.

use std::fmt;

use brickyard_core::remote::RemotePart;
use serde::Serialize;

/// One stage of the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
  /// Every alias as a foreign id, through the bulk endpoint.
  BulkLookup,
  /// Aliases shaped like `digits[letter]` after cleanup, through the bulk
  /// endpoint again.
  NumericReinterpretation,
  /// The `digits[letter]` prefix of a patterned id, as a canonical id.
  SuffixStripping,
  /// The alias itself, as a canonical id.
  DirectLookup,
  /// Free-text search, accepting only a close match.
  FuzzySearch,
  /// Ask a human, then verify the answer exists.
  Manual,
}

/// Priority order of the automatic stages. The first stage to match wins.
pub const DEFAULT_ORDER: [StrategyKind; 5] = [
  StrategyKind::BulkLookup,
  StrategyKind::NumericReinterpretation,
  StrategyKind::SuffixStripping,
  StrategyKind::DirectLookup,
  StrategyKind::FuzzySearch,
];

impl StrategyKind {
  /// Label used in logs, the report, and the migration log.
  pub fn label(self) -> &'static str {
    match self {
      Self::BulkLookup => "bulk_lookup",
      Self::NumericReinterpretation => "numeric_reinterpretation",
      Self::SuffixStripping => "suffix_stripping",
      Self::DirectLookup => "direct_lookup",
      Self::FuzzySearch => "fuzzy_search",
      Self::Manual => "manual",
    }
  }
}

impl fmt::Display for StrategyKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.pad(self.label()) }
}

// ─── Id heuristics ───────────────────────────────────────────────────────────

/// `digits` optionally followed by exactly one ASCII letter.
pub fn is_base_shape(id: &str) -> bool {
  let digits = id.bytes().take_while(u8::is_ascii_digit).count();
  let rest = &id.as_bytes()[digits..];
  digits > 0 && (rest.is_empty() || (rest.len() == 1 && rest[0].is_ascii_alphabetic()))
}

/// Strip formatting noise (whitespace, `-`, `.`, case, leading zeros) and
/// return the result if it has the base shape.
///
/// `" 03001-A "` → `"3001a"`; `"3068bpb1291"` → `None`.
pub fn normalize_numeric(alias: &str) -> Option<String> {
  let cleaned: String = alias
    .chars()
    .filter(|c| !c.is_whitespace() && *c != '-' && *c != '.')
    .collect::<String>()
    .to_ascii_lowercase();
  let unpadded = cleaned.trim_start_matches('0');
  let candidate = if unpadded.starts_with(|c: char| c.is_ascii_digit()) {
    unpadded
  } else {
    cleaned.as_str()
  };
  is_base_shape(candidate).then(|| candidate.to_owned())
}

/// The leading `digits[letter]` of an id that carries more after it.
///
/// `"3068bpb1291"` → `"3068b"`. Ids that are already a bare base (`"3001"`,
/// `"3001a"`) yield `None`.
pub fn suffix_base(alias: &str) -> Option<String> {
  let alias = alias.trim();
  let bytes = alias.as_bytes();
  let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
  if digits == 0 {
    return None;
  }
  let end = match bytes.get(digits) {
    Some(b) if b.is_ascii_alphabetic() => digits + 1,
    _ => digits,
  };
  (end < bytes.len()).then(|| alias[..end].to_ascii_lowercase())
}

/// Whether a search hit is close enough to accept for `alias`: it lists the
/// alias as a foreign id, or its canonical id starts with the alias.
pub fn fuzzy_accepts(alias: &str, part: &RemotePart) -> bool {
  part.has_bricklink_id(alias)
    || part
      .design_id
      .to_ascii_lowercase()
      .starts_with(&alias.to_ascii_lowercase())
}

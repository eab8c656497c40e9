//! The manual resolution port.
//!
//! The last-resort cascade stage asks a human for a canonical id. The
//! question is routed through [`ManualResolver`] so automated runs can answer
//! deterministically instead of blocking on a terminal.

use std::collections::BTreeMap;

/// Something that can be asked for the canonical id of an alias.
pub trait ManualResolver: Send + Sync {
  /// Return the canonical `design_id` for `alias`, or `None` to skip it.
  fn ask_for_canonical_id(&self, alias: &str) -> Option<String>;
}

/// Answers from a fixed table.
#[derive(Debug, Clone, Default)]
pub struct FixedAnswers(pub BTreeMap<String, String>);

impl FixedAnswers {
  pub fn new<I, A, D>(answers: I) -> Self
  where
    I: IntoIterator<Item = (A, D)>,
    A: Into<String>,
    D: Into<String>,
  {
    Self(answers.into_iter().map(|(a, d)| (a.into(), d.into())).collect())
  }
}

impl ManualResolver for FixedAnswers {
  fn ask_for_canonical_id(&self, alias: &str) -> Option<String> {
    self.0.get(alias).cloned()
  }
}

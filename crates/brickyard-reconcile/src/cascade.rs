//! The reconciliation cascade.
//!
//! Strategies run strictly in order. Each one sees only the aliases every
//! earlier strategy left unresolved, in input order and in fixed-size
//! chunks. A chunk's matches are committed before the next chunk is looked
//! at, and are removed from the unresolved set before the next strategy
//! starts, so a later strategy can never override an earlier match.

use std::collections::{BTreeMap, BTreeSet};

use brickyard_core::{
  catalog::Migration,
  manual::ManualResolver,
  remote::{CatalogApi, RemotePart},
  store::CatalogStore,
};

use crate::{
  Error, Result,
  commit::{CommitTally, MigrationCommitter},
  error::soften,
  resolver::BatchResolver,
  strategy::{StrategyKind, fuzzy_accepts, normalize_numeric, suffix_base},
};

/// What a cascade run did.
#[derive(Debug, Default)]
pub struct CascadeOutcome {
  /// How many aliases each strategy resolved.
  pub resolved_by: BTreeMap<StrategyKind, usize>,
  /// Aliases no strategy matched, in input order. Matches the store
  /// refused are in `commits.failures` instead.
  pub unresolved:  Vec<String>,
  pub commits:     CommitTally,
}

impl CascadeOutcome {
  pub fn resolved(&self) -> usize { self.resolved_by.values().sum() }
}

pub struct Cascade<'a, A> {
  api:        &'a A,
  resolver:   BatchResolver<'a, A>,
  strategies: Vec<StrategyKind>,
  manual:     Option<&'a dyn ManualResolver>,
}

impl<'a, A: CatalogApi> Cascade<'a, A> {
  pub fn new(api: &'a A, chunk_size: usize, strategies: Vec<StrategyKind>) -> Result<Self> {
    Ok(Self {
      api,
      resolver: BatchResolver::new(api, chunk_size)?,
      strategies,
      manual: None,
    })
  }

  /// Answer [`StrategyKind::Manual`] questions with `manual`. Without one
  /// the manual stage resolves nothing.
  pub fn with_manual(mut self, manual: &'a dyn ManualResolver) -> Self {
    self.manual = Some(manual);
    self
  }

  /// Push `aliases` through every strategy, committing as it goes.
  pub async fn run<S: CatalogStore>(
    &self,
    committer: &MigrationCommitter<'_, S>,
    aliases: Vec<String>,
  ) -> Result<CascadeOutcome> {
    let mut outcome = CascadeOutcome::default();
    let mut unresolved = aliases;
    let chunk_size = self.resolver.chunk_size();

    for &kind in &self.strategies {
      if unresolved.is_empty() {
        break;
      }
      let total = unresolved.len();
      tracing::info!(strategy = %kind, total, "strategy started");

      let mut done = 0;
      let mut applied = 0;
      let mut settled = BTreeSet::new();
      for chunk in unresolved.chunks(chunk_size) {
        let found = self.resolve_chunk(kind, chunk).await?;
        done += chunk.len();

        let batch: Vec<Migration> = found
          .into_iter()
          .map(|(alias, part)| {
            tracing::debug!(strategy = %kind, %alias, design_id = %part.design_id, "matched");
            Migration { alias_id: alias, part: part.to_canonical(), source: kind.label().to_owned() }
          })
          .collect();
        let aliases: Vec<String> = batch.iter().map(|m| m.alias_id.clone()).collect();
        let results = committer.commit(batch, &mut outcome.commits).await?;
        for (alias, result) in aliases.into_iter().zip(&results) {
          if result.is_applied() {
            applied += 1;
          }
          // A match the store refused is reported as a commit failure and
          // not offered to lower-priority strategies.
          settled.insert(alias);
        }
        tracing::info!(strategy = %kind, "{done}/{total} processed");
      }

      if applied > 0 {
        outcome.resolved_by.insert(kind, applied);
      }
      unresolved.retain(|alias| !settled.contains(alias));
    }

    outcome.unresolved = unresolved;
    Ok(outcome)
  }

  /// Matches for one chunk, in chunk order. Misses and non-fatal remote
  /// failures are simply absent.
  async fn resolve_chunk(
    &self,
    kind: StrategyKind,
    chunk: &[String],
  ) -> Result<Vec<(String, RemotePart)>> {
    match kind {
      StrategyKind::BulkLookup => {
        let found = soften(self.resolver.resolve_batch(chunk).await, kind.label())?;
        let mut found = found.unwrap_or_default();
        Ok(chunk.iter().filter_map(|a| found.remove_entry(a)).collect())
      }
      StrategyKind::NumericReinterpretation => self.numeric(chunk).await,
      _ => {
        let mut found = Vec::new();
        for alias in chunk {
          if let Some(part) = self.lookup_one(kind, alias).await? {
            found.push((alias.clone(), part));
          } else {
            tracing::debug!(strategy = %kind, %alias, "no match");
          }
        }
        Ok(found)
      }
    }
  }

  /// Re-run the bulk lookup with cleaned-up ids for the aliases that have
  /// the `digits[letter]` shape once the noise is gone. Aliases cleanup
  /// leaves unchanged were already tried by the bulk stage.
  async fn numeric(&self, chunk: &[String]) -> Result<Vec<(String, RemotePart)>> {
    let candidates: Vec<(&String, String)> = chunk
      .iter()
      .filter_map(|alias| normalize_numeric(alias).map(|n| (alias, n)))
      .filter(|(alias, normalized)| alias.as_str() != normalized.as_str())
      .collect();
    if candidates.is_empty() {
      return Ok(Vec::new());
    }

    let mut query: Vec<String> = Vec::with_capacity(candidates.len());
    for (_, normalized) in &candidates {
      if !query.contains(normalized) {
        query.push(normalized.clone());
      }
    }

    let label = StrategyKind::NumericReinterpretation.label();
    let found = soften(self.resolver.resolve_batch(&query).await, label)?.unwrap_or_default();
    Ok(
      candidates
        .into_iter()
        .filter_map(|(alias, normalized)| {
          found.get(&normalized).map(|part| (alias.clone(), part.clone()))
        })
        .collect(),
    )
  }

  /// Single-request strategies.
  async fn lookup_one(&self, kind: StrategyKind, alias: &str) -> Result<Option<RemotePart>> {
    let context = format!("{kind} {alias}");
    let part = match kind {
      StrategyKind::SuffixStripping => {
        let Some(base) = suffix_base(alias) else {
          return Ok(None);
        };
        soften(self.api.part(&base).await.map_err(Error::from), &context)?.flatten()
      }
      StrategyKind::DirectLookup => {
        soften(self.api.part(alias).await.map_err(Error::from), &context)?.flatten()
      }
      StrategyKind::FuzzySearch => {
        soften(self.api.search_parts(alias).await.map_err(Error::from), &context)?
          .and_then(|hits| hits.into_iter().find(|p| fuzzy_accepts(alias, p)))
      }
      StrategyKind::Manual => {
        let Some(answer) = self
          .manual
          .and_then(|m| m.ask_for_canonical_id(alias))
          .map(|a| a.trim().to_owned())
          .filter(|a| !a.is_empty())
        else {
          return Ok(None);
        };
        let checked = soften(self.api.part(&answer).await.map_err(Error::from), &context)?.flatten();
        if checked.is_none() {
          tracing::warn!(%alias, %answer, "manual answer is not a known part, ignored");
        }
        checked
      }
      StrategyKind::BulkLookup | StrategyKind::NumericReinterpretation => None,
    };
    Ok(part)
  }
}

//! The migration committer: turns resolved aliases into store migrations.

use brickyard_core::{
  catalog::{CanonicalPart, Migration, MigrationOutcome},
  store::CatalogStore,
};
use serde::Serialize;

use crate::{Error, Result};

/// An alias the store refused to migrate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitFailure {
  pub alias_id: String,
  pub error:    String,
}

/// Running totals over every batch committed in one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitTally {
  pub migrated:   usize,
  pub rows_moved: usize,
  pub confirmed:  usize,
  /// Aliases left alone because they already map somewhere else.
  pub skipped:    Vec<String>,
  pub failures:   Vec<CommitFailure>,
}

impl CommitTally {
  fn record(&mut self, migration: &Migration, outcome: &MigrationOutcome) {
    match outcome {
      MigrationOutcome::Migrated { rows_moved } => {
        self.migrated += 1;
        self.rows_moved += rows_moved;
      }
      MigrationOutcome::ConfirmedCanonical => self.confirmed += 1,
      MigrationOutcome::Skipped { existing } => {
        tracing::info!(
          alias = %migration.alias_id,
          existing = %existing,
          proposed = %migration.part.design_id,
          "alias already mapped, left untouched"
        );
        self.skipped.push(migration.alias_id.clone());
      }
      MigrationOutcome::Failed { error } => {
        tracing::warn!(alias = %migration.alias_id, %error, "migration failed");
        self.failures.push(CommitFailure {
          alias_id: migration.alias_id.clone(),
          error:    error.clone(),
        });
      }
    }
  }
}

/// Applies migrations for one run. Each [`Self::commit`] call is one store
/// transaction; each alias inside it succeeds or fails alone.
pub struct MigrationCommitter<'a, S> {
  store:  &'a S,
  run_id: &'a str,
}

impl<'a, S: CatalogStore> MigrationCommitter<'a, S> {
  pub fn new(store: &'a S, run_id: &'a str) -> Self { Self { store, run_id } }

  /// Commit a batch and fold the outcomes into `tally`.
  pub async fn commit(
    &self,
    batch: Vec<Migration>,
    tally: &mut CommitTally,
  ) -> Result<Vec<MigrationOutcome>> {
    if batch.is_empty() {
      return Ok(Vec::new());
    }
    let outcomes = self
      .store
      .commit_migrations(self.run_id.to_owned(), batch.clone())
      .await
      .map_err(Error::store)?;
    for (migration, outcome) in batch.iter().zip(&outcomes) {
      tracing::debug!(
        alias = %migration.alias_id,
        design_id = %migration.part.design_id,
        source = %migration.source,
        ?outcome,
        "committed"
      );
      tally.record(migration, outcome);
    }
    Ok(outcomes)
  }

  /// Commit a single `alias_id → design_id` mapping.
  pub async fn commit_one(
    &self,
    alias_id: &str,
    design_id: &str,
    name: &str,
    source: &str,
  ) -> Result<MigrationOutcome> {
    let migration = Migration {
      alias_id: alias_id.to_owned(),
      part:     CanonicalPart::new(design_id, name),
      source:   source.to_owned(),
    };
    let mut tally = CommitTally::default();
    let mut outcomes = self.commit(vec![migration], &mut tally).await?;
    Ok(outcomes.pop().unwrap_or(MigrationOutcome::Failed {
      error: "store returned no outcome".to_owned(),
    }))
  }
}

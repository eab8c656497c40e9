//! Terminal answers for the manual cascade stage.

use std::io::{self, BufRead, Write};

use brickyard_core::manual::ManualResolver;

/// Asks on stderr and reads one line from stdin per alias. A blank line
/// skips the alias.
pub struct TerminalPrompt;

impl ManualResolver for TerminalPrompt {
  fn ask_for_canonical_id(&self, alias: &str) -> Option<String> {
    match tokio::task::block_in_place(|| read_answer(alias)) {
      Ok(answer) => answer,
      Err(e) => {
        tracing::warn!(alias, "could not read answer: {e}");
        None
      }
    }
  }
}

fn read_answer(alias: &str) -> io::Result<Option<String>> {
  let mut stderr = io::stderr();
  write!(stderr, "Canonical design id for {alias} (blank to skip): ")?;
  stderr.flush()?;

  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  let answer = line.trim();
  Ok((!answer.is_empty()).then(|| answer.to_owned()))
}

//! The `[IB]…[IB]` remarks grammar.
//!
//! * loose parts: `[IB]Drawer|Container[IB]`
//! * anything else: `[IB](Status)|<set number> <set name>[IB]`

use brickyard_core::catalog::InventoryStatus;

use crate::Placement;

const MARKER: &str = "[IB]";

/// Decode a remarks string. Never fails; unrecognised text is read as a
/// drawer name.
pub fn parse_remarks(raw: &str) -> Placement {
  let raw = raw.trim();
  let text = raw
    .strip_prefix(MARKER)
    .and_then(|s| s.strip_suffix(MARKER))
    .unwrap_or(raw)
    .trim();

  if let Some(rest) = text.strip_prefix('(')
    && let Some((label, tail)) = rest.split_once(')')
  {
    let set_number = tail
      .trim_start_matches('|')
      .split('|')
      .next()
      .and_then(|s| s.split_whitespace().next())
      .map(str::to_owned);
    return Placement {
      status: InventoryStatus::from_label(label),
      set_number,
      ..Placement::default()
    };
  }

  let (drawer, container) = match text.split_once('|') {
    Some((d, c)) => (d, Some(c)),
    None => (text, None),
  };
  Placement {
    drawer: non_empty(drawer),
    container: container.and_then(non_empty),
    ..Placement::default()
  }
}

fn non_empty(s: &str) -> Option<String> {
  let s = s.trim();
  (!s.is_empty()).then(|| s.to_owned())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn loose_with_drawer_and_container() {
    let p = parse_remarks("[IB]Drawer 12|Box B[IB]");
    assert_eq!(p.status, InventoryStatus::Loose);
    assert_eq!(p.drawer.as_deref(), Some("Drawer 12"));
    assert_eq!(p.container.as_deref(), Some("Box B"));
  }

  #[test]
  fn drawer_only() {
    let p = parse_remarks("[IB]Drawer 12[IB]");
    assert_eq!(p.drawer.as_deref(), Some("Drawer 12"));
    assert_eq!(p.container, None);
  }

  #[test]
  fn status_and_set() {
    let p = parse_remarks("[IB](Work in Progress)|75192-1 Millennium Falcon[IB]");
    assert_eq!(p.status, InventoryStatus::Wip);
    assert_eq!(p.set_number.as_deref(), Some("75192-1"));
    assert_eq!(p.drawer, None);

    let p = parse_remarks("[IB](On Display)[IB]");
    assert_eq!(p.status, InventoryStatus::Other("on_display".into()));
    assert_eq!(p.set_number, None);
  }

  #[test]
  fn blank_and_unmarked() {
    assert_eq!(parse_remarks(""), Placement::default());
    assert_eq!(parse_remarks("  |  "), Placement::default());
    assert_eq!(parse_remarks("Shelf").drawer.as_deref(), Some("Shelf"));
  }
}

//! Integration tests for `SqliteStore` against an in-memory database.

use brickyard_core::{
  catalog::{
    CanonicalPart, Color, ColorAlias, InventoryStatus, Migration, MigrationOutcome,
    NewInventoryRow, PLACEHOLDER_NAME, PartDetails,
  },
  store::CatalogStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  let s = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");
  s.upsert_color(Color::new(0, "Black", "05131D").unwrap())
    .await
    .unwrap();
  s
}

fn part(design_id: &str, name: &str) -> CanonicalPart {
  CanonicalPart::new(design_id, name)
}

fn migration(alias: &str, design_id: &str, name: &str) -> Migration {
  Migration {
    alias_id: alias.into(),
    part:     part(design_id, name),
    source:   "bulk_lookup".into(),
  }
}

/// A placeholder holding `qty` loose pieces in black.
async fn placeholder_with_stock(s: &SqliteStore, alias: &str, qty: i64) {
  s.register_placeholder(alias.into(), String::new()).await.unwrap();
  s.insert_inventory(NewInventoryRow::loose(alias, 0, qty))
    .await
    .unwrap();
}

// ─── Parts & aliases ─────────────────────────────────────────────────────────

#[tokio::test]
async fn register_placeholder_creates_self_alias() {
  let s = store().await;
  s.register_placeholder("3068bpb1291".into(), "  ".into())
    .await
    .unwrap();

  let alias = s.get_alias("3068bpb1291").await.unwrap().unwrap();
  assert!(alias.is_placeholder());

  let p = s.get_part("3068bpb1291").await.unwrap().unwrap();
  assert_eq!(p.name, PLACEHOLDER_NAME);
  assert_eq!(s.placeholder_aliases().await.unwrap(), vec!["3068bpb1291"]);
  assert_eq!(
    s.resolve_part("3068bpb1291").await.unwrap().as_deref(),
    Some("3068bpb1291")
  );
}

#[tokio::test]
async fn register_placeholder_rejects_blank_id() {
  let s = store().await;
  assert!(s.register_placeholder(" ".into(), String::new()).await.is_err());
}

#[tokio::test]
async fn upsert_part_never_downgrades_name() {
  let s = store().await;
  s.upsert_part(part("3001", PLACEHOLDER_NAME)).await.unwrap();
  s.upsert_part(part("3001", "Brick 2 x 4")).await.unwrap();
  s.upsert_part(part("3001", "Something else")).await.unwrap();
  s.upsert_part(part("3001", "")).await.unwrap();

  let p = s.get_part("3001").await.unwrap().unwrap();
  assert_eq!(p.name, "Brick 2 x 4");
}

#[tokio::test]
async fn resolve_part_falls_back_to_canonical_id() {
  let s = store().await;
  s.upsert_part(part("3001", "Brick 2 x 4")).await.unwrap();
  assert_eq!(s.resolve_part("3001").await.unwrap().as_deref(), Some("3001"));
  assert!(s.resolve_part("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn fill_part_details_only_touches_placeholders_and_gaps() {
  let s = store().await;
  s.upsert_part(part("3001", PLACEHOLDER_NAME)).await.unwrap();
  s.upsert_part(part("3002", "Brick 2 x 3")).await.unwrap();

  assert_eq!(s.parts_with_placeholder_names().await.unwrap(), vec!["3001"]);

  let changed = s
    .fill_part_details(vec![
      PartDetails {
        design_id: "3001".into(),
        name:      Some("Brick 2 x 4".into()),
        url:       Some("https://rebrickable.com/parts/3001/".into()),
        image_url: None,
      },
      PartDetails {
        design_id: "3002".into(),
        name:      Some("Renamed".into()),
        url:       None,
        image_url: None,
      },
    ])
    .await
    .unwrap();
  assert_eq!(changed, 1);

  let p = s.get_part("3001").await.unwrap().unwrap();
  assert_eq!(p.name, "Brick 2 x 4");
  assert!(p.url.is_some());
  assert_eq!(s.get_part("3002").await.unwrap().unwrap().name, "Brick 2 x 3");
  assert!(s.parts_with_placeholder_names().await.unwrap().is_empty());
}

// ─── Migration ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn migration_moves_inventory_and_drops_placeholder() {
  let s = store().await;
  placeholder_with_stock(&s, "3068bpb1291", 12).await;

  let out = s
    .commit_migrations("run-1".into(), vec![migration(
      "3068bpb1291",
      "3068b",
      "Tile 2 x 2 with Groove",
    )])
    .await
    .unwrap();
  assert_eq!(out, vec![MigrationOutcome::Migrated { rows_moved: 1 }]);

  assert!(s.get_part("3068bpb1291").await.unwrap().is_none());
  assert_eq!(
    s.get_alias("3068bpb1291").await.unwrap().unwrap().design_id,
    "3068b"
  );
  assert_eq!(s.quantity_for_design("3068b").await.unwrap(), 12);
  assert_eq!(s.quantity_for_design("3068bpb1291").await.unwrap(), 0);
  assert!(s.orphaned_inventory().await.unwrap().is_empty());
  assert!(s.placeholder_aliases().await.unwrap().is_empty());

  let log = s.migration_log().await.unwrap();
  assert_eq!(log.len(), 1);
  assert_eq!(log[0].run_id, "run-1");
  assert_eq!(log[0].design_id, "3068b");
  assert_eq!(log[0].rows_moved, 1);
}

#[tokio::test]
async fn migration_is_idempotent() {
  let s = store().await;
  placeholder_with_stock(&s, "3001old", 4).await;
  let batch = vec![migration("3001old", "3001", "Brick 2 x 4")];

  s.commit_migrations("run-1".into(), batch.clone()).await.unwrap();
  s.commit_migrations("run-2".into(), batch).await.unwrap();

  assert_eq!(s.quantity_for_design("3001").await.unwrap(), 4);
  assert_eq!(s.inventory_for_design("3001").await.unwrap().len(), 1);
  assert_eq!(s.migration_log().await.unwrap().len(), 1);
}

#[tokio::test]
async fn migration_merges_into_existing_canonical_stock() {
  let s = store().await;
  s.upsert_part(part("3001", "Brick 2 x 4")).await.unwrap();
  s.insert_inventory(NewInventoryRow::loose("3001", 0, 10))
    .await
    .unwrap();
  placeholder_with_stock(&s, "3001old", 5).await;

  s.commit_migrations("run".into(), vec![migration("3001old", "3001", "")])
    .await
    .unwrap();

  assert_eq!(s.quantity_for_design("3001").await.unwrap(), 15);
  assert_eq!(s.get_part("3001").await.unwrap().unwrap().name, "Brick 2 x 4");
}

#[tokio::test]
async fn real_mapping_is_never_overwritten() {
  let s = store().await;
  placeholder_with_stock(&s, "973pb1", 1).await;
  s.commit_migrations("run".into(), vec![migration("973pb1", "973c01", "Torso")])
    .await
    .unwrap();

  let out = s
    .commit_migrations("run".into(), vec![migration("973pb1", "973", "Other")])
    .await
    .unwrap();
  assert_eq!(out, vec![MigrationOutcome::Skipped { existing: "973c01".into() }]);
  assert_eq!(s.get_alias("973pb1").await.unwrap().unwrap().design_id, "973c01");
  assert!(s.get_part("973").await.unwrap().is_none());
}

#[tokio::test]
async fn identity_resolution_confirms_canonical() {
  let s = store().await;
  placeholder_with_stock(&s, "3001", 3).await;

  let out = s
    .commit_migrations("run".into(), vec![migration("3001", "3001", "Brick 2 x 4")])
    .await
    .unwrap();
  assert_eq!(out, vec![MigrationOutcome::ConfirmedCanonical]);

  assert!(s.get_alias("3001").await.unwrap().is_none());
  let p = s.get_part("3001").await.unwrap().unwrap();
  assert_eq!(p.name, "Brick 2 x 4");
  assert_eq!(s.quantity_for_design("3001").await.unwrap(), 3);
  assert!(s.placeholder_aliases().await.unwrap().is_empty());
}

#[tokio::test]
async fn chained_aliases_follow_the_placeholder() {
  let s = store().await;
  placeholder_with_stock(&s, "3068bpb1291", 2).await;
  s.commit_migrations("run".into(), vec![Migration {
    alias_id: "ib-3068".into(),
    part:     part("3068bpb1291", ""),
    source:   "manual".into(),
  }])
  .await
  .unwrap();
  assert_eq!(
    s.get_alias("ib-3068").await.unwrap().unwrap().design_id,
    "3068bpb1291"
  );

  s.commit_migrations("run".into(), vec![migration("3068bpb1291", "3068b", "Tile")])
    .await
    .unwrap();

  assert_eq!(s.get_alias("ib-3068").await.unwrap().unwrap().design_id, "3068b");
  assert!(s.get_part("3068bpb1291").await.unwrap().is_none());
}

#[tokio::test]
async fn failing_alias_is_rolled_back_alone() {
  let s = store().await;
  placeholder_with_stock(&s, "good", 1).await;
  placeholder_with_stock(&s, "bad", 7).await;

  s.conn
    .call(|conn| {
      conn.execute_batch(
        "CREATE TRIGGER refuse_bad BEFORE UPDATE ON inventory
         WHEN OLD.design_id = 'bad'
         BEGIN SELECT RAISE(ABORT, 'refused'); END;",
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let out = s
    .commit_migrations("run".into(), vec![
      migration("bad", "3002", "Brick 2 x 3"),
      migration("good", "3001", "Brick 2 x 4"),
    ])
    .await
    .unwrap();

  assert!(matches!(out[0], MigrationOutcome::Failed { .. }));
  assert_eq!(out[1], MigrationOutcome::Migrated { rows_moved: 1 });

  // The failed alias kept its placeholder, its stock, and left no part behind.
  assert!(s.get_alias("bad").await.unwrap().unwrap().is_placeholder());
  assert_eq!(s.quantity_for_design("bad").await.unwrap(), 7);
  assert!(s.get_part("3002").await.unwrap().is_none());
  assert_eq!(s.quantity_for_design("3001").await.unwrap(), 1);
  assert_eq!(s.migration_log().await.unwrap().len(), 1);
}

// ─── Colours & inventory ─────────────────────────────────────────────────────

#[tokio::test]
async fn color_aliases_resolve() {
  let s = store().await;
  s.upsert_color(Color::new(1, "Blue", "#0055bf").unwrap())
    .await
    .unwrap();
  s.record_color_alias(ColorAlias { alias_id: 7, color_id: 1 }).await.unwrap();
  // First mapping wins.
  s.record_color_alias(ColorAlias { alias_id: 7, color_id: 0 }).await.unwrap();

  assert_eq!(s.resolve_color(7).await.unwrap(), Some(1));
  assert_eq!(s.resolve_color(8).await.unwrap(), None);
}

#[tokio::test]
async fn inventory_keeps_location_and_status() {
  let s = store().await;
  s.upsert_part(part("3001", "Brick 2 x 4")).await.unwrap();
  let id = s
    .insert_inventory(NewInventoryRow {
      design_id:  "3001".into(),
      color_id:   0,
      quantity:   2,
      status:     InventoryStatus::Built,
      drawer:     None,
      container:  None,
      set_number: Some("10497-1".into()),
    })
    .await
    .unwrap();

  let rows = s.inventory_for_design("3001").await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].id, id);
  assert_eq!(rows[0].status, InventoryStatus::Built);
  assert_eq!(rows[0].set_number.as_deref(), Some("10497-1"));
}

#[tokio::test]
async fn negative_quantity_is_rejected() {
  let s = store().await;
  s.upsert_part(part("3001", "Brick 2 x 4")).await.unwrap();
  assert!(
    s.insert_inventory(NewInventoryRow::loose("3001", 0, -1))
      .await
      .is_err()
  );
}

#[tokio::test]
async fn inventory_requires_a_known_part() {
  let s = store().await;
  assert!(
    s.insert_inventory(NewInventoryRow::loose("ghost", 0, 1))
      .await
      .is_err()
  );
}

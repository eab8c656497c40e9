//! XML → [`ExportItem`] decoding.

use serde::Deserialize;

use crate::{Error, ExportItem, Result, remarks::parse_remarks};

#[derive(Debug, Deserialize)]
#[serde(rename = "INVENTORY")]
struct RawInventory {
  #[serde(rename = "ITEM", default)]
  items: Vec<RawItem>,
}

/// Every field is read as text so bad numbers can be reported per item.
#[derive(Debug, Deserialize)]
struct RawItem {
  #[serde(rename = "ITEMID", default)]
  item_id:   Option<String>,
  #[serde(rename = "ITEMNAME", default)]
  item_name: Option<String>,
  #[serde(rename = "COLOR", default)]
  color:     Option<String>,
  #[serde(rename = "QTY", default)]
  qty:       Option<String>,
  #[serde(rename = "REMARKS", default)]
  remarks:   Option<String>,
}

/// Parse a whole export, in document order.
pub fn parse(xml: &str) -> Result<Vec<ExportItem>> {
  let inventory: RawInventory = quick_xml::de::from_str(xml)?;
  inventory
    .items
    .into_iter()
    .enumerate()
    .map(|(index, raw)| decode_item(index, raw))
    .collect()
}

fn decode_item(index: usize, raw: RawItem) -> Result<ExportItem> {
  let item_id = raw
    .item_id
    .map(|s| s.trim().to_owned())
    .filter(|s| !s.is_empty())
    .ok_or(Error::MissingItemId { index })?;

  let color = number(&item_id, "COLOR", raw.color.as_deref())?;
  let quantity = number(&item_id, "QTY", raw.qty.as_deref())?;
  if quantity < 0 {
    return Err(Error::NegativeQuantity { item_id, quantity });
  }

  Ok(ExportItem {
    item_name: raw.item_name.map(|s| s.trim().to_owned()).unwrap_or_default(),
    color,
    quantity,
    placement: parse_remarks(raw.remarks.as_deref().unwrap_or_default()),
    item_id,
  })
}

fn number(item_id: &str, field: &'static str, value: Option<&str>) -> Result<i64> {
  let value = value.unwrap_or_default().trim();
  value.parse().map_err(|_| Error::InvalidNumber {
    item_id: item_id.to_owned(),
    field,
    value: value.to_owned(),
  })
}

#[cfg(test)]
mod tests {
  use brickyard_core::catalog::InventoryStatus;

  use super::*;

  const EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<INVENTORY>
  <ITEM>
    <ITEMTYPE>P</ITEMTYPE>
    <ITEMID>3068bpb1291</ITEMID>
    <ITEMNAME>Tile 2 x 2 with Groove with Print</ITEMNAME>
    <COLOR>11</COLOR>
    <QTY>12</QTY>
    <REMARKS>[IB]A3|Tiles[IB]</REMARKS>
  </ITEM>
  <ITEM>
    <ITEMTYPE>P</ITEMTYPE>
    <ITEMID> 3001 </ITEMID>
    <ITEMNAME>Brick 2 x 4</ITEMNAME>
    <COLOR>5</COLOR>
    <QTY>4</QTY>
    <REMARKS>[IB](Built)|10787-1 Gabby's Dollhouse[IB]</REMARKS>
  </ITEM>
  <ITEM>
    <ITEMID>3020</ITEMID>
    <COLOR>1</COLOR>
    <QTY>2</QTY>
  </ITEM>
</INVENTORY>"#;

  #[test]
  fn parses_items_in_order() {
    let items = parse(EXPORT).unwrap();
    assert_eq!(items.len(), 3);

    assert_eq!(items[0].item_id, "3068bpb1291");
    assert_eq!(items[0].color, 11);
    assert_eq!(items[0].quantity, 12);
    assert_eq!(items[0].placement.drawer.as_deref(), Some("A3"));
    assert_eq!(items[0].placement.container.as_deref(), Some("Tiles"));

    assert_eq!(items[1].item_id, "3001");
    assert_eq!(items[1].placement.status, InventoryStatus::Built);
    assert_eq!(items[1].placement.set_number.as_deref(), Some("10787-1"));

    assert_eq!(items[2].item_name, "");
    assert_eq!(items[2].placement.status, InventoryStatus::Loose);
    assert_eq!(items[2].placement.drawer, None);
  }

  #[test]
  fn empty_inventory() {
    assert!(parse("<INVENTORY></INVENTORY>").unwrap().is_empty());
  }

  #[test]
  fn bad_quantity_names_the_item() {
    let xml = "<INVENTORY><ITEM><ITEMID>3001</ITEMID><COLOR>5</COLOR><QTY>lots</QTY></ITEM></INVENTORY>";
    let err = parse(xml).unwrap_err();
    assert!(matches!(err, Error::InvalidNumber { ref item_id, field: "QTY", .. } if item_id == "3001"));
  }

  #[test]
  fn missing_item_id_is_an_error() {
    let xml = "<INVENTORY><ITEM><COLOR>5</COLOR><QTY>1</QTY></ITEM></INVENTORY>";
    assert!(matches!(parse(xml), Err(Error::MissingItemId { index: 0 })));
  }
}

//! Business place and barcode patch for the serial item transfer tables.

use ensure_core::{Catalog, ResourceDefinition};

use crate::object::SchemaObject;

pub const TRANSFERS_TABLE: &str = "serial_item_transfers";
pub const TRANSFER_ITEMS_TABLE: &str = "serial_item_transfer_items";
pub const ITEM_LOOKUP_INDEX: &str = "idx_serial_item_transfer_item_lookup";

/// Document-level BPL fields, the item barcode audit column and the item lookup index.
pub fn bpl_barcode_catalog() -> Catalog<SchemaObject> {
    Catalog::new(vec![
        ResourceDefinition::new(
            "bpl_id",
            "Business place id on serial_item_transfers",
            SchemaObject::column(TRANSFERS_TABLE, "INT NULL")
                .with_comment("Business Place ID from SAP B1 (set from first validated scan)")
                .after("to_warehouse"),
        ),
        ResourceDefinition::new(
            "bpl_name",
            "Business place name on serial_item_transfers",
            SchemaObject::column(TRANSFERS_TABLE, "VARCHAR(200) NULL")
                .with_comment("Business Place Name for UI display")
                .after("bpl_id"),
        ),
        ResourceDefinition::new(
            "barcode",
            "Scanned barcode on serial_item_transfer_items",
            SchemaObject::column(TRANSFER_ITEMS_TABLE, "VARCHAR(100) NULL")
                .with_comment("Scanned barcode in barcode mode (for audit trail)")
                .after("serial_number"),
        ),
        ResourceDefinition::new(
            ITEM_LOOKUP_INDEX,
            "Item lookup index on serial_item_transfer_items",
            SchemaObject::index(TRANSFER_ITEMS_TABLE, ["serial_item_transfer_id", "item_code"]),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;

    #[test]
    fn test_catalog_is_valid_and_ordered() {
        let catalog = bpl_barcode_catalog();
        assert!(catalog.validate().is_ok());
        assert_eq!(
            catalog.ids().collect::<Vec<_>>(),
            vec!["bpl_id", "bpl_name", "barcode", ITEM_LOOKUP_INDEX]
        );
    }

    #[test]
    fn test_every_entry_renders_for_both_dialects() {
        for def in &bpl_barcode_catalog() {
            for dialect in [Dialect::MySql, Dialect::Sqlite] {
                assert!(
                    dialect.create_statement(&def.id, &def.payload).is_ok(),
                    "{} failed for {:?}",
                    def.id,
                    dialect
                );
            }
        }
    }
}

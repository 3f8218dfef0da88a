//! Stored queries the warehouse application expects on the SAP B1 side.

use ensure_core::{Catalog, ResourceDefinition};

/// Creation payload for a stored query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPayload {
    pub text: String,
    /// Comma-separated parameter names, when the server needs them declared.
    pub param_list: Option<String>,
}

fn query(code: &str, name: &str, text: &str, param_list: Option<&str>) -> ResourceDefinition<QueryPayload> {
    ResourceDefinition::new(
        code,
        name,
        QueryPayload {
            text: text.to_string(),
            param_list: param_list.map(str::to_string),
        },
    )
}

/// Queries used for serial, item and sales order validation.
pub fn required_queries() -> Catalog<QueryPayload> {
    Catalog::new(vec![
        query(
            "Series_Validation",
            "Seriel_Validation",
            r#"SELECT T0."ItemCode", T0."DistNumber", T1."WhsCode" FROM "OSRN" T0  INNER JOIN "OSRQ" T1 ON T0."AbsEntry" =T1."MdAbsEntry" WHERE  T1."Quantity" >'0'AND T1."ItemCode" =:itemCode AND T0."DistNumber"=:series AND T1."WhsCode"=:whsCode"#,
            None,
        ),
        query(
            "Quantity_Check",
            "Quantity_Check",
            r#"SELECT Distinct T1."OnHand", T0."ItemCode", T0."ManSerNum" FROM "OITM" T0  INNER JOIN "OITW" T1 ON T0."ItemCode" = T1."ItemCode" WHERE T1."OnHand" >'0' AND  T1."WhsCode" =:whCode AND  T0."ItemCode" =:itemCode"#,
            Some("whCode,itemCode"),
        ),
        query(
            "ItemCode_Validation",
            "ItemCode_Validation",
            r#"SELECT Distinct T0."ItemCode",T0."itemName", T0."DistNumber", T1."WhsCode" FROM "OSRN" T0  INNER JOIN "OSRQ" T1 ON T0."AbsEntry" =T1."MdAbsEntry" WHERE  T1."Quantity" >'0' AND T0."ItemCode"=:item_code AND T1."WhsCode"=:whcode"#,
            None,
        ),
        query(
            "Item_Validation",
            "Item_Validation",
            r#"SELECT Distinct T0."ItemCode",T0."itemName", T0."DistNumber", T1."WhsCode" FROM "OSRN" T0  INNER JOIN "OSRQ" T1 ON T0."AbsEntry" =T1."MdAbsEntry" WHERE  T1."Quantity" >'0' AND T0."DistNumber"=:seriel_number AND T1."WhsCode"=:whcode"#,
            None,
        ),
        query(
            "Get_SO_Details",
            "Get_SO_Details",
            r#"SELECT T0."DocEntry" FROM "ORDR" T0 INNER JOIN "NNM1" T1 ON T0."Series" = T1."Series" WHERE T0."DocNum" =:SONumber AND  T1."Series"=:Series"#,
            None,
        ),
        query(
            "Invoise_creation",
            "Invoise_creation",
            r#"SELECT DISTINCT T0."ItemCode",T0."itemName", T0."DistNumber", T2."WhsCode",T2."WhsName",T3."BPLName",T2."BPLid" FROM "OSRN" T0 INNER JOIN "OSRQ" T1 ON T0."AbsEntry" =T1."MdAbsEntry" INNER JOIN "OWHS" T2 ON T2."WhsCode"=T1."WhsCode" INNER JOIN "OBPL" T3 ON T3."BPLId"=T2."BPLid"WHERE  T1."Quantity" >'0'AND T0."DistNumber"=:serial_number"#,
            None,
        ),
        query(
            "Get_SO_Series",
            "Get_SO_Series",
            r#"SELECT T0."SeriesName", T0."Series" FROM "NNM1" T0 WHERE T0."ObjectCode" = '17'"#,
            None,
        ),
        query(
            "Get_Item",
            "Get_Item",
            r#"SELECT DISTINCT T0."ItemCode", T0."ItemName" FROM "OITM" T0  INNER JOIN "OITW" T1 ON T0."ItemCode" = T1."ItemCode" WHERE T1."OnHand" >'0' AND  T0."ManBtchNum" ='N'AND T1."WhsCode" =:whcode"#,
            None,
        ),
        query(
            "Checkseries",
            "Checkseries",
            r#"SELECT T0."ItemCode", T0."DistNumber", T1."WhsCode" FROM "OSRN" T0  INNER JOIN "OSRQ" T1 ON T0."AbsEntry" =T1."MdAbsEntry" WHERE T1."ItemCode" =:Itemcode AND T0."DistNumber"=:Serials AND T1."WhsCode"=:Whscode"#,
            None,
        ),
        query(
            "GetItemWarehouseSerialStatus_i",
            "Get Item Warehouse Serial Status_i",
            r#"SELECT "OSRN"."ItemCode", "OSRN"."DistNumber" AS "SerialNumber", "OSRQ"."WhsCode" AS "WarehouseCode", "OSRQ"."Quantity" AS "QtyInWhs" FROM "OSRN" INNER JOIN "OSRQ" ON "OSRN"."SysNumber" = "OSRQ"."SysNumber" AND "OSRN"."ItemCode" = "OSRQ"."ItemCode" WHERE "OSRN"."ItemCode" = :ItemCode AND "OSRN"."DistNumber" = :SerialNumber AND "OSRQ"."WhsCode" = :WarehouseCode AND "OSRQ"."Quantity" > 0"#,
            None,
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_queries_are_unique() {
        let catalog = required_queries();
        assert_eq!(catalog.len(), 10);
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_label_is_the_display_name() {
        let catalog = required_queries();
        let series = catalog.get("Series_Validation").unwrap();
        assert_eq!(series.label, "Seriel_Validation");
        assert!(series.payload.text.contains(":series"));
        assert_eq!(series.payload.param_list, None);

        let qty = catalog.get("Quantity_Check").unwrap();
        assert_eq!(qty.payload.param_list.as_deref(), Some("whCode,itemCode"));
    }
}

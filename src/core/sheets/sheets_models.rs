use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::table::HeaderMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetInfo {
    pub spreadsheet_id: String,
    #[serde(default)]
    pub properties: SpreadsheetProperties,
    #[serde(default)]
    pub sheets: Vec<Sheet>,
    pub spreadsheet_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetProperties {
    #[serde(default)]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub properties: SheetProperties,
    #[serde(default)]
    pub charts: Vec<EmbeddedChart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    pub sheet_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub index: i64,
    pub sheet_type: Option<String>,
    pub grid_properties: Option<GridProperties>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridProperties {
    #[serde(default)]
    pub row_count: u32,
    #[serde(default)]
    pub column_count: u32,
    pub frozen_row_count: Option<u32>,
    pub frozen_column_count: Option<u32>,
}

/// A chart embedded in a sheet. Its `spec` stays raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedChart {
    pub chart_id: i64,
    #[serde(default)]
    pub spec: Value,
}

impl EmbeddedChart {
    pub fn title(&self) -> Option<&str> {
        self.spec.get("title").and_then(Value::as_str)
    }
}

/// Structural changes sent to `spreadsheets.batchUpdate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SheetsRequest {
    #[serde(rename_all = "camelCase")]
    AddSheet { properties: NewSheet },
    #[serde(rename_all = "camelCase")]
    DeleteSheet { sheet_id: i64 },
    #[serde(rename_all = "camelCase")]
    UpdateSpreadsheetProperties {
        properties: SpreadsheetProperties,
        fields: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSheet {
    pub title: String,
}

impl SheetsRequest {
    pub fn add_sheet(title: &str) -> Self {
        SheetsRequest::AddSheet {
            properties: NewSheet {
                title: title.to_string(),
            },
        }
    }

    pub fn rename_spreadsheet(title: &str) -> Self {
        SheetsRequest::UpdateSpreadsheetProperties {
            properties: SpreadsheetProperties {
                title: title.to_string(),
                locale: None,
                time_zone: None,
            },
            fields: "title".to_string(),
        }
    }
}

/// What `values.batchUpdate` reports back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummary {
    #[serde(default)]
    pub total_updated_rows: u64,
    #[serde(default)]
    pub total_updated_columns: u64,
    #[serde(default)]
    pub total_updated_cells: u64,
    #[serde(default)]
    pub total_updated_sheets: u64,
}

/// Which cells to read into a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Defaults to the first sheet when read through a `Spreadsheet` handle.
    pub sheet_name: Option<String>,
    /// A1 range inside the sheet, e.g. `A1:D20`. The whole sheet when absent.
    pub range: Option<String>,
    pub header: HeaderMode,
}

impl ReadOptions {
    pub fn sheet(name: &str) -> Self {
        Self {
            sheet_name: Some(name.to_string()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn requests_serialize_as_single_key_objects() {
        let add = serde_json::to_value(SheetsRequest::add_sheet("Summary")).unwrap();
        assert_eq!(add, json!({"addSheet": {"properties": {"title": "Summary"}}}));

        let delete = serde_json::to_value(SheetsRequest::DeleteSheet { sheet_id: 7 }).unwrap();
        assert_eq!(delete, json!({"deleteSheet": {"sheetId": 7}}));

        let rename = serde_json::to_value(SheetsRequest::rename_spreadsheet("Q3")).unwrap();
        assert_eq!(
            rename,
            json!({"updateSpreadsheetProperties": {
                "properties": {"title": "Q3"},
                "fields": "title"
            }})
        );
    }

    #[test]
    fn spreadsheet_info_tolerates_missing_fields() {
        let info: SpreadsheetInfo = serde_json::from_value(json!({
            "spreadsheetId": "s1",
            "properties": {"title": "Budget", "locale": "en_US", "timeZone": "Europe/Madrid"},
            "sheets": [
                {"properties": {"sheetId": 0, "title": "Sheet1"}},
                {"properties": {"sheetId": 42, "title": "Data", "index": 1},
                 "charts": [{"chartId": 9, "spec": {"title": "Revenue"}}]}
            ]
        }))
        .unwrap();

        assert_eq!(info.sheets.len(), 2);
        assert_eq!(info.sheets[1].charts[0].title(), Some("Revenue"));
        assert_eq!(info.properties.time_zone.as_deref(), Some("Europe/Madrid"));
    }
}

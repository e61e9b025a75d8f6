use std::sync::Arc;

use serde_json::{json, Value};

use super::sheets_models::{
    EmbeddedChart, ReadOptions, Sheet, SheetProperties, SheetsRequest, SpreadsheetInfo,
    UpdateSummary,
};
use crate::core::api::GoogleApi;
use crate::core::error::{GoogleError, Result};
use crate::core::table::{a1_range, DataTable};
use crate::core::transport::{ApiRequest, GoogleTransport};

/// Thin wrapper over the Sheets v4 REST API.
pub struct SheetsService<T: GoogleTransport> {
    transport: Arc<T>,
}

impl<T: GoogleTransport> Clone for SheetsService<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: GoogleTransport> SheetsService<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    pub async fn get_info(
        &self,
        spreadsheet_id: &str,
        include_grid_data: bool,
    ) -> Result<SpreadsheetInfo> {
        let request =
            ApiRequest::get(GoogleApi::Sheets, &format!("spreadsheets/{}", spreadsheet_id))
                .query("includeGridData", include_grid_data);
        let value = self.transport.send_json(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn create(&self, title: &str) -> Result<SpreadsheetInfo> {
        let request = ApiRequest::post(GoogleApi::Sheets, "spreadsheets")
            .json(json!({ "properties": { "title": title } }));
        let value = self.transport.send_json(request).await?;
        let info: SpreadsheetInfo = serde_json::from_value(value)?;
        tracing::info!("Created spreadsheet '{}' ({})", title, info.spreadsheet_id);
        Ok(info)
    }

    /// Sends the requests in one call and returns the `replies` array.
    pub async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: &[SheetsRequest],
    ) -> Result<Vec<Value>> {
        let request = ApiRequest::post(
            GoogleApi::Sheets,
            &format!("spreadsheets/{}:batchUpdate", spreadsheet_id),
        )
        .json(json!({ "requests": requests }));

        let response = self.transport.send_json(request).await?;
        tracing::debug!(
            "Applied {} request(s) to spreadsheet {}",
            requests.len(),
            spreadsheet_id
        );
        Ok(response
            .get("replies")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    pub async fn add_sheet(&self, spreadsheet_id: &str, name: &str) -> Result<SheetProperties> {
        let replies = self
            .batch_update(spreadsheet_id, &[SheetsRequest::add_sheet(name)])
            .await?;
        let properties = replies
            .first()
            .and_then(|reply| reply.pointer("/addSheet/properties"))
            .cloned()
            .ok_or_else(|| GoogleError::Decode("addSheet reply without properties".to_string()))?;
        Ok(serde_json::from_value(properties)?)
    }

    pub async fn change_title(&self, spreadsheet_id: &str, title: &str) -> Result<()> {
        self.batch_update(spreadsheet_id, &[SheetsRequest::rename_spreadsheet(title)])
            .await?;
        Ok(())
    }

    pub async fn delete_sheet(&self, spreadsheet_id: &str, sheet_id: i64) -> Result<()> {
        self.batch_update(spreadsheet_id, &[SheetsRequest::DeleteSheet { sheet_id }])
            .await?;
        tracing::info!("Deleted sheet {} from {}", sheet_id, spreadsheet_id);
        Ok(())
    }

    pub async fn sheets(&self, spreadsheet_id: &str) -> Result<Vec<Sheet>> {
        let request =
            ApiRequest::get(GoogleApi::Sheets, &format!("spreadsheets/{}", spreadsheet_id))
                .query("fields", "sheets(properties,charts)");
        let value = self.transport.send_json(request).await?;
        let sheets = value.get("sheets").cloned().unwrap_or_else(|| json!([]));
        Ok(serde_json::from_value(sheets)?)
    }

    pub async fn sheet_names(&self, spreadsheet_id: &str) -> Result<Vec<String>> {
        Ok(self
            .sheets(spreadsheet_id)
            .await?
            .into_iter()
            .map(|sheet| sheet.properties.title)
            .collect())
    }

    pub async fn sheet_charts(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
    ) -> Result<Vec<EmbeddedChart>> {
        self.sheets(spreadsheet_id)
            .await?
            .into_iter()
            .find(|sheet| sheet.properties.title == sheet_name)
            .map(|sheet| sheet.charts)
            .ok_or_else(|| GoogleError::NotFound(format!("Sheet '{}'", sheet_name)))
    }

    /// Writes the table (header row first) starting at `starting_cell` (default `A1`).
    pub async fn write_table(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        table: &DataTable,
        starting_cell: Option<&str>,
    ) -> Result<UpdateSummary> {
        let range = a1_range(sheet_name, Some(starting_cell.unwrap_or("A1")));
        let body = json!({
            "valueInputOption": "USER_ENTERED",
            "data": [{ "range": range, "values": table.to_values() }],
        });

        let request = ApiRequest::post(
            GoogleApi::Sheets,
            &format!("spreadsheets/{}/values:batchUpdate", spreadsheet_id),
        )
        .json(body);

        let value = self.transport.send_json(request).await?;
        let summary: UpdateSummary = serde_json::from_value(value)?;
        tracing::info!(
            "Wrote {} cells to {} in {}",
            summary.total_updated_cells,
            range,
            spreadsheet_id
        );
        Ok(summary)
    }

    /// Formatted cell values of a range, as Sheets returns them (ragged rows).
    pub async fn read_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<Value>>> {
        let request = ApiRequest::get(
            GoogleApi::Sheets,
            &format!(
                "spreadsheets/{}/values/{}",
                spreadsheet_id,
                urlencoding::encode(range)
            ),
        )
        .query("valueRenderOption", "FORMATTED_VALUE");

        let value = self.transport.send_json(request).await?;
        let values = value.get("values").cloned().unwrap_or_else(|| json!([]));
        Ok(serde_json::from_value(values)?)
    }

    pub async fn read_table(&self, spreadsheet_id: &str, options: &ReadOptions) -> Result<DataTable> {
        let sheet = options.sheet_name.as_deref().ok_or_else(|| {
            GoogleError::InvalidArgument("A sheet name is required to read a table".to_string())
        })?;
        let range = a1_range(sheet, options.range.as_deref());
        let values = self.read_values(spreadsheet_id, &range).await?;
        Ok(DataTable::from_values(&values, options.header))
    }

    /// Clears values (formatting stays) of a whole sheet or of a range in it.
    pub async fn clear(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        range: Option<&str>,
    ) -> Result<()> {
        let range = a1_range(sheet_name, range);
        let request = ApiRequest::post(
            GoogleApi::Sheets,
            &format!(
                "spreadsheets/{}/values/{}:clear",
                spreadsheet_id,
                urlencoding::encode(&range)
            ),
        )
        .json(json!({}));

        self.transport.send_json(request).await?;
        tracing::info!("Cleared {} in {}", range, spreadsheet_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::HeaderMode;
    use crate::infra::transport::InMemoryTransport;

    fn service() -> (Arc<InMemoryTransport>, SheetsService<InMemoryTransport>) {
        let transport = Arc::new(InMemoryTransport::new());
        (Arc::clone(&transport), SheetsService::new(transport))
    }

    #[tokio::test]
    async fn write_table_sends_header_then_rows_as_user_entered() {
        let (transport, sheets) = service();
        transport.push_json(json!({ "totalUpdatedCells": 4, "totalUpdatedRows": 2 }));
        let table = DataTable::new(
            vec!["name".into(), "qty".into()],
            vec![vec!["apples".into(), "3".into()]],
        )
        .unwrap();

        let summary = sheets
            .write_table("s1", "Stock", &table, None)
            .await
            .unwrap();

        assert_eq!(summary.total_updated_cells, 4);
        let request = &transport.requests()[0];
        assert!(request.url.ends_with("spreadsheets/s1/values:batchUpdate"));
        assert_eq!(
            request.json_body().unwrap(),
            &json!({
                "valueInputOption": "USER_ENTERED",
                "data": [{ "range": "Stock!A1", "values": [["name", "qty"], ["apples", "3"]] }]
            })
        );
    }

    #[tokio::test]
    async fn read_table_encodes_range_and_builds_table() {
        let (transport, sheets) = service();
        transport.push_json(json!({
            "range": "'Q1 Sales'!A1:C3",
            "values": [["a", "b"], ["1", "2", "3"]]
        }));

        let options = ReadOptions {
            sheet_name: Some("Q1 Sales".into()),
            range: Some("A1:C3".into()),
            header: HeaderMode::Generated,
        };
        let table = sheets.read_table("s1", &options).await.unwrap();

        assert_eq!(table.columns(), &["A", "B", "C"]);
        assert_eq!(table.shape(), (2, 3));
        let request = &transport.requests()[0];
        assert!(request.url.ends_with("values/%27Q1%20Sales%27%21A1%3AC3"));
        assert_eq!(request.query_value("valueRenderOption"), Some("FORMATTED_VALUE"));
    }

    #[tokio::test]
    async fn add_sheet_returns_the_new_properties() {
        let (transport, sheets) = service();
        transport.push_json(json!({
            "spreadsheetId": "s1",
            "replies": [{ "addSheet": { "properties": { "sheetId": 99, "title": "New", "index": 2 } } }]
        }));

        let properties = sheets.add_sheet("s1", "New").await.unwrap();

        assert_eq!(properties.sheet_id, 99);
        assert_eq!(
            transport.requests()[0].json_body().unwrap()["requests"][0]["addSheet"]["properties"]["title"],
            "New"
        );
    }

    #[tokio::test]
    async fn sheet_charts_of_unknown_sheet_is_not_found() {
        let (transport, sheets) = service();
        transport.push_json(json!({ "sheets": [{ "properties": { "sheetId": 0, "title": "Sheet1" } }] }));

        let err = sheets.sheet_charts("s1", "Missing").await.unwrap_err();
        assert!(matches!(err, GoogleError::NotFound(_)));
    }

    #[tokio::test]
    async fn clear_targets_the_whole_sheet_without_range() {
        let (transport, sheets) = service();
        transport.push_json(json!({ "clearedRange": "Data!A1:Z1000" }));

        sheets.clear("s1", "Data", None).await.unwrap();

        assert!(transport.requests()[0].url.ends_with("values/Data:clear"));
    }
}

use async_trait::async_trait;
use chrono_tz::Tz;

use super::sheets_models::{ReadOptions, Sheet, SheetProperties, SpreadsheetInfo, UpdateSummary};
use super::sheets_service::SheetsService;
use crate::core::drive::{ensure_mime, DriveFile, DriveItem, DriveService, MimeType, ShareOptions};
use crate::core::error::{GoogleError, Result};
use crate::core::table::DataTable;
use crate::core::transport::GoogleTransport;

/// A Google Sheets file. Spreadsheet info is fetched on first use and kept
/// until a structural change invalidates it.
pub struct Spreadsheet<T: GoogleTransport> {
    file: DriveFile,
    drive: DriveService<T>,
    sheets: SheetsService<T>,
    info: Option<SpreadsheetInfo>,
}

impl<T: GoogleTransport + 'static> Spreadsheet<T> {
    pub fn from_file(drive: DriveService<T>, sheets: SheetsService<T>, file: DriveFile) -> Result<Self> {
        ensure_mime(&file, &MimeType::Spreadsheet)?;
        Ok(Self {
            file,
            drive,
            sheets,
            info: None,
        })
    }

    pub async fn open(drive: DriveService<T>, sheets: SheetsService<T>, id: &str) -> Result<Self> {
        let file = drive.get(id).await?;
        Self::from_file(drive, sheets, file)
    }

    /// Creates an empty spreadsheet through Drive so it can be placed in a folder.
    pub async fn create(
        drive: DriveService<T>,
        sheets: SheetsService<T>,
        name: &str,
        parent: Option<&str>,
        transfer_permissions: Option<ShareOptions>,
    ) -> Result<Self> {
        let file = drive
            .create(name, &MimeType::Spreadsheet, parent, transfer_permissions)
            .await?;
        Self::from_file(drive, sheets, file)
    }

    pub async fn info(&mut self) -> Result<&SpreadsheetInfo> {
        if self.info.is_none() {
            let info = self.sheets.get_info(&self.file.id, false).await?;
            self.info = Some(info);
        }
        self.info
            .as_ref()
            .ok_or_else(|| GoogleError::NotFound(format!("Spreadsheet {}", self.file.id)))
    }

    /// Drops the cached info and fetches it again.
    pub async fn refresh(&mut self) -> Result<&SpreadsheetInfo> {
        self.info = None;
        self.info().await
    }

    pub async fn locale(&mut self) -> Result<Option<String>> {
        Ok(self.info().await?.properties.locale.clone())
    }

    pub async fn time_zone(&mut self) -> Result<Option<Tz>> {
        match self.info().await?.properties.time_zone.as_deref() {
            Some(name) => name
                .parse::<Tz>()
                .map(Some)
                .map_err(|e| GoogleError::Decode(format!("Unknown time zone '{}': {}", name, e))),
            None => Ok(None),
        }
    }

    pub async fn sheets(&mut self) -> Result<&[Sheet]> {
        Ok(self.info().await?.sheets.as_slice())
    }

    pub async fn sheet_ids(&mut self) -> Result<Vec<i64>> {
        Ok(self
            .sheets()
            .await?
            .iter()
            .map(|s| s.properties.sheet_id)
            .collect())
    }

    pub async fn sheet_names(&mut self) -> Result<Vec<String>> {
        Ok(self
            .sheets()
            .await?
            .iter()
            .map(|s| s.properties.title.clone())
            .collect())
    }

    pub async fn sheet_by_name(&mut self, name: &str) -> Result<SheetProperties> {
        self.sheets()
            .await?
            .iter()
            .find(|s| s.properties.title == name)
            .map(|s| s.properties.clone())
            .ok_or_else(|| GoogleError::NotFound(format!("Sheet '{}'", name)))
    }

    /// Adds a sheet and records it in the cached info from the API reply.
    pub async fn add_sheet(&mut self, name: &str) -> Result<SheetProperties> {
        let properties = self.sheets.add_sheet(&self.file.id, name).await?;
        if let Some(info) = self.info.as_mut() {
            info.sheets.push(Sheet {
                properties: properties.clone(),
                charts: Vec::new(),
            });
        }
        tracing::info!("Added sheet '{}' to {}", name, self.file.id);
        Ok(properties)
    }

    pub async fn delete_sheet(&mut self, sheet_id: i64) -> Result<()> {
        self.sheets.delete_sheet(&self.file.id, sheet_id).await?;
        self.refresh().await?;
        Ok(())
    }

    /// Changes the spreadsheet title (which is also its Drive name).
    pub async fn change_title(&mut self, title: &str) -> Result<()> {
        self.sheets.change_title(&self.file.id, title).await?;
        self.file.name = title.to_string();
        if let Some(info) = self.info.as_mut() {
            info.properties.title = title.to_string();
        }
        Ok(())
    }

    /// Reads a table. Without a sheet name the first sheet is used.
    pub async fn read_table(&mut self, options: &ReadOptions) -> Result<DataTable> {
        let mut options = options.clone();
        if options.sheet_name.is_none() {
            let first = self
                .sheets()
                .await?
                .first()
                .map(|s| s.properties.title.clone())
                .ok_or_else(|| GoogleError::NotFound("Spreadsheet has no sheets".to_string()))?;
            options.sheet_name = Some(first);
        }
        self.sheets.read_table(&self.file.id, &options).await
    }

    pub async fn write_table(
        &self,
        sheet_name: &str,
        table: &DataTable,
        starting_cell: Option<&str>,
    ) -> Result<UpdateSummary> {
        self.sheets
            .write_table(&self.file.id, sheet_name, table, starting_cell)
            .await
    }

    pub async fn clear(&self, sheet_name: &str, range: Option<&str>) -> Result<()> {
        self.sheets.clear(&self.file.id, sheet_name, range).await
    }
}

#[async_trait]
impl<T: GoogleTransport + 'static> DriveItem for Spreadsheet<T> {
    type Transport = T;

    fn file(&self) -> &DriveFile {
        &self.file
    }

    fn file_mut(&mut self) -> &mut DriveFile {
        &mut self.file
    }

    fn drive(&self) -> &DriveService<T> {
        &self.drive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::transport::InMemoryTransport;
    use serde_json::json;
    use std::sync::Arc;

    fn handle(transport: &Arc<InMemoryTransport>) -> Spreadsheet<InMemoryTransport> {
        let file: DriveFile = serde_json::from_value(json!({
            "id": "s1",
            "name": "Budget",
            "mimeType": "application/vnd.google-apps.spreadsheet"
        }))
        .unwrap();
        Spreadsheet::from_file(
            DriveService::new(Arc::clone(transport)),
            SheetsService::new(Arc::clone(transport)),
            file,
        )
        .unwrap()
    }

    fn info_json() -> serde_json::Value {
        json!({
            "spreadsheetId": "s1",
            "properties": { "title": "Budget", "locale": "es_ES", "timeZone": "Europe/Madrid" },
            "sheets": [
                { "properties": { "sheetId": 0, "title": "Summary" } },
                { "properties": { "sheetId": 5, "title": "Raw" } }
            ]
        })
    }

    #[tokio::test]
    async fn info_is_fetched_once() {
        let transport = Arc::new(InMemoryTransport::new());
        let mut sheet = handle(&transport);
        transport.push_json(info_json());

        assert_eq!(sheet.locale().await.unwrap().as_deref(), Some("es_ES"));
        assert_eq!(sheet.time_zone().await.unwrap(), Some(chrono_tz::Europe::Madrid));
        assert_eq!(sheet.sheet_ids().await.unwrap(), vec![0, 5]);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn add_sheet_updates_cached_sheets_without_refetch() {
        let transport = Arc::new(InMemoryTransport::new());
        let mut sheet = handle(&transport);
        transport.push_json(info_json());
        transport.push_json(json!({
            "replies": [{ "addSheet": { "properties": { "sheetId": 8, "title": "Extra", "index": 2 } } }]
        }));

        sheet.info().await.unwrap();
        sheet.add_sheet("Extra").await.unwrap();

        assert_eq!(
            sheet.sheet_names().await.unwrap(),
            vec!["Summary", "Raw", "Extra"]
        );
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn delete_sheet_refreshes_info() {
        let transport = Arc::new(InMemoryTransport::new());
        let mut sheet = handle(&transport);
        transport.push_json(json!({ "replies": [{}] }));
        transport.push_json(json!({
            "spreadsheetId": "s1",
            "sheets": [{ "properties": { "sheetId": 0, "title": "Summary" } }]
        }));

        sheet.delete_sheet(5).await.unwrap();

        assert_eq!(sheet.sheet_ids().await.unwrap(), vec![0]);
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn read_table_defaults_to_first_sheet() {
        let transport = Arc::new(InMemoryTransport::new());
        let mut sheet = handle(&transport);
        transport.push_json(info_json());
        transport.push_json(json!({ "values": [["k", "v"], ["a", "1"]] }));

        let table = sheet.read_table(&ReadOptions::default()).await.unwrap();

        assert_eq!(table.shape(), (1, 2));
        assert!(transport.requests()[1].url.ends_with("values/Summary"));
    }

    #[test]
    fn wrong_mime_type_is_rejected() {
        let transport = Arc::new(InMemoryTransport::new());
        let file: DriveFile = serde_json::from_value(json!({
            "id": "d1",
            "mimeType": "application/vnd.google-apps.document"
        }))
        .unwrap();

        let result = Spreadsheet::from_file(
            DriveService::new(Arc::clone(&transport)),
            SheetsService::new(transport),
            file,
        );
        assert!(matches!(result, Err(GoogleError::WrongMimeType { .. })));
    }
}

pub mod sheets_models;
pub mod sheets_service;
pub mod spreadsheet;

pub use sheets_models::{
    EmbeddedChart, GridProperties, ReadOptions, Sheet, SheetProperties, SheetsRequest,
    SpreadsheetInfo, SpreadsheetProperties, UpdateSummary,
};
pub use sheets_service::SheetsService;
pub use spreadsheet::Spreadsheet;

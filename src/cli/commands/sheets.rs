use std::path::PathBuf;

use clap::Subcommand;

use super::output::{parse_rows, print_rows};
use crate::cli::Session;
use gworkspace::core::sheets::ReadOptions;
use gworkspace::core::table::{DataTable, HeaderMode};

#[derive(Subcommand)]
pub enum SheetsCommand {
    /// List the sheet names of a spreadsheet
    Names { spreadsheet_id: String },

    /// Print a sheet (or a range of it) as tab-separated rows
    Read {
        spreadsheet_id: String,
        /// Sheet name (defaults to the first sheet)
        #[arg(long)]
        sheet: Option<String>,
        /// A1 range inside the sheet, e.g. A1:D20
        #[arg(long)]
        range: Option<String>,
        /// The data has no header row; columns are named A, B, C...
        #[arg(long)]
        no_header: bool,
    },

    /// Write a tab-separated file (header row first) into a sheet
    Write {
        spreadsheet_id: String,
        sheet: String,
        file: PathBuf,
        /// Top-left cell of the written block
        #[arg(long, default_value = "A1")]
        start: String,
    },

    /// Clear the values of a sheet or a range in it
    Clear {
        spreadsheet_id: String,
        sheet: String,
        #[arg(long)]
        range: Option<String>,
    },
}

pub async fn run(session: &Session, command: SheetsCommand) -> anyhow::Result<()> {
    let workspace = &session.workspace;

    match command {
        SheetsCommand::Names { spreadsheet_id } => {
            for name in workspace.sheets.sheet_names(&spreadsheet_id).await? {
                println!("{}", name);
            }
        }
        SheetsCommand::Read {
            spreadsheet_id,
            sheet,
            range,
            no_header,
        } => {
            let mut spreadsheet = workspace.open_spreadsheet(&spreadsheet_id).await?;
            let options = ReadOptions {
                sheet_name: sheet,
                range,
                header: if no_header {
                    HeaderMode::Generated
                } else {
                    HeaderMode::FirstRow
                },
            };
            let table = spreadsheet.read_table(&options).await?;
            print_rows(std::iter::once(table.columns()).chain(table.rows().iter().map(Vec::as_slice)));
        }
        SheetsCommand::Write {
            spreadsheet_id,
            sheet,
            file,
            start,
        } => {
            let text = tokio::fs::read_to_string(&file).await?;
            let table = DataTable::from_rows(parse_rows(&text), HeaderMode::FirstRow);
            let summary = workspace
                .sheets
                .write_table(&spreadsheet_id, &sheet, &table, Some(&start))
                .await?;
            println!("{} cells updated", summary.total_updated_cells);
        }
        SheetsCommand::Clear {
            spreadsheet_id,
            sheet,
            range,
        } => {
            workspace
                .sheets
                .clear(&spreadsheet_id, &sheet, range.as_deref())
                .await?;
        }
    }

    Ok(())
}

// Tabular data exchanged with Sheets and Slides tables.
//
// Google returns ranges as ragged rows of cells (trailing empty cells are
// omitted), so everything that comes in is padded to a rectangular shape.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::error::{GoogleError, Result};

/// Where the column names of a table come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderMode {
    /// The first row holds the column names.
    #[default]
    FirstRow,
    /// Skip `n` rows, then use the next row as header.
    Row(usize),
    /// No header in the data: columns are named A, B, C, ...
    Generated,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Builds a table, padding short rows with empty cells.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let width = columns.len();
        let mut padded = Vec::with_capacity(rows.len());
        for (index, mut row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(GoogleError::InvalidArgument(format!(
                    "Row {} has {} cells but the table has {} columns",
                    index,
                    row.len(),
                    width
                )));
            }
            row.resize(width, String::new());
            padded.push(row);
        }

        Ok(Self {
            columns,
            rows: padded,
        })
    }

    /// Builds a table from a Sheets `values` array.
    pub fn from_values(values: &[Vec<Value>], header: HeaderMode) -> Self {
        let rows: Vec<Vec<String>> = values
            .iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();
        Self::from_rows(rows, header)
    }

    /// Builds a table from rows of text cells.
    pub fn from_rows(mut rows: Vec<Vec<String>>, header: HeaderMode) -> Self {
        let mut columns = match header {
            HeaderMode::Generated => Vec::new(),
            HeaderMode::FirstRow | HeaderMode::Row(_) => {
                let skip = match header {
                    HeaderMode::Row(n) => n,
                    _ => 0,
                };
                if rows.len() <= skip {
                    return Self::default();
                }
                rows.drain(..skip);
                rows.remove(0)
            }
        };

        let width = rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(columns.len());

        // Columns past the end of a short header fall back to their letter.
        for index in columns.len()..width {
            columns.push(column_name(index + 1));
        }

        for row in rows.iter_mut() {
            row.resize(width, String::new());
        }

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// (rows, columns), header excluded.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
    }

    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[index].as_str()).collect())
    }

    /// Rows keyed by the value of `column`. Later duplicates win.
    pub fn index_by(&self, column: &str) -> Result<BTreeMap<String, Vec<String>>> {
        let index = self
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| GoogleError::NotFound(format!("Column '{}'", column)))?;
        Ok(self
            .rows
            .iter()
            .map(|row| (row[index].clone(), row.clone()))
            .collect())
    }

    /// Header row followed by the data rows, ready for a `values` update.
    pub fn to_values(&self) -> Vec<Vec<String>> {
        let mut values = Vec::with_capacity(self.rows.len() + 1);
        values.push(self.columns.clone());
        values.extend(self.rows.iter().cloned());
        values
    }

    /// Iterates every data cell as (row, column, text).
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &str)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(move |(c, cell)| (r, c, cell.as_str()))
        })
    }
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Spreadsheet column letter for a 1-based index: 1 -> A, 26 -> Z, 27 -> AA.
pub fn column_name(mut index: usize) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let remainder = (index - 1) % 26;
        letters.push((b'A' + remainder as u8) as char);
        index = (index - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// The first `count` column letters.
pub fn column_names(count: usize) -> Vec<String> {
    (1..=count).map(column_name).collect()
}

// Bare names Sheets would parse as a cell reference (Q1, AB12, R1C1, RC).
static CELL_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z]{1,3}[0-9]+|[Rr][0-9]*[Cc][0-9]*)$")
        .expect("cell reference regex is valid")
});

/// A1 notation for a range on a named sheet, quoting the sheet name when needed.
pub fn a1_range(sheet: &str, range: Option<&str>) -> String {
    let needs_quotes = !sheet
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
        || sheet.starts_with(|c: char| c.is_ascii_digit())
        || CELL_LIKE.is_match(sheet);
    let sheet = if needs_quotes {
        format!("'{}'", sheet.replace('\'', "''"))
    } else {
        sheet.to_string()
    };

    match range {
        Some(range) if !range.is_empty() => format!("{}!{}", sheet, range),
        _ => sheet,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn column_names_follow_spreadsheet_lettering() {
        assert_eq!(column_name(1), "A");
        assert_eq!(column_name(26), "Z");
        assert_eq!(column_name(27), "AA");
        assert_eq!(column_name(52), "AZ");
        assert_eq!(column_name(703), "AAA");
        assert_eq!(column_names(3), vec!["A", "B", "C"]);
    }

    #[test]
    fn index_by_keys_rows_on_a_column() {
        let table = DataTable::from_rows(
            vec![
                vec!["id".into(), "city".into()],
                vec!["7".into(), "Lima".into()],
                vec!["9".into(), "Oslo".into()],
            ],
            HeaderMode::FirstRow,
        );

        let index = table.index_by("id").unwrap();
        assert_eq!(index["9"], vec!["9", "Oslo"]);
        assert!(table.index_by("missing").is_err());
    }

    #[test]
    fn first_row_header_pads_ragged_rows() {
        let values = vec![
            vec![json!("name"), json!("score")],
            vec![json!("ana"), json!(3)],
            vec![json!("bo")],
        ];
        let table = DataTable::from_values(&values, HeaderMode::FirstRow);

        assert_eq!(table.columns(), &["name".to_string(), "score".to_string()]);
        assert_eq!(table.shape(), (2, 2));
        assert_eq!(table.cell(0, 1), Some("3"));
        assert_eq!(table.cell(1, 1), Some(""));
        assert_eq!(table.column("name"), Some(vec!["ana", "bo"]));
    }

    #[test]
    fn generated_header_uses_widest_row() {
        let values = vec![vec![json!("a")], vec![json!("b"), json!("c"), json!("d")]];
        let table = DataTable::from_values(&values, HeaderMode::Generated);

        assert_eq!(table.columns(), &["A", "B", "C"]);
        assert_eq!(table.shape(), (2, 3));
    }

    #[test]
    fn header_row_offset_skips_leading_rows() {
        let rows = vec![
            vec!["Report".to_string()],
            vec!["x".to_string(), "y".to_string()],
            vec!["1".to_string(), "2".to_string(), "3".to_string()],
        ];
        let table = DataTable::from_rows(rows, HeaderMode::Row(1));

        assert_eq!(table.columns(), &["x", "y", "C"]);
        assert_eq!(table.rows().len(), 1);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let table = DataTable::from_rows(Vec::new(), HeaderMode::FirstRow);
        assert!(table.is_empty());
        assert_eq!(table.shape(), (0, 0));
    }

    #[test]
    fn new_rejects_rows_wider_than_header() {
        let result = DataTable::new(vec!["a".into()], vec![vec!["1".into(), "2".into()]]);
        assert!(matches!(result, Err(GoogleError::InvalidArgument(_))));
    }

    #[test]
    fn to_values_puts_header_first() {
        let table = DataTable::new(
            vec!["a".into(), "b".into()],
            vec![vec!["1".into()]],
        )
        .unwrap();
        assert_eq!(
            table.to_values(),
            vec![vec!["a", "b"], vec!["1", ""]]
        );
    }

    #[test]
    fn a1_range_quotes_sheet_names_when_needed() {
        assert_eq!(a1_range("Sheet1", Some("A1:C3")), "Sheet1!A1:C3");
        assert_eq!(a1_range("My Sheet", None), "'My Sheet'");
        assert_eq!(a1_range("Bob's", Some("A1")), "'Bob''s'!A1");
    }

    #[test]
    fn a1_range_quotes_names_that_read_as_cells() {
        assert_eq!(a1_range("Q1", None), "'Q1'");
        assert_eq!(a1_range("AB12", Some("A1:B2")), "'AB12'!A1:B2");
        assert_eq!(a1_range("R1C1", None), "'R1C1'");
        assert_eq!(a1_range("rc", None), "'rc'");
        assert_eq!(a1_range("2024", None), "'2024'");
        assert_eq!(a1_range("ABCD1", None), "ABCD1");
        assert_eq!(a1_range("Summary", None), "Summary");
    }
}

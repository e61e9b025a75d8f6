// Request builders for styling a table on a slide.

use serde_json::json;

use super::slides_models::{PageElement, ThemeColorPair};
use super::slides_requests::{
    Dimension, OpaqueColor, OptionalColor, RgbColor, SlidesRequest, TableCellLocation, TableRange,
    TextRange, TextStyle, UpdateTableCellProperties, UpdateTextStyle,
};
use crate::core::error::{GoogleError, Result};

/// A colour given either explicitly or by master colour-scheme name (`DARK1`, `ACCENT2`...).
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpec {
    Rgb(RgbColor),
    Theme(String),
}

impl ColorSpec {
    pub fn theme(name: &str) -> Self {
        ColorSpec::Theme(name.to_string())
    }

    pub fn resolve(&self, scheme: &[ThemeColorPair]) -> Result<RgbColor> {
        match self {
            ColorSpec::Rgb(color) => {
                color.validate()?;
                Ok(*color)
            }
            ColorSpec::Theme(name) => scheme
                .iter()
                .find(|pair| &pair.kind == name)
                .map(|pair| pair.color)
                .ok_or_else(|| {
                    GoogleError::InvalidArgument(format!(
                        "Color '{}' is not one of the master colors",
                        name
                    ))
                }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderStyle {
    pub header_rows: usize,
    pub header_cols: usize,
    pub fill: ColorSpec,
    pub text_color: ColorSpec,
    pub bold: bool,
    /// Falls back to the first master font, then Arial.
    pub font: Option<String>,
    pub size: f64,
}

impl Default for HeaderStyle {
    fn default() -> Self {
        Self {
            header_rows: 1,
            header_cols: 0,
            fill: ColorSpec::theme("DARK1"),
            text_color: ColorSpec::theme("LIGHT1"),
            bold: true,
            font: None,
            size: 18.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideTable {
    pub table_id: String,
    pub n_rows: usize,
    pub n_cols: usize,
}

impl SlideTable {
    pub fn new(table_id: &str, n_rows: usize, n_cols: usize) -> Self {
        Self {
            table_id: table_id.to_string(),
            n_rows,
            n_cols,
        }
    }

    pub fn from_element(element: &PageElement) -> Result<Self> {
        let table = element.table.as_ref().ok_or_else(|| {
            GoogleError::InvalidArgument(format!("Element {} is not a table", element.object_id))
        })?;
        Ok(Self::new(&element.object_id, table.rows, table.columns))
    }

    /// Background fill for the block starting at the top-left cell.
    pub fn fill_cells(&self, row_span: usize, col_span: usize, color: RgbColor) -> SlidesRequest {
        SlidesRequest::UpdateTableCellProperties(UpdateTableCellProperties {
            object_id: self.table_id.clone(),
            table_range: TableRange {
                location: TableCellLocation::default(),
                row_span: row_span.min(self.n_rows),
                column_span: col_span.min(self.n_cols),
            },
            table_cell_properties: json!({
                "tableCellBackgroundFill": { "solidFill": { "color": { "rgbColor": color } } }
            }),
            fields: "tableCellBackgroundFill.solidFill.color".to_string(),
        })
    }

    pub fn color_text_cell(
        &self,
        row: usize,
        col: usize,
        color: RgbColor,
        bold: bool,
        font: &str,
        size: f64,
    ) -> SlidesRequest {
        SlidesRequest::UpdateTextStyle(UpdateTextStyle {
            object_id: self.table_id.clone(),
            cell_location: Some(TableCellLocation {
                row_index: row,
                column_index: col,
            }),
            style: TextStyle {
                foreground_color: Some(OptionalColor {
                    opaque_color: OpaqueColor { rgb_color: color },
                }),
                bold: Some(bold),
                font_family: Some(font.to_string()),
                font_size: Some(Dimension::pt(size)),
            },
            text_range: TextRange::all(),
            fields: "foregroundColor,bold,fontFamily,fontSize".to_string(),
        })
    }

    pub fn fill_header(&self, header_rows: usize, header_cols: usize, color: RgbColor) -> Vec<SlidesRequest> {
        let header_rows = header_rows.min(self.n_rows);
        let header_cols = header_cols.min(self.n_cols);
        let mut requests = Vec::new();
        if header_rows > 0 {
            requests.push(self.fill_cells(header_rows, self.n_cols, color));
        }
        if header_cols > 0 {
            requests.push(self.fill_cells(self.n_rows, header_cols, color));
        }
        requests
    }

    /// Text style for every header cell. Cells in both a header row and a
    /// header column are styled once.
    pub fn color_text_header(
        &self,
        header_rows: usize,
        header_cols: usize,
        color: RgbColor,
        bold: bool,
        font: &str,
        size: f64,
    ) -> Vec<SlidesRequest> {
        let mut requests = Vec::new();
        for row in 0..header_rows.min(self.n_rows) {
            for col in 0..self.n_cols {
                requests.push(self.color_text_cell(row, col, color, bold, font, size));
            }
        }
        for col in 0..header_cols.min(self.n_cols) {
            for row in header_rows.min(self.n_rows)..self.n_rows {
                requests.push(self.color_text_cell(row, col, color, bold, font, size));
            }
        }
        requests
    }

    /// Fill and text requests for `style`, with colours resolved against `scheme`.
    pub fn header_requests(
        &self,
        style: &HeaderStyle,
        scheme: &[ThemeColorPair],
        default_font: &str,
    ) -> Result<Vec<SlidesRequest>> {
        let fill = style.fill.resolve(scheme)?;
        let text = style.text_color.resolve(scheme)?;
        let font = style.font.as_deref().unwrap_or(default_font);

        let mut requests = self.fill_header(style.header_rows, style.header_cols, fill);
        requests.extend(self.color_text_header(
            style.header_rows,
            style.header_cols,
            text,
            style.bold,
            font,
            style.size,
        ));
        Ok(requests)
    }
}

// Typed Slides `batchUpdate` requests.
//
// Each variant serializes to the single-key object the API expects, e.g.
// `{"replaceAllText": {...}}`. A `BatchUpdate` collects them so several
// mutations go out in one call.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::api::GoogleApi;
use crate::core::error::{GoogleError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Unit {
    #[default]
    Emu,
    Pt,
    UnitUnspecified,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimension {
    #[serde(default)]
    pub magnitude: f64,
    #[serde(default)]
    pub unit: Unit,
}

impl Dimension {
    pub fn emu(magnitude: f64) -> Self {
        Self {
            magnitude,
            unit: Unit::Emu,
        }
    }

    pub fn pt(magnitude: f64) -> Self {
        Self {
            magnitude,
            unit: Unit::Pt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    #[serde(default)]
    pub width: Dimension,
    #[serde(default)]
    pub height: Dimension,
}

impl Size {
    pub fn emu(width: f64, height: f64) -> Self {
        Self {
            width: Dimension::emu(width),
            height: Dimension::emu(height),
        }
    }
}

impl Default for Size {
    fn default() -> Self {
        Size::emu(3_000_000.0, 3_000_000.0)
    }
}

fn one() -> f64 {
    1.0
}

/// Affine transform of a page element. Defaults to identity in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    #[serde(default = "one")]
    pub scale_x: f64,
    #[serde(default = "one")]
    pub scale_y: f64,
    #[serde(default)]
    pub shear_x: f64,
    #[serde(default)]
    pub shear_y: f64,
    #[serde(default)]
    pub translate_x: f64,
    #[serde(default)]
    pub translate_y: f64,
    #[serde(default)]
    pub unit: Unit,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            shear_x: 0.0,
            shear_y: 0.0,
            translate_x: 0.0,
            translate_y: 0.0,
            unit: Unit::Emu,
        }
    }
}

impl Transform {
    pub fn translate(x: f64, y: f64) -> Self {
        Self {
            translate_x: x,
            translate_y: y,
            ..Self::default()
        }
    }
}

/// RGB colour with channels in `0.0..=1.0`. Missing channels count as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RgbColor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub red: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub green: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blue: Option<f64>,
}

impl RgbColor {
    pub fn new(red: f64, green: f64, blue: f64) -> Self {
        Self {
            red: Some(red),
            green: Some(green),
            blue: Some(blue),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.red.is_none() && self.green.is_none() && self.blue.is_none() {
            return Err(GoogleError::InvalidArgument(
                "At least one of red, green, blue must be set".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplaceMethod {
    CenterInside,
    CenterCrop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkingMode {
    #[default]
    NotLinkedImage,
    Linked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplyMode {
    #[default]
    Absolute,
    Relative,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstringMatch {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_case: Option<bool>,
}

impl SubstringMatch {
    /// Matches `{{name}}`.
    pub fn placeholder(name: &str) -> Self {
        Self {
            text: placeholder(name),
            match_case: None,
        }
    }

    pub fn exact(text: &str) -> Self {
        Self {
            text: text.to_string(),
            match_case: Some(true),
        }
    }
}

pub fn placeholder(name: &str) -> String {
    format!("{{{{{}}}}}", name)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementProperties {
    pub page_object_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
}

impl ElementProperties {
    pub fn on_page(page_id: &str) -> Self {
        Self {
            page_object_id: page_id.to_string(),
            size: None,
            transform: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCellLocation {
    #[serde(default)]
    pub row_index: usize,
    #[serde(default)]
    pub column_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRange {
    pub location: TableCellLocation,
    pub row_span: usize,
    pub column_span: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextRange {
    #[serde(rename = "type")]
    pub kind: TextRangeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextRangeType {
    All,
}

impl TextRange {
    pub fn all() -> Self {
        Self {
            kind: TextRangeType::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpaqueColor {
    pub rgb_color: RgbColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionalColor {
    pub opaque_color: OpaqueColor,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<OptionalColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<Dimension>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutReference {
    PredefinedLayout(String),
    LayoutId(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceAllText {
    pub contains_text: SubstringMatch,
    pub replace_text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub page_object_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateImage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    pub url: String,
    pub element_properties: ElementProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceAllShapesWithImage {
    pub image_url: String,
    pub replace_method: ReplaceMethod,
    pub contains_text: SubstringMatch,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub page_object_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceAllShapesWithSheetsChart {
    pub contains_text: SubstringMatch,
    pub spreadsheet_id: String,
    pub chart_id: i64,
    pub linking_mode: LinkingMode,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub page_object_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    pub object_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteText {
    pub object_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_location: Option<TableCellLocation>,
    pub text_range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePageElementTransform {
    pub object_id: String,
    pub transform: Transform,
    pub apply_mode: ApplyMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSlidesPosition {
    pub slide_object_ids: Vec<String>,
    pub insertion_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlide {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insertion_index: Option<usize>,
    pub slide_layout_reference: LayoutReference,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShape {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    pub shape_type: String,
    pub element_properties: ElementProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    pub element_properties: ElementProperties,
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertText {
    pub object_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_location: Option<TableCellLocation>,
    pub text: String,
    pub insertion_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTableCellProperties {
    pub object_id: String,
    pub table_range: TableRange,
    pub table_cell_properties: Value,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTextStyle {
    pub object_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_location: Option<TableCellLocation>,
    pub style: TextStyle,
    pub text_range: TextRange,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SlidesRequest {
    ReplaceAllText(ReplaceAllText),
    CreateImage(CreateImage),
    ReplaceAllShapesWithImage(ReplaceAllShapesWithImage),
    ReplaceAllShapesWithSheetsChart(ReplaceAllShapesWithSheetsChart),
    DuplicateObject(ObjectRef),
    DeleteObject(ObjectRef),
    DeleteText(DeleteText),
    UpdatePageElementTransform(UpdatePageElementTransform),
    UpdateSlidesPosition(UpdateSlidesPosition),
    CreateSlide(CreateSlide),
    CreateShape(CreateShape),
    CreateTable(CreateTable),
    InsertText(InsertText),
    UpdateTableCellProperties(UpdateTableCellProperties),
    UpdateTextStyle(UpdateTextStyle),
}

impl SlidesRequest {
    pub fn replace_text(placeholder_name: &str, value: &str, pages: &[String]) -> Self {
        SlidesRequest::ReplaceAllText(ReplaceAllText {
            contains_text: SubstringMatch::placeholder(placeholder_name),
            replace_text: value.to_string(),
            page_object_ids: pages.to_vec(),
        })
    }

    pub fn replace_shape_with_image(
        placeholder_name: &str,
        image_url: &str,
        pages: &[String],
        fill: bool,
    ) -> Self {
        SlidesRequest::ReplaceAllShapesWithImage(ReplaceAllShapesWithImage {
            image_url: image_url.to_string(),
            replace_method: if fill {
                ReplaceMethod::CenterCrop
            } else {
                ReplaceMethod::CenterInside
            },
            contains_text: SubstringMatch::placeholder(placeholder_name),
            page_object_ids: pages.to_vec(),
        })
    }

    /// Chart placeholders are matched literally and case-sensitively.
    pub fn replace_shape_with_chart(
        text: &str,
        spreadsheet_id: &str,
        chart_id: i64,
        linking_mode: LinkingMode,
        pages: &[String],
    ) -> Self {
        SlidesRequest::ReplaceAllShapesWithSheetsChart(ReplaceAllShapesWithSheetsChart {
            contains_text: SubstringMatch::exact(text),
            spreadsheet_id: spreadsheet_id.to_string(),
            chart_id,
            linking_mode,
            page_object_ids: pages.to_vec(),
        })
    }

    pub fn create_image(
        url: &str,
        page_id: &str,
        object_id: Option<&str>,
        size: Option<Size>,
        transform: Option<Transform>,
    ) -> Self {
        SlidesRequest::CreateImage(CreateImage {
            object_id: object_id.map(str::to_string),
            url: url.to_string(),
            element_properties: ElementProperties {
                page_object_id: page_id.to_string(),
                size,
                transform,
            },
        })
    }

    pub fn duplicate(object_id: &str) -> Self {
        SlidesRequest::DuplicateObject(ObjectRef {
            object_id: object_id.to_string(),
        })
    }

    pub fn delete_object(object_id: &str) -> Self {
        SlidesRequest::DeleteObject(ObjectRef {
            object_id: object_id.to_string(),
        })
    }

    pub fn delete_text(object_id: &str) -> Self {
        SlidesRequest::DeleteText(DeleteText {
            object_id: object_id.to_string(),
            cell_location: None,
            text_range: TextRange::all(),
        })
    }

    pub fn transform(object_id: &str, transform: Transform, apply_mode: ApplyMode) -> Self {
        SlidesRequest::UpdatePageElementTransform(UpdatePageElementTransform {
            object_id: object_id.to_string(),
            transform,
            apply_mode,
        })
    }

    pub fn move_slides(slide_ids: &[String], insertion_index: usize) -> Self {
        SlidesRequest::UpdateSlidesPosition(UpdateSlidesPosition {
            slide_object_ids: slide_ids.to_vec(),
            insertion_index,
        })
    }

    pub fn create_slide(layout: LayoutReference, insertion_index: Option<usize>) -> Self {
        SlidesRequest::CreateSlide(CreateSlide {
            object_id: None,
            insertion_index,
            slide_layout_reference: layout,
        })
    }

    pub fn create_shape(
        object_id: Option<&str>,
        shape_type: &str,
        element_properties: ElementProperties,
    ) -> Self {
        SlidesRequest::CreateShape(CreateShape {
            object_id: object_id.map(str::to_string),
            shape_type: shape_type.to_string(),
            element_properties,
        })
    }

    pub fn create_table(page_id: &str, rows: usize, columns: usize) -> Self {
        SlidesRequest::CreateTable(CreateTable {
            object_id: None,
            element_properties: ElementProperties::on_page(page_id),
            rows,
            columns,
        })
    }

    pub fn insert_cell_text(table_id: &str, row: usize, column: usize, text: &str) -> Self {
        SlidesRequest::InsertText(InsertText {
            object_id: table_id.to_string(),
            cell_location: Some(TableCellLocation {
                row_index: row,
                column_index: column,
            }),
            text: text.to_string(),
            insertion_index: 0,
        })
    }

    /// Whether the request needs more than the presentations scope.
    pub fn required_api(&self) -> Option<GoogleApi> {
        match self {
            SlidesRequest::ReplaceAllShapesWithSheetsChart(_) => Some(GoogleApi::Sheets),
            _ => None,
        }
    }
}

/// Requests bound for a single `presentations.batchUpdate` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchUpdate {
    requests: Vec<SlidesRequest>,
    additional_apis: Vec<GoogleApi>,
}

impl BatchUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: SlidesRequest) -> &mut Self {
        if let Some(api) = request.required_api() {
            self.require_api(api);
        }
        self.requests.push(request);
        self
    }

    pub fn with(mut self, request: SlidesRequest) -> Self {
        self.push(request);
        self
    }

    pub fn extend(&mut self, requests: impl IntoIterator<Item = SlidesRequest>) -> &mut Self {
        for request in requests {
            self.push(request);
        }
        self
    }

    pub fn require_api(&mut self, api: GoogleApi) -> &mut Self {
        if api != GoogleApi::Slides && !self.additional_apis.contains(&api) {
            self.additional_apis.push(api);
        }
        self
    }

    pub fn requests(&self) -> &[SlidesRequest] {
        &self.requests
    }

    pub fn additional_apis(&self) -> &[GoogleApi] {
        &self.additional_apis
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn to_body(&self) -> Value {
        json!({ "requests": self.requests })
    }
}

impl From<Vec<SlidesRequest>> for BatchUpdate {
    fn from(requests: Vec<SlidesRequest>) -> Self {
        let mut batch = BatchUpdate::new();
        batch.extend(requests);
        batch
    }
}

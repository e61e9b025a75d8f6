use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::slides_requests::{RgbColor, Size, Transform};

/// `{{name}}` occurrences in shape or cell text.
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("placeholder regex is valid"));

/// Every `{{...}}` token in `text`, braces included.
pub fn find_placeholders(text: &str) -> Vec<String> {
    PLACEHOLDER
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// The name inside the first `{{...}}` token of `text`.
pub fn placeholder_name(text: &str) -> Option<String> {
    PLACEHOLDER
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationInfo {
    pub presentation_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub page_size: Option<Size>,
    #[serde(default)]
    pub slides: Vec<Page>,
    #[serde(default)]
    pub masters: Vec<Page>,
    #[serde(default)]
    pub layouts: Vec<Page>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub object_id: String,
    #[serde(default)]
    pub page_elements: Vec<PageElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide_properties: Option<SlideProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_properties: Option<LayoutProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_properties: Option<MasterProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_properties: Option<PageProperties>,
}

impl Page {
    pub fn element(&self, object_id: &str) -> Option<&PageElement> {
        self.page_elements.iter().find(|e| e.object_id == object_id)
    }

    pub fn notes_page(&self) -> Option<&Page> {
        self.slide_properties
            .as_ref()
            .and_then(|p| p.notes_page.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideProperties {
    #[serde(default)]
    pub layout_object_id: Option<String>,
    #[serde(default)]
    pub master_object_id: Option<String>,
    #[serde(default)]
    pub notes_page: Option<Box<Page>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutProperties {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterProperties {
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageProperties {
    #[serde(default)]
    pub color_scheme: Option<ColorScheme>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorScheme {
    #[serde(default)]
    pub colors: Vec<ThemeColorPair>,
}

/// A named theme colour such as `DARK1` or `ACCENT2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeColorPair {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub color: RgbColor,
}

/// Layout as listed by `layout_types`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutType {
    pub object_id: String,
    pub name: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageElementKind {
    ElementGroup,
    Shape,
    Image,
    Video,
    Line,
    Table,
    WordArt,
    SheetsChart,
}

impl PageElementKind {
    pub const ALL: [PageElementKind; 8] = [
        PageElementKind::ElementGroup,
        PageElementKind::Shape,
        PageElementKind::Image,
        PageElementKind::Video,
        PageElementKind::Line,
        PageElementKind::Table,
        PageElementKind::WordArt,
        PageElementKind::SheetsChart,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PageElementKind::ElementGroup => "elementGroup",
            PageElementKind::Shape => "shape",
            PageElementKind::Image => "image",
            PageElementKind::Video => "video",
            PageElementKind::Line => "line",
            PageElementKind::Table => "table",
            PageElementKind::WordArt => "wordArt",
            PageElementKind::SheetsChart => "sheetsChart",
        }
    }
}

impl std::fmt::Display for PageElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageElement {
    pub object_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_art: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheets_chart: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_group: Option<Value>,
}

impl PageElement {
    pub fn kind(&self) -> Option<PageElementKind> {
        if self.element_group.is_some() {
            Some(PageElementKind::ElementGroup)
        } else if self.shape.is_some() {
            Some(PageElementKind::Shape)
        } else if self.image.is_some() {
            Some(PageElementKind::Image)
        } else if self.video.is_some() {
            Some(PageElementKind::Video)
        } else if self.line.is_some() {
            Some(PageElementKind::Line)
        } else if self.table.is_some() {
            Some(PageElementKind::Table)
        } else if self.word_art.is_some() {
            Some(PageElementKind::WordArt)
        } else if self.sheets_chart.is_some() {
            Some(PageElementKind::SheetsChart)
        } else {
            None
        }
    }

    pub fn is_any_of(&self, kinds: &[PageElementKind]) -> bool {
        match self.kind() {
            Some(kind) => kinds.is_empty() || kinds.contains(&kind),
            None => false,
        }
    }

    /// Text runs of a shape, in order.
    pub fn text_runs(&self) -> Vec<&str> {
        self.shape
            .as_ref()
            .and_then(|s| s.text.as_ref())
            .map(TextContent::runs)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    #[serde(default)]
    pub shape_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    #[serde(default)]
    pub text_elements: Vec<TextElement>,
}

impl TextContent {
    pub fn runs(&self) -> Vec<&str> {
        self.text_elements
            .iter()
            .filter_map(|e| e.text_run.as_ref())
            .map(|r| r.content.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_run: Option<TextRun>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextRun {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub style: RunStyle,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(default)]
    pub rows: usize,
    #[serde(default)]
    pub columns: usize,
    #[serde(default)]
    pub table_rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    #[serde(default)]
    pub table_cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
}

impl TableCell {
    pub fn text(&self) -> String {
        self.text
            .as_ref()
            .map(|t| t.runs().concat())
            .unwrap_or_default()
    }
}

/// Inner text of a shape as returned by `all_shapes_placeholders`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeText {
    pub inner_text: String,
    pub page_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn placeholders_do_not_span_across_tokens() {
        assert_eq!(
            find_placeholders("Hi {{first}} and {{last}}!"),
            vec!["{{first}}", "{{last}}"]
        );
        assert_eq!(placeholder_name("  {{total}}\n").as_deref(), Some("total"));
        assert!(placeholder_name("no braces").is_none());
    }

    #[test]
    fn element_kind_comes_from_the_populated_field() {
        let element: PageElement = serde_json::from_value(json!({
            "objectId": "t1",
            "table": { "rows": 2, "columns": 3 }
        }))
        .unwrap();

        assert_eq!(element.kind(), Some(PageElementKind::Table));
        assert!(element.is_any_of(&[]));
        assert!(!element.is_any_of(&[PageElementKind::Shape]));
    }

    #[test]
    fn notes_page_is_nested_under_slide_properties() {
        let page: Page = serde_json::from_value(json!({
            "objectId": "s1",
            "slideProperties": {
                "notesPage": {
                    "objectId": "n1",
                    "pageElements": [{
                        "objectId": "box",
                        "shape": {
                            "shapeType": "TEXT_BOX",
                            "text": { "textElements": [
                                { "paragraphMarker": {} },
                                { "textRun": { "content": "Say hi\n" } }
                            ]}
                        }
                    }]
                }
            }
        }))
        .unwrap();

        let notes = page.notes_page().unwrap();
        assert_eq!(notes.page_elements[0].text_runs(), vec!["Say hi\n"]);
    }
}

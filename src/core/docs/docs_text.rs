// Plain-text rendering of Docs content.
//
// Headings become markdown headings (one level below the tab titles), tables
// become pipe-separated rows.

use super::docs_models::{Body, StructuralElement, Tab};

/// Text runs of the top-level paragraphs, one entry per run.
pub fn body_runs(body: &Body) -> Vec<String> {
    body.content
        .iter()
        .filter_map(|element| element.paragraph.as_ref())
        .flat_map(|paragraph| paragraph.elements.iter())
        .filter_map(|element| element.text_run.as_ref())
        .filter_map(|run| run.content.clone())
        .collect()
}

/// Renders every tab and nested tab under a `##`-style title.
pub fn tabs_text(tabs: &[Tab], output: &mut String, depth: usize) {
    for tab in tabs {
        let hashes = "#".repeat(depth + 2);
        output.push_str(&format!("\n{} {}\n\n", hashes, tab.tab_properties.title));

        if let Some(body) = tab.document_tab.as_ref().and_then(|t| t.body.as_ref()) {
            body_text(body, output);
        }

        if !tab.child_tabs.is_empty() {
            tabs_text(&tab.child_tabs, output, depth + 1);
        }
    }
}

pub fn body_text(body: &Body, output: &mut String) {
    for element in &body.content {
        element_text(element, output);
    }
}

fn element_text(element: &StructuralElement, output: &mut String) {
    if let Some(paragraph) = &element.paragraph {
        let style = paragraph
            .paragraph_style
            .as_ref()
            .and_then(|s| s.named_style_type.as_deref());
        match style {
            Some("HEADING_1") => output.push_str("### "),
            Some("HEADING_2") => output.push_str("#### "),
            Some("HEADING_3") => output.push_str("##### "),
            _ => {}
        }

        for run in paragraph.elements.iter().filter_map(|e| e.text_run.as_ref()) {
            if let Some(content) = &run.content {
                output.push_str(content);
            }
        }
    }

    if let Some(table) = &element.table {
        output.push('\n');
        for row in &table.table_rows {
            let cells: Vec<String> = row
                .table_cells
                .iter()
                .map(|cell| {
                    let mut text = String::new();
                    for inner in &cell.content {
                        element_text(inner, &mut text);
                    }
                    text.trim().to_string()
                })
                .collect();
            output.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
        output.push('\n');
    }
}

/// Pulls a file id out of a Docs, Sheets, Slides or Drive URL. Bare ids
/// are returned unchanged.
pub fn extract_file_id(url_or_id: &str) -> Option<String> {
    let input = url_or_id.trim();
    if input.is_empty() {
        return None;
    }

    if input.contains("google.com") {
        for marker in ["/document/d/", "/spreadsheets/d/", "/presentation/d/", "/file/d/", "/folders/"] {
            if let Some(start) = input.find(marker) {
                let rest = &input[start + marker.len()..];
                let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
                let id = &rest[..end];
                if !id.is_empty() {
                    return Some(id.to_string());
                }
            }
        }
        if let Some(start) = input.find("id=") {
            let rest = &input[start + 3..];
            let end = rest.find('&').unwrap_or(rest.len());
            let id = &rest[..end];
            if !id.is_empty() {
                return Some(id.to_string());
            }
        }
        return None;
    }

    if input.contains('/') || input.contains(' ') {
        None
    } else {
        Some(input.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::docs::docs_models::DocumentInfo;
    use serde_json::json;

    #[test]
    fn extract_file_id_from_urls() {
        let cases = [
            ("https://docs.google.com/document/d/1abc123xyz/edit", "1abc123xyz"),
            ("https://docs.google.com/spreadsheets/d/sheetId/edit#gid=0", "sheetId"),
            ("https://docs.google.com/presentation/d/deck_1/edit?usp=sharing", "deck_1"),
            ("https://drive.google.com/file/d/F1/view", "F1"),
            ("https://drive.google.com/open?id=OPEN1&usp=x", "OPEN1"),
            ("1abc123xyz", "1abc123xyz"),
        ];
        for (input, expected) in cases {
            assert_eq!(extract_file_id(input).as_deref(), Some(expected), "{}", input);
        }
        assert_eq!(extract_file_id("not/an id"), None);
        assert_eq!(extract_file_id(""), None);
    }

    #[test]
    fn tabs_render_headings_and_tables() {
        let doc: DocumentInfo = serde_json::from_value(json!({
            "documentId": "d1",
            "title": "Plan",
            "tabs": [{
                "tabProperties": { "tabId": "t.0", "title": "Intro" },
                "documentTab": { "body": { "content": [
                    { "paragraph": {
                        "paragraphStyle": { "namedStyleType": "HEADING_1" },
                        "elements": [{ "textRun": { "content": "Goals\n" } }]
                    }},
                    { "table": { "tableRows": [{ "tableCells": [
                        { "content": [{ "paragraph": { "elements": [{ "textRun": { "content": "a\n" } }] } }] },
                        { "content": [{ "paragraph": { "elements": [{ "textRun": { "content": "b\n" } }] } }] }
                    ]}]}}
                ]}},
                "childTabs": [{ "tabProperties": { "tabId": "t.1", "title": "Details" } }]
            }]
        }))
        .unwrap();

        let mut text = String::new();
        tabs_text(&doc.tabs, &mut text, 0);

        assert_eq!(text, "\n## Intro\n\n### Goals\n\n| a | b |\n\n\n### Details\n\n");
    }
}

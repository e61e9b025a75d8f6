use std::collections::BTreeMap;

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;

use super::slide_table::{HeaderStyle, SlideTable};
use super::slides_models::{
    find_placeholders, placeholder_name, LayoutType, Page, PageElement, PageElementKind,
    PresentationInfo, ShapeText, ThemeColorPair,
};
use super::slides_requests::{
    ApplyMode, BatchUpdate, ElementProperties, LayoutReference, LinkingMode, Size, SlidesRequest,
    Transform,
};
use super::slides_service::SlidesService;
use crate::core::drive::{ensure_mime, DriveFile, DriveItem, DriveService, MimeType, ShareOptions};
use crate::core::error::{GoogleError, Result};
use crate::core::table::{DataTable, HeaderMode};
use crate::core::transport::GoogleTransport;

const DEFAULT_FONT: &str = "Arial";
const UNSPECIFIED_LAYOUT: &str = "PREDEFINED_LAYOUT_UNSPECIFIED";

/// Element ids per page: `{page_id: {object_id: kind}}`.
pub type ElementsByPage = BTreeMap<String, BTreeMap<String, PageElementKind>>;

/// Shape placeholders per page: `{page_id: {object_id: ["{{name}}", ...]}}`.
pub type PlaceholdersByPage = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Speaker notes per slide: `{slide_id: {text_box_id: [lines]}}`.
pub type NotesBySlide = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Random id accepted by the Slides API for new objects.
pub fn new_object_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    format!("gw_{}", suffix)
}

/// Maps a possibly negative insertion index onto `0..=len`; `-1` appends.
pub fn insertion_index(index: isize, len: usize) -> usize {
    if index < 0 {
        let from_end = len as isize + index + 1;
        from_end.max(0) as usize
    } else {
        (index as usize).min(len)
    }
}

/// A Google Slides file. The presentation is fetched on first use and
/// fetched again after every batch update, so reads always see the result
/// of the last mutation.
pub struct Presentation<T: GoogleTransport> {
    file: DriveFile,
    drive: DriveService<T>,
    slides: SlidesService<T>,
    info: Option<PresentationInfo>,
}

impl<T: GoogleTransport + 'static> Presentation<T> {
    pub fn from_file(drive: DriveService<T>, slides: SlidesService<T>, file: DriveFile) -> Result<Self> {
        ensure_mime(&file, &MimeType::Presentation)?;
        Ok(Self {
            file,
            drive,
            slides,
            info: None,
        })
    }

    pub async fn open(drive: DriveService<T>, slides: SlidesService<T>, id: &str) -> Result<Self> {
        let file = drive.get(id).await?;
        Self::from_file(drive, slides, file)
    }

    pub async fn create(
        drive: DriveService<T>,
        slides: SlidesService<T>,
        name: &str,
        parent: Option<&str>,
        transfer_permissions: Option<ShareOptions>,
    ) -> Result<Self> {
        let file = drive
            .create(name, &MimeType::Presentation, parent, transfer_permissions)
            .await?;
        Self::from_file(drive, slides, file)
    }

    pub async fn info(&mut self) -> Result<&PresentationInfo> {
        if self.info.is_none() {
            let info = self.slides.get(&self.file.id).await?;
            self.info = Some(info);
        }
        self.info
            .as_ref()
            .ok_or_else(|| GoogleError::NotFound(format!("Presentation {}", self.file.id)))
    }

    pub async fn refresh(&mut self) -> Result<&PresentationInfo> {
        self.info = None;
        self.info().await
    }

    /// Applies the batch and reloads the presentation. Returns the raw reply.
    pub async fn batch_update(&mut self, batch: BatchUpdate) -> Result<Value> {
        if batch.is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        let response = self.slides.batch_update(&self.file.id, &batch).await;
        match response {
            Ok(response) => {
                self.refresh().await?;
                Ok(response)
            }
            Err(e) => {
                tracing::error!("Batch update on presentation {} failed: {}", self.file.id, e);
                Err(e)
            }
        }
    }

    // Read accessors

    pub async fn locale(&mut self) -> Result<Option<String>> {
        Ok(self.info().await?.locale.clone())
    }

    pub async fn slides(&mut self) -> Result<&[Page]> {
        Ok(self.info().await?.slides.as_slice())
    }

    pub async fn slide_ids(&mut self) -> Result<Vec<String>> {
        Ok(self
            .slides()
            .await?
            .iter()
            .map(|s| s.object_id.clone())
            .collect())
    }

    pub async fn masters(&mut self) -> Result<&[Page]> {
        Ok(self.info().await?.masters.as_slice())
    }

    pub async fn layouts(&mut self) -> Result<&[Page]> {
        Ok(self.info().await?.layouts.as_slice())
    }

    pub async fn page(&mut self, page_id: &str) -> Result<Page> {
        self.slides()
            .await?
            .iter()
            .find(|s| s.object_id == page_id)
            .cloned()
            .ok_or_else(|| GoogleError::NotFound(format!("Slide {}", page_id)))
    }

    pub async fn layout_types(&mut self) -> Result<Vec<LayoutType>> {
        Ok(self
            .layouts()
            .await?
            .iter()
            .map(|layout| {
                let props = layout.layout_properties.clone().unwrap_or_default();
                LayoutType {
                    object_id: layout.object_id.clone(),
                    name: props.name,
                    display_name: props.display_name,
                }
            })
            .collect())
    }

    /// Display name of the first master.
    pub async fn master_theme(&mut self) -> Result<Option<String>> {
        Ok(self
            .masters()
            .await?
            .first()
            .and_then(|m| m.master_properties.as_ref())
            .and_then(|p| p.display_name.clone()))
    }

    pub async fn master_colors(&mut self) -> Result<Vec<ThemeColorPair>> {
        Ok(self
            .masters()
            .await?
            .iter()
            .filter_map(|m| m.page_properties.as_ref())
            .filter_map(|p| p.color_scheme.as_ref())
            .flat_map(|scheme| scheme.colors.iter().cloned())
            .collect())
    }

    /// Distinct font families used by text on the masters, in order of appearance.
    pub async fn master_fonts(&mut self) -> Result<Vec<String>> {
        let mut fonts: Vec<String> = Vec::new();
        for master in self.masters().await? {
            for element in &master.page_elements {
                let Some(text) = element.shape.as_ref().and_then(|s| s.text.as_ref()) else {
                    continue;
                };
                for run in text.text_elements.iter().filter_map(|e| e.text_run.as_ref()) {
                    if let Some(font) = &run.style.font_family {
                        if !fonts.contains(font) {
                            fonts.push(font.clone());
                        }
                    }
                }
            }
        }
        Ok(fonts)
    }

    pub async fn default_font(&mut self) -> Result<String> {
        Ok(self
            .master_fonts()
            .await?
            .into_iter()
            .next()
            .unwrap_or_else(|| DEFAULT_FONT.to_string()))
    }

    /// Text of each notes text box, trailing newline removed.
    pub async fn slides_notes(&mut self) -> Result<NotesBySlide> {
        let mut notes = NotesBySlide::new();
        for slide in self.slides().await? {
            let mut boxes = BTreeMap::new();
            if let Some(page) = slide.notes_page() {
                for element in &page.page_elements {
                    let Some(shape) = &element.shape else { continue };
                    if shape.shape_type.as_deref() != Some("TEXT_BOX") || shape.text.is_none() {
                        continue;
                    }
                    let lines = element
                        .text_runs()
                        .into_iter()
                        .map(|run| run.strip_suffix('\n').unwrap_or(run).to_string())
                        .collect();
                    boxes.insert(element.object_id.clone(), lines);
                }
            }
            notes.insert(slide.object_id.clone(), boxes);
        }
        Ok(notes)
    }

    /// Ids of elements of the given kinds on the given slides. Empty
    /// filters mean every kind and every slide.
    pub async fn elements_ids(
        &mut self,
        kinds: &[PageElementKind],
        pages: &[String],
    ) -> Result<ElementsByPage> {
        let mut result = ElementsByPage::new();
        for slide in self.slides().await? {
            if !pages.is_empty() && !pages.contains(&slide.object_id) {
                continue;
            }
            let elements = slide
                .page_elements
                .iter()
                .filter(|e| e.is_any_of(kinds))
                .filter_map(|e| e.kind().map(|k| (e.object_id.clone(), k)))
                .collect();
            result.insert(slide.object_id.clone(), elements);
        }
        Ok(result)
    }

    /// The element and the slide it sits on.
    pub async fn find_element(
        &mut self,
        element_id: &str,
        kinds: &[PageElementKind],
        pages: &[String],
    ) -> Result<Option<(String, PageElement)>> {
        Ok(self
            .slides()
            .await?
            .iter()
            .filter(|s| pages.is_empty() || pages.contains(&s.object_id))
            .find_map(|s| {
                s.element(element_id)
                    .filter(|e| e.is_any_of(kinds))
                    .map(|e| (s.object_id.clone(), e.clone()))
            }))
    }

    pub async fn page_element(&mut self, element_id: &str) -> Result<Option<PageElement>> {
        Ok(self
            .find_element(element_id, &[], &[])
            .await?
            .map(|(_, element)| element))
    }

    /// `{{...}}` tokens in shape text. Table cells are read with `table_to_grid`.
    pub async fn shapes_placeholders(&mut self, pages: &[String]) -> Result<PlaceholdersByPage> {
        let mut result = PlaceholdersByPage::new();
        for slide in self.slides().await? {
            if !pages.is_empty() && !pages.contains(&slide.object_id) {
                continue;
            }
            let shapes = slide
                .page_elements
                .iter()
                .filter(|e| e.shape.as_ref().is_some_and(|s| s.text.is_some()))
                .map(|e| {
                    let found = e
                        .text_runs()
                        .into_iter()
                        .flat_map(find_placeholders)
                        .collect();
                    (e.object_id.clone(), found)
                })
                .collect();
            result.insert(slide.object_id.clone(), shapes);
        }
        Ok(result)
    }

    /// Every element of every slide with the trimmed text of its first text run, if any.
    pub async fn all_shapes_placeholders(&mut self) -> Result<BTreeMap<String, Option<ShapeText>>> {
        let mut result = BTreeMap::new();
        for slide in self.slides().await? {
            for element in &slide.page_elements {
                let text = element.text_runs().first().map(|run| ShapeText {
                    inner_text: run.trim().to_string(),
                    page_id: slide.object_id.clone(),
                });
                result.insert(element.object_id.clone(), text);
            }
        }
        Ok(result)
    }

    /// Reads a table on `page_id` as a grid of placeholder names (cell text
    /// when a cell has no placeholder). `table_id` may be omitted when the
    /// page holds exactly one table.
    pub async fn table_to_grid(
        &mut self,
        page_id: &str,
        table_id: Option<&str>,
        header: bool,
    ) -> Result<DataTable> {
        let page = self.page(page_id).await?;
        let tables: Vec<&PageElement> = page
            .page_elements
            .iter()
            .filter(|e| e.table.is_some())
            .collect();

        let element = match table_id {
            Some(id) => tables
                .iter()
                .find(|e| e.object_id == id)
                .ok_or_else(|| GoogleError::NotFound(format!("Table {} on page {}", id, page_id)))?,
            None if tables.len() == 1 => &tables[0],
            None => {
                return Err(GoogleError::InvalidArgument(format!(
                    "Page {} has {} tables, a table id is required",
                    page_id,
                    tables.len()
                )))
            }
        };

        let rows: Vec<Vec<String>> = element
            .table
            .iter()
            .flat_map(|t| t.table_rows.iter())
            .map(|row| {
                row.table_cells
                    .iter()
                    .map(|cell| {
                        let text = cell.text();
                        placeholder_name(&text).unwrap_or_else(|| text.trim().to_string())
                    })
                    .collect()
            })
            .collect();

        let mode = if header {
            HeaderMode::FirstRow
        } else {
            HeaderMode::Generated
        };
        Ok(DataTable::from_rows(rows, mode))
    }

    // Mutations

    /// Adds a slide using the layout whose display name or name matches
    /// `layout`. Returns the id of the new slide.
    pub async fn add_slide(&mut self, layout: &str, index: isize) -> Result<String> {
        let layouts = self.layout_types().await?;
        let reference = if layouts.is_empty() {
            tracing::warn!(
                "Presentation {} has no layouts, the new slide will have an unspecified layout",
                self.file.id
            );
            LayoutReference::PredefinedLayout(UNSPECIFIED_LAYOUT.to_string())
        } else {
            let found = layouts
                .iter()
                .find(|l| l.display_name.as_deref() == Some(layout))
                .or_else(|| layouts.iter().find(|l| l.name.as_deref() == Some(layout)))
                .ok_or_else(|| {
                    GoogleError::InvalidArgument(format!(
                        "Unknown layout '{}'. Available: {}",
                        layout,
                        layouts
                            .iter()
                            .filter_map(|l| l.display_name.as_deref().or(l.name.as_deref()))
                            .collect::<Vec<_>>()
                            .join(", ")
                    ))
                })?;
            LayoutReference::LayoutId(found.object_id.clone())
        };

        let position = insertion_index(index, self.slides().await?.len());
        let response = self
            .batch_update(BatchUpdate::new().with(SlidesRequest::create_slide(reference, Some(position))))
            .await?;
        tracing::info!("Added slide at index {} to {}", position, self.file.id);
        reply_object_id(&response, "createSlide")
    }

    pub async fn move_slide(&mut self, slide_id: &str, new_index: isize) -> Result<()> {
        self.reindex_slides(&[slide_id.to_string()], new_index).await
    }

    pub async fn reindex_slides(&mut self, slide_ids: &[String], new_index: isize) -> Result<()> {
        let position = insertion_index(new_index, self.slides().await?.len());
        self.batch_update(BatchUpdate::new().with(SlidesRequest::move_slides(slide_ids, position)))
            .await?;
        tracing::info!("Moved {} slide(s) to index {}", slide_ids.len(), position);
        Ok(())
    }

    /// Replaces `{{placeholder}}` with `value` on the given pages (all when empty).
    pub async fn text_replace(&mut self, placeholder: &str, value: &str, pages: &[String]) -> Result<()> {
        self.batch_update(BatchUpdate::new().with(SlidesRequest::replace_text(placeholder, value, pages)))
            .await?;
        Ok(())
    }

    pub async fn batch_text_replace<I, K, V>(&mut self, mapping: I, pages: &[String]) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let requests: Vec<SlidesRequest> = mapping
            .into_iter()
            .map(|(k, v)| SlidesRequest::replace_text(k.as_ref(), v.as_ref(), pages))
            .collect();
        let count = requests.len();
        self.batch_update(BatchUpdate::from(requests)).await?;
        tracing::info!("Replaced {} placeholder(s) in {}", count, self.file.id);
        Ok(())
    }

    /// Fills a slide table whose cells hold placeholders with the values of
    /// `data`. Both must have the same shape (header row excluded).
    pub async fn table_text_replace(
        &mut self,
        data: &DataTable,
        page_id: &str,
        table_id: Option<&str>,
        header: bool,
    ) -> Result<()> {
        let placeholders = self.table_to_grid(page_id, table_id, header).await?;
        if placeholders.shape() != data.shape() {
            return Err(GoogleError::ShapeMismatch {
                expected: placeholders.shape(),
                actual: data.shape(),
            });
        }

        let mapping: Vec<(String, String)> = placeholders
            .cells()
            .zip(data.cells())
            .map(|((_, _, name), (_, _, value))| (name.to_string(), value.to_string()))
            .collect();
        self.batch_text_replace(mapping, &[page_id.to_string()]).await
    }

    pub async fn replace_shape_with_image(
        &mut self,
        placeholder: &str,
        image_url: &str,
        pages: &[String],
    ) -> Result<()> {
        self.batch_update(BatchUpdate::new().with(SlidesRequest::replace_shape_with_image(
            placeholder,
            image_url,
            pages,
            false,
        )))
        .await?;
        Ok(())
    }

    /// `fill` crops the image to cover the shape instead of fitting inside it.
    pub async fn batch_replace_shape_with_image<I, K, V>(
        &mut self,
        mapping: I,
        pages: &[String],
        fill: bool,
    ) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let requests: Vec<SlidesRequest> = mapping
            .into_iter()
            .map(|(k, v)| SlidesRequest::replace_shape_with_image(k.as_ref(), v.as_ref(), pages, fill))
            .collect();
        self.batch_update(BatchUpdate::from(requests)).await?;
        Ok(())
    }

    /// Uses the content link of a Drive image as the replacement.
    pub async fn replace_shape_with_drive_image(&mut self, placeholder: &str, image_file_id: &str) -> Result<()> {
        let image = self.drive.get(image_file_id).await?;
        let url = image.web_content_link.ok_or_else(|| {
            GoogleError::NotFound(format!("Content link of Drive file {}", image_file_id))
        })?;
        self.replace_shape_with_image(placeholder, &url, &[]).await
    }

    /// Unlike text placeholders, `text` is matched as given and case-sensitively.
    pub async fn replace_shape_with_chart(
        &mut self,
        text: &str,
        spreadsheet_id: &str,
        chart_id: i64,
        linking_mode: LinkingMode,
        pages: &[String],
    ) -> Result<()> {
        self.batch_update(BatchUpdate::new().with(SlidesRequest::replace_shape_with_chart(
            text,
            spreadsheet_id,
            chart_id,
            linking_mode,
            pages,
        )))
        .await?;
        Ok(())
    }

    /// Inserts an image and returns its object id.
    pub async fn insert_image(
        &mut self,
        url: &str,
        page_id: &str,
        object_id: Option<&str>,
        size: Option<Size>,
        transform: Option<Transform>,
    ) -> Result<String> {
        let object_id = object_id.map(str::to_string).unwrap_or_else(new_object_id);
        self.batch_update(BatchUpdate::new().with(SlidesRequest::create_image(
            url,
            page_id,
            Some(&object_id),
            size,
            transform,
        )))
        .await?;
        Ok(object_id)
    }

    /// Puts a new image where `old_image_id` was and deletes the old one.
    pub async fn replace_image(&mut self, page_id: &str, old_image_id: &str, new_url: &str) -> Result<String> {
        let old = self
            .find_element(old_image_id, &[PageElementKind::Image], &[page_id.to_string()])
            .await?
            .map(|(_, element)| element)
            .ok_or_else(|| GoogleError::NotFound(format!("Image {} on page {}", old_image_id, page_id)))?;

        let object_id = new_object_id();
        let batch = BatchUpdate::new()
            .with(SlidesRequest::create_image(
                new_url,
                page_id,
                Some(&object_id),
                Some(Size::default()),
                old.transform,
            ))
            .with(SlidesRequest::delete_object(old_image_id));
        self.batch_update(batch).await?;
        Ok(object_id)
    }

    /// Returns the id of the copy.
    pub async fn duplicate_object(&mut self, object_id: &str) -> Result<String> {
        let response = self
            .batch_update(BatchUpdate::new().with(SlidesRequest::duplicate(object_id)))
            .await?;
        tracing::info!("Duplicated object {}", object_id);
        reply_object_id(&response, "duplicateObject")
    }

    pub async fn batch_delete_object(&mut self, object_ids: &[String]) -> Result<()> {
        let requests = object_ids.iter().map(|id| SlidesRequest::delete_object(id)).collect::<Vec<_>>();
        self.batch_update(BatchUpdate::from(requests)).await?;
        tracing::info!("Deleted object(s) {}", object_ids.join(", "));
        Ok(())
    }

    pub async fn batch_delete_text(&mut self, object_ids: &[String]) -> Result<()> {
        let requests = object_ids.iter().map(|id| SlidesRequest::delete_text(id)).collect::<Vec<_>>();
        self.batch_update(BatchUpdate::from(requests)).await?;
        tracing::info!("Deleted text in object(s) {}", object_ids.join(", "));
        Ok(())
    }

    /// Clears the speaker notes of the given slides (all when empty).
    pub async fn delete_slides_notes(&mut self, slide_ids: &[String]) -> Result<()> {
        let notes = self.slides_notes().await?;
        let boxes: Vec<String> = notes
            .into_iter()
            .filter(|(slide, _)| slide_ids.is_empty() || slide_ids.contains(slide))
            .flat_map(|(_, boxes)| {
                boxes
                    .into_iter()
                    .filter(|(_, lines)| lines.iter().any(|l| !l.is_empty()))
                    .map(|(id, _)| id)
            })
            .collect();

        if boxes.is_empty() {
            tracing::debug!("No speaker notes to delete in {}", self.file.id);
            return Ok(());
        }
        self.batch_delete_text(&boxes).await
    }

    pub async fn transform_object(
        &mut self,
        object_id: &str,
        transform: Transform,
        apply_mode: ApplyMode,
    ) -> Result<()> {
        self.batch_update(BatchUpdate::new().with(SlidesRequest::transform(object_id, transform, apply_mode)))
            .await?;
        Ok(())
    }

    /// Recreates a shape with another shape type, keeping its id, size and
    /// transform unless overridden.
    pub async fn update_shape_type(
        &mut self,
        page_id: &str,
        element_id: &str,
        shape_type: &str,
        size: Option<Size>,
        transform: Option<Transform>,
    ) -> Result<()> {
        let element = self
            .find_element(element_id, &[], &[page_id.to_string()])
            .await?
            .map(|(_, element)| element)
            .ok_or_else(|| GoogleError::NotFound(format!("Element {} on page {}", element_id, page_id)))?;

        let properties = ElementProperties {
            page_object_id: page_id.to_string(),
            size: size.or(element.size),
            transform: transform.or(element.transform),
        };
        let batch = BatchUpdate::new()
            .with(SlidesRequest::delete_object(element_id))
            .with(SlidesRequest::create_shape(Some(element_id), shape_type, properties));
        self.batch_update(batch).await?;
        Ok(())
    }

    /// Creates an empty table, optionally styling a header. Returns the table id.
    pub async fn create_table(
        &mut self,
        page_id: &str,
        n_rows: usize,
        n_cols: usize,
        header: Option<&HeaderStyle>,
    ) -> Result<String> {
        let response = self
            .batch_update(BatchUpdate::new().with(SlidesRequest::create_table(page_id, n_rows, n_cols)))
            .await?;
        let table_id = reply_object_id(&response, "createTable")?;

        if let Some(style) = header {
            let table = SlideTable::new(&table_id, n_rows, n_cols);
            let requests = self.header_requests(&table, style).await?;
            self.batch_update(BatchUpdate::from(requests)).await?;
        }
        tracing::info!("Created table {} on page {}", table_id, page_id);
        Ok(table_id)
    }

    /// Writes `data` (header row first) into a new table on `page_id`.
    pub async fn table_from_data(
        &mut self,
        data: &DataTable,
        page_id: &str,
        header: Option<&HeaderStyle>,
    ) -> Result<String> {
        if !self.slide_ids().await?.iter().any(|id| id == page_id) {
            return Err(GoogleError::InvalidArgument(format!(
                "{} is not a slide of this presentation",
                page_id
            )));
        }

        let values = data.to_values();
        let n_rows = values.len();
        let n_cols = data.columns().len();
        let table_id = self.create_table(page_id, n_rows, n_cols, None).await?;
        let table = SlideTable::new(&table_id, n_rows, n_cols);

        let mut batch = BatchUpdate::new();
        for (row, cells) in values.iter().enumerate() {
            for (col, text) in cells.iter().enumerate() {
                if !text.is_empty() {
                    batch.push(SlidesRequest::insert_cell_text(&table_id, row, col, text));
                }
            }
        }
        if let Some(style) = header {
            batch.extend(self.header_requests(&table, style).await?);
        }
        self.batch_update(batch).await?;
        Ok(table_id)
    }

    async fn header_requests(&mut self, table: &SlideTable, style: &HeaderStyle) -> Result<Vec<SlidesRequest>> {
        let scheme = self.master_colors().await?;
        let font = self.default_font().await?;
        table.header_requests(style, &scheme, &font)
    }
}

fn reply_object_id(response: &Value, reply: &str) -> Result<String> {
    response
        .get("replies")
        .and_then(|r| r.get(0))
        .and_then(|r| r.get(reply))
        .and_then(|r| r.get("objectId"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| GoogleError::Decode(format!("{} reply without objectId", reply)))
}

#[async_trait]
impl<T: GoogleTransport + 'static> DriveItem for Presentation<T> {
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

    fn handle(transport: &Arc<InMemoryTransport>) -> Presentation<InMemoryTransport> {
        let file: DriveFile = serde_json::from_value(json!({
            "id": "p1",
            "name": "Deck",
            "mimeType": "application/vnd.google-apps.presentation"
        }))
        .unwrap();
        Presentation::from_file(
            DriveService::new(Arc::clone(transport)),
            SlidesService::new(Arc::clone(transport)),
            file,
        )
        .unwrap()
    }

    fn text(content: &str) -> serde_json::Value {
        json!({ "textElements": [
            { "paragraphMarker": {} },
            { "textRun": { "content": content, "style": { "fontFamily": "Lato" } } }
        ]})
    }

    fn cell(content: &str) -> serde_json::Value {
        json!({ "text": text(content) })
    }

    fn info_json() -> serde_json::Value {
        json!({
            "presentationId": "p1",
            "title": "Deck",
            "locale": "en",
            "masters": [{
                "objectId": "m1",
                "masterProperties": { "displayName": "Simple Light" },
                "pageProperties": { "colorScheme": { "colors": [
                    { "type": "DARK1", "color": { "red": 0.1 } },
                    { "type": "LIGHT1", "color": { "red": 1.0, "green": 1.0, "blue": 1.0 } }
                ]}},
                "pageElements": [{ "objectId": "mt", "shape": { "text": text("Title") } }]
            }],
            "layouts": [
                { "objectId": "l1", "layoutProperties": { "name": "TITLE", "displayName": "Title slide" } },
                { "objectId": "l2", "layoutProperties": { "name": "TITLE_AND_BODY", "displayName": "Title and body" } }
            ],
            "slides": [
                {
                    "objectId": "s1",
                    "pageElements": [
                        { "objectId": "title", "shape": { "shapeType": "TEXT_BOX", "text": text("Hello {{name}}, {{city}}\n") } },
                        { "objectId": "pic", "image": {}, "transform": { "scaleX": 1.0, "scaleY": 1.0, "translateX": 10.0, "unit": "EMU" } },
                        { "objectId": "tbl", "table": { "rows": 2, "columns": 2, "tableRows": [
                            { "tableCells": [cell("{{h1}}\n"), cell("{{h2}}\n")] },
                            { "tableCells": [cell("{{a}}\n"), cell("{{b}}\n")] }
                        ]}}
                    ],
                    "slideProperties": { "notesPage": { "objectId": "n1", "pageElements": [
                        { "objectId": "notes-box", "shape": { "shapeType": "TEXT_BOX", "text": text("Remember\n") } }
                    ]}}
                },
                { "objectId": "s2", "pageElements": [] }
            ]
        })
    }

    #[test]
    fn negative_indices_count_from_the_end() {
        assert_eq!(insertion_index(-1, 3), 3);
        assert_eq!(insertion_index(-2, 3), 2);
        assert_eq!(insertion_index(-10, 3), 0);
        assert_eq!(insertion_index(1, 3), 1);
    }

    #[test]
    fn generated_object_ids_are_valid_slides_ids() {
        let id = new_object_id();
        assert_eq!(id.len(), 19);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }

    #[tokio::test]
    async fn read_accessors_share_one_fetch() {
        let transport = Arc::new(InMemoryTransport::new());
        let mut deck = handle(&transport);
        transport.push_json(info_json());

        assert_eq!(deck.slide_ids().await.unwrap(), vec!["s1", "s2"]);
        assert_eq!(deck.master_theme().await.unwrap().as_deref(), Some("Simple Light"));
        assert_eq!(deck.master_fonts().await.unwrap(), vec!["Lato"]);
        assert_eq!(deck.master_colors().await.unwrap().len(), 2);
        assert_eq!(deck.layout_types().await.unwrap()[1].name.as_deref(), Some("TITLE_AND_BODY"));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn notes_and_placeholders_are_extracted() {
        let transport = Arc::new(InMemoryTransport::new());
        let mut deck = handle(&transport);
        transport.push_json(info_json());

        let notes = deck.slides_notes().await.unwrap();
        assert_eq!(notes["s1"]["notes-box"], vec!["Remember"]);
        assert!(notes["s2"].is_empty());

        let placeholders = deck.shapes_placeholders(&[]).await.unwrap();
        assert_eq!(placeholders["s1"]["title"], vec!["{{name}}", "{{city}}"]);

        let tables = deck
            .elements_ids(&[PageElementKind::Table], &["s1".to_string()])
            .await
            .unwrap();
        assert_eq!(tables["s1"].keys().collect::<Vec<_>>(), vec!["tbl"]);
    }

    #[tokio::test]
    async fn table_to_grid_reads_placeholder_names() {
        let transport = Arc::new(InMemoryTransport::new());
        let mut deck = handle(&transport);
        transport.push_json(info_json());

        let grid = deck.table_to_grid("s1", None, true).await.unwrap();

        assert_eq!(grid.columns(), &["h1", "h2"]);
        assert_eq!(grid.rows(), &[vec!["a".to_string(), "b".to_string()]]);
    }

    #[tokio::test]
    async fn batch_update_refetches_the_presentation() {
        let transport = Arc::new(InMemoryTransport::new());
        let mut deck = handle(&transport);
        transport.push_json(info_json());
        transport.push_json(json!({ "replies": [{}] }));
        transport.push_json(json!({ "presentationId": "p1", "slides": [{ "objectId": "s1" }] }));

        deck.info().await.unwrap();
        deck.text_replace("name", "Ada", &[]).await.unwrap();

        assert_eq!(deck.slide_ids().await.unwrap(), vec!["s1"]);
        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(
            requests[1].json_body().unwrap()["requests"][0]["replaceAllText"]["containsText"]["text"],
            "{{name}}"
        );
        assert!(requests[2].url.ends_with("presentations/p1"));
    }

    #[tokio::test]
    async fn add_slide_resolves_layout_by_display_name() {
        let transport = Arc::new(InMemoryTransport::new());
        let mut deck = handle(&transport);
        transport.push_json(info_json());
        transport.push_json(json!({ "replies": [{ "createSlide": { "objectId": "new" } }] }));
        transport.push_json(info_json());

        let id = deck.add_slide("Title and body", -1).await.unwrap();

        assert_eq!(id, "new");
        let body = transport.requests()[1].json_body().unwrap().clone();
        assert_eq!(
            body["requests"][0]["createSlide"],
            json!({ "insertionIndex": 2, "slideLayoutReference": { "layoutId": "l2" } })
        );
    }

    #[tokio::test]
    async fn add_slide_rejects_unknown_layouts() {
        let transport = Arc::new(InMemoryTransport::new());
        let mut deck = handle(&transport);
        transport.push_json(info_json());

        let err = deck.add_slide("Nope", 0).await.unwrap_err();
        assert!(matches!(err, GoogleError::InvalidArgument(_)));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn add_slide_without_layouts_uses_unspecified_layout() {
        let transport = Arc::new(InMemoryTransport::new());
        let mut deck = handle(&transport);
        transport.push_json(json!({ "presentationId": "p1", "slides": [] }));
        transport.push_json(json!({ "replies": [{ "createSlide": { "objectId": "x" } }] }));
        transport.push_json(json!({ "presentationId": "p1" }));

        deck.add_slide("anything", 0).await.unwrap();

        let body = transport.requests()[1].json_body().unwrap().clone();
        assert_eq!(
            body["requests"][0]["createSlide"]["slideLayoutReference"]["predefinedLayout"],
            UNSPECIFIED_LAYOUT
        );
    }

    #[tokio::test]
    async fn table_text_replace_checks_shapes() {
        let transport = Arc::new(InMemoryTransport::new());
        let mut deck = handle(&transport);
        transport.push_json(info_json());

        let wrong = DataTable::new(
            vec!["x".into(), "y".into()],
            vec![vec!["1".into(), "2".into()], vec!["3".into(), "4".into()]],
        )
        .unwrap();
        let err = deck.table_text_replace(&wrong, "s1", None, true).await.unwrap_err();
        assert!(matches!(err, GoogleError::ShapeMismatch { expected: (1, 2), actual: (2, 2) }));
    }

    #[tokio::test]
    async fn table_text_replace_maps_cells_to_values() {
        let transport = Arc::new(InMemoryTransport::new());
        let mut deck = handle(&transport);
        transport.push_json(info_json());
        transport.push_json(json!({ "replies": [] }));
        transport.push_json(info_json());

        let data = DataTable::new(vec!["x".into(), "y".into()], vec![vec!["1".into(), "2".into()]]).unwrap();
        deck.table_text_replace(&data, "s1", Some("tbl"), true).await.unwrap();

        let body = transport.requests()[1].json_body().unwrap().clone();
        let requests = body["requests"].as_array().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0]["replaceAllText"]["containsText"]["text"], "{{a}}");
        assert_eq!(requests[0]["replaceAllText"]["replaceText"], "1");
        assert_eq!(requests[0]["replaceAllText"]["pageObjectIds"], json!(["s1"]));
    }

    #[tokio::test]
    async fn replace_image_keeps_the_old_transform() {
        let transport = Arc::new(InMemoryTransport::new());
        let mut deck = handle(&transport);
        transport.push_json(info_json());
        transport.push_json(json!({ "replies": [{}, {}] }));
        transport.push_json(info_json());

        deck.replace_image("s1", "pic", "https://new").await.unwrap();

        let body = transport.requests()[1].json_body().unwrap().clone();
        let create = &body["requests"][0]["createImage"];
        assert_eq!(create["url"], "https://new");
        assert_eq!(create["elementProperties"]["transform"]["translateX"], 10.0);
        assert_eq!(body["requests"][1]["deleteObject"]["objectId"], "pic");
    }

    #[tokio::test]
    async fn delete_slides_notes_clears_non_empty_boxes() {
        let transport = Arc::new(InMemoryTransport::new());
        let mut deck = handle(&transport);
        transport.push_json(info_json());
        transport.push_json(json!({ "replies": [{}] }));
        transport.push_json(info_json());

        deck.delete_slides_notes(&[]).await.unwrap();

        let body = transport.requests()[1].json_body().unwrap().clone();
        assert_eq!(
            body["requests"],
            json!([{ "deleteText": { "objectId": "notes-box", "textRange": { "type": "ALL" } } }])
        );
    }

    #[tokio::test]
    async fn create_table_styles_header_with_master_colors() {
        let transport = Arc::new(InMemoryTransport::new());
        let mut deck = handle(&transport);
        transport.push_json(json!({ "replies": [{ "createTable": { "objectId": "t9" } }] }));
        transport.push_json(info_json());
        transport.push_json(json!({ "replies": [] }));
        transport.push_json(info_json());

        let id = deck
            .create_table("s2", 2, 2, Some(&HeaderStyle::default()))
            .await
            .unwrap();

        assert_eq!(id, "t9");
        let body = transport.requests()[2].json_body().unwrap().clone();
        let fill = &body["requests"][0]["updateTableCellProperties"];
        assert_eq!(
            fill["tableCellProperties"]["tableCellBackgroundFill"]["solidFill"]["color"]["rgbColor"],
            json!({ "red": 0.1 })
        );
        assert_eq!(body["requests"][1]["updateTextStyle"]["style"]["fontFamily"], "Lato");
    }

    #[tokio::test]
    async fn update_shape_type_recreates_with_the_same_id() {
        let transport = Arc::new(InMemoryTransport::new());
        let mut deck = handle(&transport);
        transport.push_json(info_json());
        transport.push_json(json!({ "replies": [{}, {}] }));
        transport.push_json(info_json());

        deck.update_shape_type("s1", "title", "ELLIPSE", None, None).await.unwrap();

        let body = transport.requests()[1].json_body().unwrap().clone();
        assert_eq!(body["requests"][0]["deleteObject"]["objectId"], "title");
        assert_eq!(body["requests"][1]["createShape"]["objectId"], "title");
        assert_eq!(body["requests"][1]["createShape"]["shapeType"], "ELLIPSE");
    }
}

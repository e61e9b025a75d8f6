pub mod presentation;
pub mod slide_table;
pub mod slides_models;
pub mod slides_requests;
pub mod slides_service;

pub use presentation::{
    insertion_index, new_object_id, ElementsByPage, NotesBySlide, PlaceholdersByPage, Presentation,
};
pub use slide_table::{ColorSpec, HeaderStyle, SlideTable};
pub use slides_models::{
    find_placeholders, placeholder_name, LayoutType, Page, PageElement, PageElementKind,
    PresentationInfo, ShapeText, ThemeColorPair,
};
pub use slides_requests::{
    placeholder, ApplyMode, BatchUpdate, Dimension, ElementProperties, LayoutReference,
    LinkingMode, ReplaceMethod, RgbColor, Size, SlidesRequest, Transform, Unit,
};
pub use slides_service::SlidesService;

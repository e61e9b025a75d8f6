pub mod docs_models;
pub mod docs_service;
pub mod docs_text;
pub mod document;

pub use docs_models::{Body, DocumentInfo, NamedStyle, NamedStyles, Tab};
pub use docs_service::DocsService;
pub use docs_text::extract_file_id;
pub use document::Document;

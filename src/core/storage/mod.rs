pub mod storage_service;

pub use storage_service::{encode_object_name, public_url, StorageObject, StorageService};

// CLI commands module.
// Each Google API gets its own command file.

pub mod drive;

pub mod sheets;

pub mod slides;

pub mod docs;

pub mod tasks;

pub mod storage;

// Shared stdout formatting
pub mod output;

pub mod tasks_models;
pub mod tasks_service;

pub use tasks_models::{to_rfc3339, NewTask, Task, TaskList, TaskStatus};
pub use tasks_service::TasksService;

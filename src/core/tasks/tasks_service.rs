use std::sync::Arc;

use serde_json::json;

use super::tasks_models::{NewTask, Task, TaskList, TaskStatus};
use crate::core::api::GoogleApi;
use crate::core::error::Result;
use crate::core::transport::{collect_pages, ApiRequest, GoogleTransport};

/// Google Tasks: task lists and the tasks inside them.
pub struct TasksService<T: GoogleTransport> {
    transport: Arc<T>,
}

impl<T: GoogleTransport> Clone for TasksService<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: GoogleTransport> TasksService<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// At most `max_results` lists (all of them when `None`).
    pub async fn list_task_lists(&self, max_results: Option<usize>) -> Result<Vec<TaskList>> {
        let request = ApiRequest::get(GoogleApi::Tasks, "users/@me/lists")
            .query_opt("maxResults", max_results.map(|n| n.min(100)));
        let items = collect_pages(self.transport.as_ref(), request, "items", max_results).await?;
        items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(Into::into))
            .collect()
    }

    pub async fn get_task_list(&self, list_id: &str) -> Result<TaskList> {
        let request = ApiRequest::get(GoogleApi::Tasks, &format!("users/@me/lists/{}", list_id));
        let value = self.transport.send_json(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn create_task_list(&self, title: &str) -> Result<TaskList> {
        let request = ApiRequest::post(GoogleApi::Tasks, "users/@me/lists")
            .json(json!({ "title": title }));
        let value = self.transport.send_json(request).await?;
        let list: TaskList = serde_json::from_value(value)?;
        tracing::info!("Created task list '{}' ({})", title, list.id);
        Ok(list)
    }

    pub async fn list_tasks(&self, list_id: &str, show_completed: bool) -> Result<Vec<Task>> {
        let request = ApiRequest::get(GoogleApi::Tasks, &format!("lists/{}/tasks", list_id))
            .query("showCompleted", show_completed)
            .query("showHidden", show_completed);
        let items = collect_pages(self.transport.as_ref(), request, "items", None).await?;
        items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(Into::into))
            .collect()
    }

    pub async fn insert_task(&self, list_id: &str, task: &NewTask) -> Result<Task> {
        let request = ApiRequest::post(GoogleApi::Tasks, &format!("lists/{}/tasks", list_id))
            .json(serde_json::to_value(task)?);
        let value = self.transport.send_json(request).await?;
        let created: Task = serde_json::from_value(value)?;
        tracing::info!("Added task '{}' to list {}", created.title, list_id);
        Ok(created)
    }

    pub async fn complete_task(&self, list_id: &str, task_id: &str) -> Result<Task> {
        let request = ApiRequest::patch(
            GoogleApi::Tasks,
            &format!("lists/{}/tasks/{}", list_id, task_id),
        )
        .json(json!({ "status": TaskStatus::Completed }));
        let value = self.transport.send_json(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn delete_task(&self, list_id: &str, task_id: &str) -> Result<()> {
        let request = ApiRequest::delete(
            GoogleApi::Tasks,
            &format!("lists/{}/tasks/{}", list_id, task_id),
        );
        self.transport.send_json(request).await?;
        tracing::info!("Deleted task {} from list {}", task_id, list_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::transport::InMemoryTransport;
    use crate::core::transport::HttpMethod;

    fn service() -> (Arc<InMemoryTransport>, TasksService<InMemoryTransport>) {
        let transport = Arc::new(InMemoryTransport::new());
        (Arc::clone(&transport), TasksService::new(transport))
    }

    #[tokio::test]
    async fn task_lists_follow_pagination_up_to_the_limit() {
        let (transport, tasks) = service();
        transport.push_json(json!({ "items": [{ "id": "a", "title": "A" }], "nextPageToken": "p2" }));
        transport.push_json(json!({ "items": [{ "id": "b", "title": "B" }, { "id": "c", "title": "C" }] }));

        let lists = tasks.list_task_lists(Some(2)).await.unwrap();

        assert_eq!(lists.iter().map(|l| l.id.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(transport.requests()[1].query_value("pageToken"), Some("p2"));
    }

    #[tokio::test]
    async fn complete_task_patches_status() {
        let (transport, tasks) = service();
        transport.push_json(json!({ "id": "t1", "title": "x", "status": "completed" }));

        let task = tasks.complete_task("L", "t1").await.unwrap();

        assert!(task.is_completed());
        let sent = &transport.requests()[0];
        assert_eq!(sent.method, HttpMethod::Patch);
        assert!(sent.url.ends_with("lists/L/tasks/t1"));
        assert_eq!(sent.json_body().unwrap(), &json!({ "status": "completed" }));
    }

    #[tokio::test]
    async fn empty_list_has_no_tasks() {
        let (transport, tasks) = service();
        transport.push_json(json!({}));

        assert!(tasks.list_tasks("L", false).await.unwrap().is_empty());
        assert_eq!(transport.requests()[0].query_value("showCompleted"), Some("false"));
    }
}

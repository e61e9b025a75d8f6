use clap::Subcommand;

use super::output::format_row;
use crate::cli::Session;
use gworkspace::core::tasks::NewTask;

#[derive(Subcommand)]
pub enum TasksCommand {
    /// List task lists
    Lists {
        #[arg(long)]
        max: Option<usize>,
    },

    /// List the tasks of a list
    List {
        list_id: String,
        /// Include completed and hidden tasks
        #[arg(long)]
        completed: bool,
    },

    /// Add a task to a list
    Add {
        list_id: String,
        title: String,
        #[arg(long)]
        notes: Option<String>,
        /// Due date (2024-03-05, 05/03/2024, RFC 3339...)
        #[arg(long)]
        due: Option<String>,
        /// Read slash dates as day/month/year
        #[arg(long)]
        day_first: bool,
    },
}

pub async fn run(session: &Session, command: TasksCommand) -> anyhow::Result<()> {
    let tasks = &session.workspace.tasks;

    match command {
        TasksCommand::Lists { max } => {
            for list in tasks.list_task_lists(max).await? {
                println!("{}", format_row([list.id.as_str(), list.title.as_str()]));
            }
        }
        TasksCommand::List {
            list_id,
            completed,
        } => {
            for task in tasks.list_tasks(&list_id, completed).await? {
                let status = if task.is_completed() { "x" } else { " " };
                let due = task.due.as_deref().unwrap_or("");
                println!("{}", format_row([task.id.as_str(), status, due, task.title.as_str()]));
            }
        }
        TasksCommand::Add {
            list_id,
            title,
            notes,
            due,
            day_first,
        } => {
            let mut task = NewTask::new(&title);
            if let Some(notes) = notes {
                task = task.notes(&notes);
            }
            if let Some(due) = due {
                task = task.due(&due, day_first)?;
            }
            let created = tasks.insert_task(&list_id, &task).await?;
            println!("{}", created.id);
        }
    }

    Ok(())
}

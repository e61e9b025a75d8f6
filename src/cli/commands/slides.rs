use clap::Subcommand;

use super::output::{key_value, print_json};
use crate::cli::Session;

#[derive(Subcommand)]
pub enum SlidesCommand {
    /// Replace {{placeholders}} with values: `name=value ...`
    ReplaceText {
        presentation_id: String,
        #[arg(required = true, value_parser = key_value)]
        values: Vec<(String, String)>,
        /// Only touch these slides (repeatable)
        #[arg(long = "page")]
        pages: Vec<String>,
    },

    /// Print the speaker notes of every slide as JSON
    Notes { presentation_id: String },

    /// Clear speaker notes (every slide when none are given)
    DeleteNotes {
        presentation_id: String,
        slide_ids: Vec<String>,
    },
}

pub async fn run(session: &Session, command: SlidesCommand) -> anyhow::Result<()> {
    match command {
        SlidesCommand::ReplaceText {
            presentation_id,
            values,
            pages,
        } => {
            let mut presentation = session.workspace.open_presentation(&presentation_id).await?;
            presentation.batch_text_replace(values, &pages).await?;
        }
        SlidesCommand::Notes { presentation_id } => {
            let mut presentation = session.workspace.open_presentation(&presentation_id).await?;
            print_json(&presentation.slides_notes().await?)?;
        }
        SlidesCommand::DeleteNotes {
            presentation_id,
            slide_ids,
        } => {
            let mut presentation = session.workspace.open_presentation(&presentation_id).await?;
            presentation.delete_slides_notes(&slide_ids).await?;
        }
    }

    Ok(())
}

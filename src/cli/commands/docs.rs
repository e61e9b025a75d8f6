use anyhow::anyhow;
use clap::Subcommand;

use crate::cli::Session;
use gworkspace::core::docs::extract_file_id;

#[derive(Subcommand)]
pub enum DocsCommand {
    /// Print a document's text
    Text {
        /// Document id or URL
        document: String,
        /// Include every tab, titled and nested
        #[arg(long)]
        tabs: bool,
    },
}

pub async fn run(session: &Session, command: DocsCommand) -> anyhow::Result<()> {
    match command {
        DocsCommand::Text { document, tabs } => {
            let id = extract_file_id(&document)
                .ok_or_else(|| anyhow!("'{}' is not a document id or URL", document))?;
            let mut document = session.workspace.open_document(&id).await?;
            if tabs {
                print!("{}", document.all_tabs_text().await?);
            } else {
                print!("{}", document.body_text().await?.concat());
            }
        }
    }

    Ok(())
}

// CLI layer - argument parsing and the composition root.
//
// Credentials are resolved once, turned into a token provider and handed to
// a single reqwest transport shared by every service.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use gworkspace::core::auth::TokenProvider;
use gworkspace::{Config, CredentialResolver, ReqwestTransport, ResolvedCredentials, Workspace};

#[path = "commands/command_catalog.rs"]
pub mod commands;

use commands::{docs, drive, sheets, slides, storage, tasks};

pub type HttpWorkspace = Workspace<ReqwestTransport<Arc<dyn TokenProvider>>>;

/// Everything a command needs: the services and the credentials behind them.
pub struct Session {
    pub workspace: HttpWorkspace,
    pub credentials: ResolvedCredentials,
}

#[derive(Parser)]
#[command(name = "gworkspace")]
#[command(about = "Work with Google Drive, Sheets, Slides, Docs, Tasks and Cloud Storage")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Credentials file (service account key or authorized_user JSON).
    /// Searched for in the usual places when omitted.
    #[arg(long, global = true)]
    credentials: Option<PathBuf>,

    /// Impersonate this user (service accounts with domain-wide delegation)
    #[arg(long, global = true)]
    subject: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Files and folders
    #[command(subcommand)]
    Drive(drive::DriveCommand),

    /// Spreadsheet values
    #[command(subcommand)]
    Sheets(sheets::SheetsCommand),

    /// Presentation placeholders and speaker notes
    #[command(subcommand)]
    Slides(slides::SlidesCommand),

    /// Document text
    #[command(subcommand)]
    Docs(docs::DocsCommand),

    /// Task lists and tasks
    #[command(subcommand)]
    Tasks(tasks::TasksCommand),

    /// Cloud Storage uploads and signed URLs
    #[command(subcommand)]
    Storage(storage::StorageCommand),
}

async fn connect(credentials: Option<PathBuf>, subject: Option<String>) -> anyhow::Result<Session> {
    let mut config = Config::from_env();
    if subject.is_some() {
        config.impersonate_subject = subject;
    }

    let resolved = CredentialResolver::from_env(credentials)
        .resolve()
        .await
        .context("Could not load Google credentials")?;

    let provider = resolved
        .credentials
        .clone()
        .into_provider(config.impersonate_subject.clone());
    tracing::info!("Authenticating as {}", provider.describe());

    let transport = ReqwestTransport::new(provider, &config)?;
    Ok(Session {
        workspace: Workspace::new(transport),
        credentials: resolved,
    })
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let session = connect(cli.credentials, cli.subject).await?;

    match cli.command {
        Command::Drive(command) => drive::run(&session, command).await,
        Command::Sheets(command) => sheets::run(&session, command).await,
        Command::Slides(command) => slides::run(&session, command).await,
        Command::Docs(command) => docs::run(&session, command).await,
        Command::Tasks(command) => tasks::run(&session, command).await,
        Command::Storage(command) => storage::run(&session, command).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_work_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "gworkspace",
            "drive",
            "info",
            "abc",
            "--credentials",
            "/tmp/key.json",
        ])
        .unwrap();
        assert_eq!(cli.credentials, Some(PathBuf::from("/tmp/key.json")));
        assert!(matches!(cli.command, Command::Drive(_)));
    }

    #[test]
    fn fetch_image_takes_an_open_flag() {
        let cli = Cli::try_parse_from([
            "gworkspace",
            "drive",
            "fetch-image",
            "https://example.com/logo.png",
            "--dest",
            "assets",
            "--open",
        ])
        .unwrap();
        match cli.command {
            Command::Drive(drive::DriveCommand::FetchImage { url, dest, open, .. }) => {
                assert_eq!(url, "https://example.com/logo.png");
                assert_eq!(dest, PathBuf::from("assets"));
                assert!(open);
            }
            _ => panic!("expected drive fetch-image"),
        }
    }
}

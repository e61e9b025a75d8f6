use std::path::PathBuf;

use clap::Subcommand;

use super::output::print_json;
use crate::cli::Session;
use gworkspace::core::drive::{CopyOptions, ExportTarget, ShareOptions};
use gworkspace::infra::config::Config;
use gworkspace::infra::image_download::ImageDownloader;

#[derive(Subcommand)]
pub enum DriveCommand {
    /// Show a file's metadata
    Info {
        file_id: String,
        /// Also open the file in the browser
        #[arg(long)]
        open: bool,
    },

    /// Copy a file
    Copy {
        file_id: String,
        /// Name of the copy (defaults to the original name)
        #[arg(long)]
        name: Option<String>,
        /// Destination folder (defaults to the original's folder)
        #[arg(long)]
        parent: Option<String>,
        /// Give the copy the same permissions as the original
        #[arg(long)]
        with_permissions: bool,
    },

    /// Move a file into a folder
    Move { file_id: String, folder_id: String },

    /// Delete a file
    Delete { file_id: String },

    /// Create a folder
    Mkdir {
        name: String,
        #[arg(long)]
        parent: Option<String>,
    },

    /// Export a Docs, Sheets or Slides file
    Export {
        file_id: String,
        /// Destination folder
        #[arg(long, default_value = ".")]
        dest: PathBuf,
        /// Output file name; its extension picks the format
        #[arg(long)]
        name: Option<String>,
        /// Target MIME type
        #[arg(long)]
        mime: Option<String>,
        /// Target extension (pdf, docx, csv...)
        #[arg(long)]
        ext: Option<String>,
        /// Open the exported file afterwards
        #[arg(long)]
        open: bool,
    },

    /// Download a binary file
    Download {
        file_id: String,
        #[arg(long, default_value = ".")]
        dest: PathBuf,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        open: bool,
    },

    /// Download an image from a public URL
    FetchImage {
        url: String,
        #[arg(long, default_value = ".")]
        dest: PathBuf,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        open: bool,
    },
}

pub async fn run(session: &Session, command: DriveCommand) -> anyhow::Result<()> {
    let drive = &session.workspace.drive;

    match command {
        DriveCommand::Info { file_id, open } => {
            let file = drive.get(&file_id).await?;
            print_json(&file)?;
            if open {
                drive.open_in_browser(&file)?;
            }
        }
        DriveCommand::Copy {
            file_id,
            name,
            parent,
            with_permissions,
        } => {
            let file = drive.get(&file_id).await?;
            let options = CopyOptions {
                parent,
                transfer_permissions: with_permissions.then(ShareOptions::default),
                ..CopyOptions::default()
            };
            let copy = drive.copy(&file, name.as_deref(), options).await?;
            println!("{}\t{}", copy.id, copy.name);
        }
        DriveCommand::Move { file_id, folder_id } => {
            let mut file = drive.get(&file_id).await?;
            drive.move_to(&mut file, &folder_id).await?;
        }
        DriveCommand::Delete { file_id } => {
            drive.delete(&file_id).await?;
        }
        DriveCommand::Mkdir { name, parent } => {
            let folder = drive.create_folder(&name, parent.as_deref()).await?;
            println!("{}\t{}", folder.id, folder.url());
        }
        DriveCommand::Export {
            file_id,
            dest,
            name,
            mime,
            ext,
            open,
        } => {
            let file = drive.get(&file_id).await?;
            let target = ExportTarget {
                file_name: name,
                mime_type: mime,
                extension: ext,
            };
            let path = drive.export(&file, &dest, &target, open).await?;
            println!("{}", path.display());
        }
        DriveCommand::Download {
            file_id,
            dest,
            name,
            open,
        } => {
            let file = drive.get(&file_id).await?;
            let path = drive.download(&file, &dest, name.as_deref(), open).await?;
            println!("{}", path.display());
        }
        DriveCommand::FetchImage {
            url,
            dest,
            name,
            open,
        } => {
            let path = ImageDownloader::new(&Config::from_env())?
                .download_image_from_url(&url, &dest, name.as_deref(), open)
                .await?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

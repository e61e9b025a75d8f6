use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;
use clap::{Subcommand, ValueEnum};

use crate::cli::Session;
use gworkspace::core::transport::HttpMethod;
use gworkspace::infra::storage::V4Signer;

#[derive(Clone, Copy, ValueEnum)]
pub enum SignMethod {
    Get,
    Put,
    Delete,
}

impl From<SignMethod> for HttpMethod {
    fn from(method: SignMethod) -> Self {
        match method {
            SignMethod::Get => HttpMethod::Get,
            SignMethod::Put => HttpMethod::Put,
            SignMethod::Delete => HttpMethod::Delete,
        }
    }
}

#[derive(Subcommand)]
pub enum StorageCommand {
    /// Upload a local file and print its public URL
    Upload {
        path: PathBuf,
        bucket: String,
        /// Object name (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Print a V4 signed URL for an object (service accounts only)
    Sign {
        bucket: String,
        object: String,
        #[arg(long, value_enum, default_value = "get")]
        method: SignMethod,
        /// Lifetime in minutes (at most 7 days)
        #[arg(long, default_value_t = 30)]
        minutes: u64,
    },
}

pub async fn run(session: &Session, command: StorageCommand) -> anyhow::Result<()> {
    match command {
        StorageCommand::Upload { path, bucket, name } => {
            let object_name = match name {
                Some(name) => name,
                None => path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .ok_or_else(|| anyhow!("{} has no file name", path.display()))?,
            };
            let url = session
                .workspace
                .storage
                .upload_file(&path, &bucket, &object_name)
                .await?;
            println!("{}", url);
        }
        StorageCommand::Sign {
            bucket,
            object,
            method,
            minutes,
        } => {
            let key = session
                .credentials
                .credentials
                .service_account_key()
                .ok_or_else(|| {
                    anyhow!(
                        "Signing needs a service account key, found {} credentials",
                        session.credentials.credentials.kind()
                    )
                })?;
            let url = V4Signer::new(key)?.signed_url(
                &bucket,
                &object,
                method.into(),
                Some(Duration::from_secs(minutes * 60)),
                chrono::Utc::now(),
            )?;
            println!("{}", url);
        }
    }

    Ok(())
}

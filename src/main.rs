// This is the entry point of the `gworkspace` command line tool.
//
// This file's job is to:
// 1. Load configuration (.env, environment)
// 2. Set up logging
// 3. Hand the parsed arguments to the CLI layer, which resolves
//    credentials, builds the services and runs the command

#[path = "cli/cli_layer.rs"]
mod cli;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    dotenv::dotenv().ok();

    // Logs go to stderr so command output can be piped.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args = cli::Cli::parse();
    cli::run(args).await
}

//! mdnotes CLI - markdown notes from the terminal
//!
//! Every command opens the note store over the configured backend, applies
//! one operation, and waits for the resulting save before exiting.

mod cli;
mod commands;
mod error;

#[cfg(test)]
mod tests;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::common::resolve_data_dir;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::list::run_list;
use crate::commands::mode::run_mode;
use crate::commands::new::run_new;
use crate::commands::show::{run_show, ShowFormat};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mdnotes=warn,mdnotes_core=warn")),
        )
        .init();

    let cli = Cli::parse();
    let data_dir = resolve_data_dir(cli.data_dir);

    match cli.command {
        Some(Commands::New { content }) => run_new(&content, &data_dir).await?,
        Some(Commands::List { json }) => run_list(json, &data_dir).await?,
        Some(Commands::Show {
            id,
            html,
            highlight,
        }) => {
            let format = ShowFormat::from_flags(html, highlight);
            run_show(id.as_deref(), format, &data_dir).await?;
        }
        Some(Commands::Edit { id, content }) => run_edit(&id, &content, &data_dir).await?,
        Some(Commands::Delete { id }) => run_delete(&id, &data_dir).await?,
        Some(Commands::Mode { mode }) => run_mode(mode.map(Into::into), &data_dir)?,
        None => {
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}

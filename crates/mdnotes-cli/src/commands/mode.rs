use std::path::Path;

use mdnotes_core::{StorageConfig, StorageMode};

use crate::error::CliError;

pub fn run_mode(mode: Option<StorageMode>, data_dir: &Path) -> Result<(), CliError> {
    match mode {
        Some(mode) => {
            StorageConfig::persist_mode(data_dir, mode)?;
            tracing::info!("Storage mode preference set to {}", mode);
            println!("{mode}");
        }
        None => println!("{}", StorageConfig::load(data_dir).mode),
    }
    Ok(())
}

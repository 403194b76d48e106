use std::path::Path;

use crate::commands::common::{ensure_saved, open_store, resolve_note_content};
use crate::error::CliError;

pub async fn run_new(content_parts: &[String], data_dir: &Path) -> Result<(), CliError> {
    let content = resolve_note_content(content_parts)?.unwrap_or_default();

    let store = open_store(data_dir).await?;
    let (id, handle) = store.create_note(&content);
    ensure_saved(handle, &store).await?;

    println!("{id}");
    Ok(())
}

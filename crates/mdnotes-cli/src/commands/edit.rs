use std::path::Path;

use crate::commands::common::{
    ensure_saved, normalize_note_identifier, open_store, resolve_note, resolve_note_content,
};
use crate::error::CliError;

pub async fn run_edit(id: &str, content_parts: &[String], data_dir: &Path) -> Result<(), CliError> {
    let normalized_id = normalize_note_identifier(id)?;
    let content = resolve_note_content(content_parts)?.ok_or(CliError::EmptyContent)?;

    let store = open_store(data_dir).await?;
    let note_id = resolve_note(&normalized_id, &store.notes())?.id.clone();

    store.switch_note(&note_id);
    store.set_content(content);
    if let Some(handle) = store.save_now() {
        ensure_saved(handle, &store).await?;
    }

    println!("{note_id}");
    Ok(())
}

use std::path::Path;

use crate::commands::common::{ensure_saved, normalize_note_identifier, open_store, resolve_note};
use crate::error::CliError;

pub async fn run_delete(id: &str, data_dir: &Path) -> Result<(), CliError> {
    let normalized_id = normalize_note_identifier(id)?;
    let store = open_store(data_dir).await?;
    let note_id = resolve_note(&normalized_id, &store.notes())?.id.clone();

    if let Some(handle) = store.delete_note(&note_id) {
        ensure_saved(handle, &store).await?;
    }

    println!("{note_id}");
    Ok(())
}

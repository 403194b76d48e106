use std::path::Path;

use chrono::Utc;

use crate::commands::common::{format_note_lines, note_to_list_item, open_store, NoteListItem};
use crate::error::CliError;

pub async fn run_list(as_json: bool, data_dir: &Path) -> Result<(), CliError> {
    let store = open_store(data_dir).await?;
    let notes = store.notes();
    let now_ms = Utc::now().timestamp_millis();

    if as_json {
        let json_items = notes
            .iter()
            .map(|note| note_to_list_item(note, now_ms))
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_note_lines(&notes, now_ms) {
            println!("{line}");
        }
    }

    Ok(())
}

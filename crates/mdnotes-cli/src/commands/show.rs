use std::path::Path;

use mdnotes_core::render::{MarkdownRenderer, Renderer};
use mdnotes_core::Note;

use crate::commands::common::{normalize_note_identifier, open_store, resolve_note};
use crate::error::CliError;

/// How `show` prints a note
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShowFormat {
    Source,
    Html,
    Highlight,
}

impl ShowFormat {
    pub const fn from_flags(html: bool, highlight: bool) -> Self {
        if html {
            Self::Html
        } else if highlight {
            Self::Highlight
        } else {
            Self::Source
        }
    }
}

pub async fn run_show(
    id: Option<&str>,
    format: ShowFormat,
    data_dir: &Path,
) -> Result<(), CliError> {
    let store = open_store(data_dir).await?;
    let note = find_note(id, &store.notes(), store.current_note())?;

    println!("{}", render_note(&note, format));
    Ok(())
}

pub fn render_note(note: &Note, format: ShowFormat) -> String {
    match format {
        ShowFormat::Source => note.content.clone(),
        ShowFormat::Html => MarkdownRenderer.render_to_safe_html(&note.content),
        ShowFormat::Highlight => MarkdownRenderer.highlight_for_editing(&note.content),
    }
}

fn find_note(id: Option<&str>, notes: &[Note], selected: Option<Note>) -> Result<Note, CliError> {
    match id {
        Some(id) => {
            let normalized_id = normalize_note_identifier(id)?;
            resolve_note(&normalized_id, notes).cloned()
        }
        None => selected.ok_or(CliError::NoNotes),
    }
}

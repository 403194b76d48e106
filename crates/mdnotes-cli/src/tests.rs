use std::path::PathBuf;

use chrono::{Duration, Utc};
use clap::Parser;
use mdnotes_core::{Note, NoteId, StorageConfig, StorageMode};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use crate::cli::{Cli, Commands, ModeArg};
use crate::commands::common::{
    format_note_lines, format_relative_time, normalize_content, normalize_note_identifier,
    note_preview, note_to_list_item, open_store, resolve_data_dir, resolve_note,
};
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::mode::run_mode;
use crate::commands::new::run_new;
use crate::commands::show::{render_note, run_show, ShowFormat};
use crate::error::CliError;

fn note(id: &str, content: &str) -> Note {
    Note {
        id: NoteId::from(id),
        ..Note::new(content)
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(' ').map(str::to_string).collect()
}

#[test]
fn normalize_content_rejects_blank_text() {
    assert_eq!(normalize_content(" \n\t "), None);
    assert_eq!(normalize_content(""), None);
}

#[test]
fn normalize_content_keeps_text_verbatim() {
    assert_eq!(normalize_content("  hello  "), Some("  hello  ".to_string()));
    assert_eq!(
        normalize_content("    indented code\n- item\n"),
        Some("    indented code\n- item\n".to_string())
    );
}

#[test]
fn normalize_note_identifier_rejects_blank() {
    assert_eq!(normalize_note_identifier(" abc ").unwrap(), "abc");
    assert!(matches!(
        normalize_note_identifier("   "),
        Err(CliError::EmptyNoteId)
    ));
}

#[test]
fn explicit_data_dir_wins() {
    let dir = PathBuf::from("/tmp/mdnotes-explicit");
    assert_eq!(resolve_data_dir(Some(dir.clone())), dir);
}

#[test]
fn format_relative_time_units() {
    let now = 400 * 24 * 60 * 60_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
    assert_eq!(format_relative_time(now - 3 * 24 * 60 * 60_000, now), "3d ago");
    assert_eq!(format_relative_time(now - 380 * 24 * 60 * 60_000, now), "1y ago");
}

#[test]
fn future_timestamps_read_as_just_now() {
    assert_eq!(format_relative_time(2_000, 1_000), "just now");
}

#[test]
fn note_preview_skips_blank_lines_and_truncates() {
    let note = note("1", "\n\n#  A   heading with    spaces\nbody");
    assert_eq!(note_preview(&note, 80), "# A heading with spaces");
    assert_eq!(note_preview(&note, 10), "# A hea...");
}

#[test]
fn resolve_note_prefers_exact_match() {
    let notes = vec![note("abc", "long id"), note("ab", "short id")];
    assert_eq!(resolve_note("ab", &notes).unwrap().content, "short id");
}

#[test]
fn resolve_note_accepts_unique_prefix() {
    let notes = vec![note("0192-aaaa", "first"), note("0192-bbbb", "second")];
    assert_eq!(resolve_note("0192-b", &notes).unwrap().content, "second");
}

#[test]
fn resolve_note_rejects_ambiguous_prefix() {
    let notes = vec![note("0192-aaaa", "first"), note("0192-bbbb", "second")];
    let Err(CliError::AmbiguousNoteId(message)) = resolve_note("0192", &notes) else {
        panic!("expected ambiguous id error");
    };
    assert!(message.contains("0192-aaaa"));
    assert!(message.contains("0192-bbbb"));
}

#[test]
fn resolve_note_reports_missing_id() {
    let notes = vec![note("abc", "x")];
    assert!(matches!(
        resolve_note("zzz", &notes),
        Err(CliError::NoteNotFound(query)) if query == "zzz"
    ));
}

#[test]
fn list_lines_show_short_id_title_preview_and_age() {
    let mut old = note("0192f3a4-5b6c-7d8e-9f00", "Groceries\nmilk");
    old.updated_at = Utc::now() - Duration::hours(3);
    let now_ms = Utc::now().timestamp_millis();

    let lines = format_note_lines(&[old.clone()], now_ms);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("0192f3a4-5b6c  "));
    assert!(lines[0].contains(&old.title));
    assert!(lines[0].contains("Groceries"));
    assert!(lines[0].ends_with("3h ago"));
}

#[test]
fn list_item_serializes_camel_case() {
    let item = note_to_list_item(&note("1", "hello"), Utc::now().timestamp_millis());
    let json = serde_json::to_value(&item).unwrap();

    assert_eq!(json["id"], "1");
    assert_eq!(json["preview"], "hello");
    assert_eq!(json["relativeTime"], "just now");
    assert!(json.get("updatedAt").is_some());
}

#[test]
fn mode_arg_maps_to_storage_mode() {
    assert_eq!(StorageMode::from(ModeArg::Simple), StorageMode::Simple);
    assert_eq!(StorageMode::from(ModeArg::Indexed), StorageMode::Indexed);
}

#[tokio::test]
async fn new_edit_delete_round_trip_in_simple_mode() {
    let tmp = tempdir().unwrap();
    let data_dir = tmp.path().join("data");

    run_new(&words("first note"), &data_dir).await.unwrap();
    run_new(&words("second note"), &data_dir).await.unwrap();

    let notes = open_store(&data_dir).await.unwrap().notes();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].content, "second note");
    assert_eq!(notes[1].content, "first note");

    let first_id = notes[1].id.clone();
    run_edit(first_id.as_str(), &words("first, revised"), &data_dir)
        .await
        .unwrap();

    let store = open_store(&data_dir).await.unwrap();
    let revised = resolve_note(first_id.as_str(), &store.notes()).unwrap().clone();
    assert_eq!(revised.content, "first, revised");
    assert!(revised.updated_at > notes[1].updated_at);
    assert_eq!(store.notes()[1].id, first_id);
    drop(store);

    run_delete(first_id.as_str(), &data_dir).await.unwrap();
    let remaining = open_store(&data_dir).await.unwrap().notes();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].content, "second note");
}

#[tokio::test]
async fn edit_with_unchanged_content_is_accepted() {
    let tmp = tempdir().unwrap();
    run_new(&words("same"), tmp.path()).await.unwrap();
    let id = open_store(tmp.path()).await.unwrap().notes()[0].id.clone();

    run_edit(id.as_str(), &words("same"), tmp.path()).await.unwrap();

    let notes = open_store(tmp.path()).await.unwrap().notes();
    assert_eq!(notes[0].content, "same");
}

#[tokio::test]
async fn show_reports_missing_notes() {
    let tmp = tempdir().unwrap();

    assert!(matches!(
        run_show(None, ShowFormat::Source, tmp.path()).await,
        Err(CliError::NoNotes)
    ));
    assert!(matches!(
        run_show(Some("nope"), ShowFormat::Html, tmp.path()).await,
        Err(CliError::NoteNotFound(_))
    ));
}

#[tokio::test]
async fn show_prints_selected_note() {
    let tmp = tempdir().unwrap();
    run_new(&words("# Title"), tmp.path()).await.unwrap();

    run_show(None, ShowFormat::Html, tmp.path()).await.unwrap();
    run_show(None, ShowFormat::Highlight, tmp.path()).await.unwrap();
    run_show(None, ShowFormat::Source, tmp.path()).await.unwrap();
}

#[test]
fn show_flags_pick_format() {
    assert_eq!(ShowFormat::from_flags(false, false), ShowFormat::Source);
    assert_eq!(ShowFormat::from_flags(true, false), ShowFormat::Html);
    assert_eq!(ShowFormat::from_flags(false, true), ShowFormat::Highlight);
}

#[test]
fn show_accepts_one_output_flag() {
    let cli = Cli::try_parse_from(["mdnotes", "show", "--highlight"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Show {
            highlight: true,
            html: false,
            ..
        })
    ));
    assert!(Cli::try_parse_from(["mdnotes", "show", "--html", "--highlight"]).is_err());
}

#[test]
fn render_note_formats() {
    let note = note("1", "# Title\n**bold** <b>");

    assert_eq!(render_note(&note, ShowFormat::Source), "# Title\n**bold** <b>");
    assert_eq!(
        render_note(&note, ShowFormat::Html),
        "<h1>Title</h1>\n<p><strong>bold</strong> &lt;b&gt;</p>\n"
    );
    assert_eq!(
        render_note(&note, ShowFormat::Highlight),
        "<span class=\"md-heading md-h1\"># Title</span>\n\
         <span class=\"md-bold\">**bold**</span> &lt;b&gt;"
    );
}

#[tokio::test]
async fn new_and_edit_store_content_verbatim() {
    let tmp = tempdir().unwrap();
    let content = vec!["  indented\n\n".to_string()];

    run_new(&content, tmp.path()).await.unwrap();
    let id = open_store(tmp.path()).await.unwrap().notes()[0].id.clone();
    assert_eq!(
        open_store(tmp.path()).await.unwrap().notes()[0].content,
        "  indented\n\n"
    );

    let edited = vec!["line 1\n    code\n".to_string()];
    run_edit(id.as_str(), &edited, tmp.path()).await.unwrap();
    assert_eq!(
        open_store(tmp.path()).await.unwrap().notes()[0].content,
        "line 1\n    code\n"
    );
}

#[test]
fn mode_preference_persists() {
    let tmp = tempdir().unwrap();

    run_mode(None, tmp.path()).unwrap();
    assert_eq!(StorageConfig::load(tmp.path()).mode, StorageMode::Simple);

    run_mode(Some(StorageMode::Indexed), tmp.path()).unwrap();
    assert_eq!(StorageConfig::load(tmp.path()).mode, StorageMode::Indexed);
}

#[tokio::test(flavor = "multi_thread")]
async fn indexed_mode_stores_notes_in_database() {
    let tmp = tempdir().unwrap();
    run_mode(Some(StorageMode::Indexed), tmp.path()).unwrap();

    run_new(&words("kept in the record store"), tmp.path())
        .await
        .unwrap();

    assert!(tmp.path().join("notes.db").exists());
    let store = open_store(tmp.path()).await.unwrap();
    assert!(!store.is_loading());
    assert_eq!(store.notes().len(), 1);
    assert_eq!(store.buffer(), "kept in the record store");
}

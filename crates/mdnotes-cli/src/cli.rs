use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use mdnotes_core::StorageMode;

#[derive(Parser)]
#[command(name = "mdnotes")]
#[command(about = "Markdown notes with local autosave")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding the notes and the storage-mode preference
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note and select it
    #[command(alias = "add")]
    New {
        /// Note content (read from piped stdin when omitted)
        content: Vec<String>,
    },
    /// List notes, most recently created first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a note's content
    Show {
        /// Note ID or unique ID prefix (defaults to the selected note)
        id: Option<String>,
        /// Print the rendered preview instead of the markdown source
        #[arg(long, conflicts_with = "highlight")]
        html: bool,
        /// Print the source with markdown syntax wrapped in `md-*` spans
        #[arg(long)]
        highlight: bool,
    },
    /// Replace a note's content
    Edit {
        /// Note ID or unique ID prefix
        id: String,
        /// New content (read from piped stdin when omitted)
        content: Vec<String>,
    },
    /// Delete a note
    Delete {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Show or set the storage mode used from the next start
    Mode {
        #[arg(value_enum)]
        mode: Option<ModeArg>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ModeArg {
    /// One JSON document in the data directory
    #[value(alias = "localStorage")]
    Simple,
    /// One database record per note
    #[value(alias = "indexedDB")]
    Indexed,
}

impl From<ModeArg> for StorageMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Simple => Self::Simple,
            ModeArg::Indexed => Self::Indexed,
        }
    }
}

use crate::constants::{APP_DESCRIPTION, APP_NAME, LOG_FORMAT_JSON, LOG_FORMAT_TEXT};
use crate::model::Mood;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// A developer mood journal with local, size-bounded storage
#[derive(Parser, Debug)]
#[clap(name = APP_NAME, about = APP_DESCRIPTION)]
#[clap(author, version, long_about = None)]
pub struct CliArgs {
    /// Print verbose output
    #[clap(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[clap(long, global = true, default_value = LOG_FORMAT_TEXT, value_parser = [LOG_FORMAT_TEXT, LOG_FORMAT_JSON])]
    pub log_format: String,

    #[clap(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Write, list, edit or delete journal entries
    #[clap(subcommand)]
    Entry(EntryCommand),

    /// Manage goals
    #[clap(subcommand)]
    Goal(GoalCommand),

    /// Set or show the current mood
    #[clap(subcommand)]
    Mood(MoodCommand),

    /// Switch between light and dark theme
    #[clap(subcommand)]
    Theme(ThemeCommand),

    /// Keep unfinished writing around
    #[clap(subcommand)]
    Draft(DraftCommand),

    /// Track focus sessions
    #[clap(subcommand)]
    Pomodoro(PomodoroCommand),

    /// Store or forget the GitHub token
    #[clap(subcommand)]
    Token(TokenCommand),

    /// Print the decoded value stored under a key
    Get {
        /// Storage key, e.g. journalEntries
        key: String,
    },

    /// Store a JSON value under a key
    Set {
        /// Storage key
        key: String,
        /// JSON text to store
        value: String,
    },

    /// Export all data to a dated snapshot file
    Export {
        /// Target directory (defaults to the configured backup directory)
        #[clap(short, long)]
        dir: Option<PathBuf>,
    },

    /// Merge a snapshot file into the journal
    Import {
        /// Snapshot file to import
        path: PathBuf,
    },

    /// Reclaim space by dropping old entries, drafts and completed goals
    Prune,

    /// Show storage usage and the last backup time
    Status,

    /// Run the periodic backup worker until interrupted
    Watch,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum EntryCommand {
    /// Save a new entry
    Add(EntryArgs),
    /// List entries, newest first
    List {
        /// Show at most this many entries
        #[clap(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Replace the content of an entry
    Edit {
        /// Entry id
        id: String,
        /// New content
        content: String,
    },
    /// Delete an entry
    Delete {
        /// Entry id
        id: String,
    },
}

#[derive(Args, Debug, PartialEq)]
pub struct EntryArgs {
    /// Entry text
    pub content: String,

    /// Mood name, emoji or index (defaults to the current mood)
    #[clap(short, long)]
    pub mood: Option<Mood>,

    /// Tag for the entry; may be repeated
    #[clap(short, long = "tag")]
    pub tags: Vec<String>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum GoalCommand {
    /// Add a goal
    Add {
        /// Goal text
        text: String,
    },
    /// Mark a goal completed, or open again
    Toggle {
        /// Goal id
        id: String,
    },
    /// Remove a goal
    Remove {
        /// Goal id
        id: String,
    },
    /// List goals
    List,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum MoodCommand {
    /// Select the current mood
    Set {
        /// Mood name, emoji or index
        mood: Mood,
    },
    /// Show the current mood
    Show,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ThemeCommand {
    /// Flip dark mode
    Toggle,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum DraftCommand {
    /// Save a draft
    Save {
        /// Draft text
        content: String,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum PomodoroCommand {
    /// Record a completed session
    Record {
        /// Focus minutes in the session
        #[clap(short, long, default_value_t = 25)]
        minutes: u64,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum TokenCommand {
    /// Store the token
    Set {
        /// Personal access token
        token: String,
    },
    /// Forget the token
    Clear,
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        CliArgs::parse()
    }

    /// Whether logs should be emitted as JSON.
    pub fn json_logs(&self) -> bool {
        self.log_format == LOG_FORMAT_JSON
    }
}

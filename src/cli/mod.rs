pub mod add;
pub mod bookmarks;
pub mod common;
pub mod config;
pub mod edit;
pub mod export;
pub mod get;
pub mod import;
pub mod init;
pub mod json_output;
pub mod list;
pub mod rekey;
pub mod remove;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "stash",
    version,
    about = "Encrypted password vault and bookmark interchange"
)]
pub struct Cli {
    /// Output results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new vault
    Init {
        /// Set vault passphrase non-interactively
        #[arg(long)]
        passphrase: Option<String>,
    },

    /// Add a password record (reads the password from stdin)
    Add {
        /// Service the account belongs to
        #[arg(long)]
        service: String,
        /// Account identifier
        #[arg(long)]
        username: String,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Show a record
    Get {
        /// Record id
        id: String,
        /// Print a single field only (service, username, password, url, notes, tags)
        #[arg(long)]
        field: Option<String>,
    },

    /// List records
    List {
        /// Filter on service, username, url and tags
        #[arg(long)]
        search: Option<String>,
    },

    /// Change fields of a record
    Edit {
        /// Record id
        id: String,
        #[arg(long)]
        service: Option<String>,
        #[arg(long)]
        username: Option<String>,
        /// New url (empty string clears it)
        #[arg(long)]
        url: Option<String>,
        /// New notes (empty string clears them)
        #[arg(long)]
        notes: Option<String>,
        /// Replace all tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Remove all tags
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
        /// Read a new password from stdin
        #[arg(long)]
        password_stdin: bool,
    },

    /// Remove a record
    Remove {
        /// Record id
        id: String,
    },

    /// Export all records as plaintext JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<String>,
    },

    /// Import records from a plaintext JSON export
    Import {
        /// Path to the export file (use '-' for stdin)
        file: String,
    },

    /// Re-encrypt the vault under a new passphrase
    Rekey {
        /// Set the new passphrase non-interactively
        #[arg(long)]
        new_passphrase: Option<String>,
    },

    /// Convert and inspect browser bookmark files
    Bookmarks {
        #[command(subcommand)]
        command: BookmarksCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BookmarkFormat {
    Html,
    Json,
}

#[derive(Subcommand)]
pub enum BookmarksCommands {
    /// Convert a bookmark file between HTML and JSON
    Convert {
        /// Input file (.html/.htm or .json; use '-' for stdin with --from)
        input: String,
        /// Input format (detected from the extension or content if omitted)
        #[arg(long, value_enum)]
        from: Option<BookmarkFormat>,
        /// Output format (defaults to the other one)
        #[arg(long, value_enum)]
        to: Option<BookmarkFormat>,
        /// Output file (defaults to stdout)
        #[arg(long, short)]
        output: Option<String>,
        /// Write to the conventional file name in the current directory
        #[arg(long, conflicts_with = "output")]
        default_name: bool,
        /// Put every bookmark into the default folder
        #[arg(long)]
        flat: bool,
        /// Stamp the import time instead of keeping source dates
        #[arg(long)]
        no_dates: bool,
        /// Export one flat list instead of nested folders
        #[arg(long)]
        no_groups: bool,
        /// Leave out bookmarks that are not in any folder
        #[arg(long)]
        skip_uncategorized: bool,
    },

    /// Print the folder tree of a bookmark file
    Show {
        /// Input file
        input: String,
        #[arg(long, value_enum)]
        from: Option<BookmarkFormat>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use lostfound_types::{ItemStatus, Role};

#[derive(Debug, Parser)]
#[command(name = "lostfound", version, about = "Lost & found board for a small community")]
pub struct Cli {
    /// Database file. Overrides LOSTFOUND_DB_PATH.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Who is acting. Required by every command that reads or changes posts
/// on someone's behalf.
#[derive(Debug, Clone, Args)]
pub struct Credentials {
    #[arg(long = "user", env = "LOSTFOUND_USER")]
    pub username: String,

    #[arg(long, env = "LOSTFOUND_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "user")]
        role: Role,
    },

    /// Check a username and password
    Login(Credentials),

    /// Show every posted item
    List {
        #[arg(long)]
        json: bool,
    },

    /// Show one item
    Show {
        id: i64,
        #[arg(long)]
        json: bool,
    },

    /// Post a lost or found item
    Post {
        #[command(flatten)]
        auth: Credentials,
        /// lost or found
        #[arg(long)]
        status: ItemStatus,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Phone number or email
        #[arg(long, default_value = "")]
        contact: String,
        /// Photo of the item (png, jpg, jpeg or bmp)
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Edit an item. Fields left out keep their current value.
    Update {
        id: i64,
        #[command(flatten)]
        auth: Credentials,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<ItemStatus>,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long, conflicts_with = "clear_image")]
        image: Option<PathBuf>,
        #[arg(long)]
        clear_image: bool,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Mark an item as returned
    Resolve {
        id: i64,
        #[command(flatten)]
        auth: Credentials,
        #[arg(long, short)]
        yes: bool,
    },

    /// Delete an item
    Delete {
        id: i64,
        #[command(flatten)]
        auth: Credentials,
        #[arg(long, short)]
        yes: bool,
    },
}

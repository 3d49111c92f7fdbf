//! Command-line surface: the HTTP server and one-shot maintenance commands.

pub mod http;
pub mod note;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::{Config, Section};

#[derive(Parser, Debug)]
#[command(name = "heart", version, about = "Notes and tasks service backed by PostgreSQL")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the HTTP API (default when no subcommand is given)
    Http,
    /// Create a note directly in the database
    CreateNote {
        /// Unique note name
        #[arg(long)]
        name: String,
        /// Note body
        #[arg(long)]
        content: String,
    },
}

impl Command {
    /// Configuration sections the command needs.
    pub fn sections(&self) -> &'static [Section] {
        match self {
            Command::Http => &[Section::Http, Section::Postgres, Section::Redis],
            Command::CreateNote { .. } => &[Section::Postgres, Section::Cli],
        }
    }
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Http)
    }
}

pub async fn run(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Http => http::serve(config).await,
        Command::CreateNote { name, content } => note::create_note(config, name, content).await,
    }
}

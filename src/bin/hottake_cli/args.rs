//! Command-line surface for `hottake-cli`.

#![deny(clippy::all, clippy::pedantic)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "hottake-cli", version, about = "Terminal client for the hottake feed", long_about = None)]
pub struct Cli {
    /// API base URL, e.g. <https://hottake.gg>
    #[arg(long, env = "HOTTAKE_SITE_URL")]
    pub site: Option<String>,

    /// Session state file (defaults to $XDG_STATE_HOME/hottake/session.json)
    #[arg(long, value_name = "PATH")]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Browse the feed
    Feed(FeedCmd),
    /// Publish a new take
    Post(PostCmd),
    /// Fetch a single take by id
    Show(ShowCmd),
}

#[derive(Parser, Debug)]
pub struct FeedCmd {
    /// Load this many pages and exit instead of paging interactively
    #[arg(long, value_name = "COUNT")]
    pub pages: Option<u32>,

    /// Print raw JSON instead of formatted lines
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct PostCmd {
    /// The take itself (longer than 5, at most 140 characters)
    pub title: String,
}

#[derive(Parser, Debug)]
pub struct ShowCmd {
    /// Post identifier
    pub id: String,
}

//! Command-line interface definitions and parsing
//!
//! This module defines the CLI structure for storedesk using the `clap` crate.
//!
//! # Commands
//!
//! - **list**: Show the listing through a saved view (default)
//! - **views**: Show the saved view tabs
//! - **generate**: Generate, review and apply a description for one product
//! - **config**: Show or change configuration settings
//!
//! # Examples
//!
//! ```
//! use clap::Parser;
//! use storedesk::cli::{Cli, Commands};
//!
//! let cli = Cli::parse_from(["storedesk", "list", "--view", "1", "--status", "active"]);
//! assert!(matches!(cli.get_command(), Commands::List { view: Some(1), .. }));
//! ```

use crate::items::{ItemId, StatusTag};
use crate::views::SortKey;
use clap::{Parser, Subcommand};

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "storedesk")]
#[command(about = "Storefront catalog listing and description assistant", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

/// Filter/sort overrides applied on top of the selected view
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct CriteriaArgs {
    /// Only show these statuses (can specify multiple)
    #[arg(short = 's', long = "status", value_name = "STATUS", num_args = 1..)]
    pub statuses: Vec<StatusTag>,

    /// Only show these product types (can specify multiple)
    #[arg(short = 't', long = "type", value_name = "TYPE", num_args = 1..)]
    pub categories: Vec<String>,

    /// Case-insensitive text to look for in title or type
    #[arg(long = "query", value_name = "TEXT")]
    pub query: Option<String>,

    /// Sort order, e.g. "product asc" or "tone desc"
    #[arg(long = "sort", value_name = "SORT")]
    pub sort: Option<SortKey>,
}

impl CriteriaArgs {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List products through a saved view (default)
    #[command(visible_alias = "ls")]
    List {
        /// Index of the view to use
        #[arg(short = 'v', long = "view", value_name = "INDEX")]
        view: Option<usize>,

        #[command(flatten)]
        criteria: CriteriaArgs,

        /// Print the projection as JSON
        #[arg(long = "json")]
        json: bool,
    },

    /// Show saved views
    Views,

    /// Generate a description for one product, review it and apply it
    #[command(visible_alias = "gen")]
    Generate {
        /// Product id
        #[arg(value_name = "ID")]
        id: ItemId,

        /// Apply the generated text without prompting
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },

    /// Manage configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key=value (e.g., base_url=http://localhost:3000)
        #[arg(value_name = "KEY=VALUE")]
        setting: String,
    },
}

impl ConfigCommands {
    /// Split a `KEY=VALUE` setting
    ///
    /// Returns `None` if there is no `=` or the key is empty.
    #[must_use]
    pub fn parse_setting(setting: &str) -> Option<(&str, &str)> {
        let (key, value) = setting.split_once('=')?;
        let key = key.trim();
        (!key.is_empty()).then_some((key, value))
    }
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the command, defaulting to List if none specified
    #[must_use]
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::List {
            view: None,
            criteria: CriteriaArgs::default(),
            json: false,
        })
    }
}

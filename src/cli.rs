use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::dispatcher::Action;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate text and print the rendered result
    Translate {
        /// Text to translate; the whole text is used as the selection
        text: String,

        /// Provider id from the configuration
        #[arg(short, long, default_value = "youdao")]
        provider: String,

        /// Translate the word at this character position instead of the whole text
        #[arg(long)]
        at: Option<usize>,

        /// Follow-up action to run on the result
        #[arg(long, value_enum)]
        then: Option<FollowUp>,
    },

    /// Show the context menu that would be offered for a position in the text
    Menu {
        /// Buffer text
        text: String,

        /// Character position of the pointer
        #[arg(long, default_value = "0")]
        at: usize,
    },

    /// Write the default configuration file
    InitConfig {
        /// Output path
        #[arg(short, long, default_value = "seltrans.toml")]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FollowUp {
    Copy,
    Insert,
    Replace,
}

impl From<FollowUp> for Action {
    fn from(follow_up: FollowUp) -> Self {
        match follow_up {
            FollowUp::Copy => Action::Copy,
            FollowUp::Insert => Action::Insert,
            FollowUp::Replace => Action::Replace,
        }
    }
}

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use datachat_engine::DEFAULT_NOTEBOOK_FILE;
use log::LevelFilter;

use crate::config::{PolicySetting, SnapshotSetting};

#[derive(Debug, Parser)]
#[command(name = "datachat", version, about = "Talk to a CSV dataset from the terminal")]
pub struct Cli {
    /// RON config file. Defaults to ./datachat.ron when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// CSV file with a header row.
    #[arg(long, global = true)]
    pub dataset: Option<PathBuf>,

    /// How the dataset is sent to the model.
    #[arg(long, global = true, value_enum)]
    pub snapshot: Option<SnapshotSetting>,

    /// Mailbox file shared by `chat` and `input`.
    #[arg(long, global = true)]
    pub mailbox: Option<PathBuf>,

    /// What `chat` does with a message that arrives while a reply is pending.
    #[arg(long, global = true, value_enum)]
    pub policy: Option<PolicySetting>,

    /// Base URL of an OpenAI-compatible API.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[arg(long, global = true)]
    pub model: Option<String>,

    #[arg(long, global = true, env = "DATACHAT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log file. Defaults to ./datachat-<command>.log.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Show the transcript and answer messages arriving through the mailbox.
    #[command(alias = "main")]
    Chat,
    /// Type messages and hand them to a running `chat`.
    Input,
    /// Show one bar chart per dataset column.
    Observe,
    /// Print AI recommendations for the dataset.
    Analyze,
    /// Generate a Jupyter notebook for the dataset.
    Notebook {
        #[arg(long, short, default_value = DEFAULT_NOTEBOOK_FILE)]
        output: PathBuf,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Chat => "chat",
            Command::Input => "input",
            Command::Observe => "observe",
            Command::Analyze => "analyze",
            Command::Notebook { .. } => "notebook",
        }
    }

    /// Full-screen commands own the terminal, so they log to a file only.
    pub fn is_full_screen(&self) -> bool {
        matches!(self, Command::Chat | Command::Input | Command::Observe)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

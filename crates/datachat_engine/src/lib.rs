//! Datachat engine: mailbox channel, dataset snapshots, inference and job execution.
mod animation;
mod dataset;
mod engine;
mod inference;
mod mailbox;
mod notebook;
mod persist;
pub mod prompt;
mod types;

pub use animation::{animate_until_cancelled, DEFAULT_ANIMATION_PERIOD};
pub use dataset::{
    column_distribution, column_stats, ColumnChart, ColumnStats, CsvDatasetProvider,
    DatasetError, DatasetProvider, DatasetSnapshot, SnapshotMode, DEFAULT_DATASET_FILE,
};
pub use engine::{EngineConfig, EngineHandle};
pub use inference::{
    CompletionOptions, CompletionRequest, InferenceClient, InferenceSettings, OpenAiCompatClient,
};
pub use mailbox::{Mailbox, MailboxError, DEFAULT_MAILBOX_FILE};
pub use notebook::{
    build_notebook, extract_code_blocks, write_notebook, NotebookError, DEFAULT_NOTEBOOK_FILE,
};
pub use persist::{ensure_parent_dir, write_atomically, PersistError};
pub use types::{EngineEvent, InferenceError, InferenceFailure, JobId};

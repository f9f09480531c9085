//! Datachat core: pure transcript/job state machine and view-model helpers.
mod effect;
mod input;
mod job;
mod msg;
mod state;
mod transcript;
mod update;
mod view_model;

pub use effect::Effect;
pub use input::InputField;
pub use job::{dot_suffix, placeholder_frame, Job, JobId, JobOutcome, JobState, PLACEHOLDER};
pub use msg::Msg;
pub use state::{AppState, ConcurrencyPolicy};
pub use transcript::{LineIndex, Transcript, TranscriptError};
pub use update::update;
pub use view_model::{display_rows, AppViewModel, JobView, TRANSCRIPT_HEADER};

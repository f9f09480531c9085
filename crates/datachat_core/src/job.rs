use crate::LineIndex;

pub type JobId = u64;

/// Text of the placeholder line before any animation frame.
pub const PLACEHOLDER: &str = "AI: Thinking";

const DOT_FRAMES: [&str; 5] = ["", ".", "..", "...", "...."];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Idle,
    AwaitingResponse,
    Completed,
    Failed,
}

/// How a completion request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Answer(String),
    Failure(String),
}

impl JobOutcome {
    pub fn transcript_line(&self) -> String {
        match self {
            JobOutcome::Answer(text) => format!("AI: {text}"),
            JobOutcome::Failure(message) => format!("Error: {message}"),
        }
    }
}

/// Dot suffix for animation tick `tick`: cycles 0..=4 dots.
pub fn dot_suffix(tick: u64) -> &'static str {
    DOT_FRAMES[(tick % DOT_FRAMES.len() as u64) as usize]
}

pub fn placeholder_frame(tick: u64) -> String {
    format!("{PLACEHOLDER}{}", dot_suffix(tick))
}

/// One outstanding request/response cycle, tied to exactly one transcript slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    id: JobId,
    state: JobState,
    slot: LineIndex,
    animation_tick: u64,
}

impl Job {
    pub(crate) fn new(id: JobId, slot: LineIndex) -> Self {
        Self {
            id,
            state: JobState::Idle,
            slot,
            animation_tick: 0,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn slot(&self) -> LineIndex {
        self.slot
    }

    pub fn animation_tick(&self) -> u64 {
        self.animation_tick
    }

    pub(crate) fn begin(&mut self) {
        if self.state == JobState::Idle {
            self.state = JobState::AwaitingResponse;
        }
    }

    /// Advances the dot cycle. Returns the frame to write, or `None` once
    /// the job is no longer awaiting its response.
    pub(crate) fn advance_animation(&mut self) -> Option<String> {
        if self.state != JobState::AwaitingResponse {
            return None;
        }
        self.animation_tick += 1;
        Some(placeholder_frame(self.animation_tick))
    }

    /// Moves to the terminal state matching `outcome`. Returns the final line
    /// exactly once; later calls return `None`.
    pub(crate) fn resolve(&mut self, outcome: &JobOutcome) -> Option<String> {
        if self.state != JobState::AwaitingResponse {
            return None;
        }
        self.state = match outcome {
            JobOutcome::Answer(_) => JobState::Completed,
            JobOutcome::Failure(_) => JobState::Failed,
        };
        Some(outcome.transcript_line())
    }
}

use std::fmt;

pub type JobId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The job's animation timer fired. Never sent after the job's
    /// `JobCompleted`.
    AnimationTick { job_id: JobId },
    JobCompleted {
        job_id: JobId,
        result: Result<String, InferenceError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceError {
    pub kind: InferenceFailure,
    pub message: String,
}

impl InferenceError {
    pub fn new(kind: InferenceFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for InferenceError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferenceFailure {
    InvalidUrl,
    InvalidRequest,
    HttpStatus(u16),
    Timeout,
    MalformedResponse,
    EmptyResponse,
    Network,
}

impl fmt::Display for InferenceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferenceFailure::InvalidUrl => write!(f, "invalid url"),
            InferenceFailure::InvalidRequest => write!(f, "invalid request"),
            InferenceFailure::HttpStatus(code) => write!(f, "http status {code}"),
            InferenceFailure::Timeout => write!(f, "timeout"),
            InferenceFailure::MalformedResponse => write!(f, "malformed response"),
            InferenceFailure::EmptyResponse => write!(f, "empty response"),
            InferenceFailure::Network => write!(f, "network error"),
        }
    }
}

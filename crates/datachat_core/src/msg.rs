#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Raw contents returned by one mailbox poll (possibly empty).
    MailboxPolled(String),
    /// Mailbox read failed; the text is shown in the status line.
    MailboxFailed(String),
    /// Animation timer fired for a job.
    AnimationTick { job_id: crate::JobId },
    /// Engine completion for a job.
    JobFinished {
        job_id: crate::JobId,
        outcome: crate::JobOutcome,
    },
    ScrollUp,
    ScrollDown,
    /// User cleared the transcript.
    ClearTranscript,
    /// Rows the renderer can scroll back after wrapping to the current
    /// terminal size.
    Viewport { max_scroll_back: usize },
}

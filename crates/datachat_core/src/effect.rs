#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Issue one completion request for `user_text` and animate the job's slot
    /// until it resolves.
    StartJob {
        job_id: crate::JobId,
        user_text: String,
    },
}

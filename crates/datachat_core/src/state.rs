use std::collections::{BTreeMap, VecDeque};

use crate::view_model::{display_rows, AppViewModel, JobView};
use crate::{Effect, Job, JobId, JobOutcome, Transcript, PLACEHOLDER};

/// What to do with a message that arrives while a job is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcurrencyPolicy {
    /// Start another job right away; each job owns its own slot.
    #[default]
    Concurrent,
    /// Hold the message and start it once no job is pending.
    Queue,
    /// Drop the message and report it in the status line.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    policy: ConcurrencyPolicy,
    transcript: Transcript,
    jobs: BTreeMap<JobId, Job>,
    queued: VecDeque<String>,
    next_job_id: JobId,
    scroll_back: usize,
    /// Set by the renderer once it knows the wrapped row count and height.
    scroll_limit: Option<usize>,
    notice: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ConcurrencyPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> ConcurrencyPolicy {
        self.policy
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn job(&self, job_id: JobId) -> Option<&Job> {
        self.jobs.get(&job_id)
    }

    pub fn pending_jobs(&self) -> usize {
        self.jobs.len()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            lines: self.transcript.rendered_view().to_vec(),
            scroll_back: self.scroll_back,
            jobs: self
                .jobs
                .values()
                .map(|job| JobView {
                    job_id: job.id(),
                    state: job.state(),
                    slot: job.slot().position(),
                    animation_tick: job.animation_tick(),
                })
                .collect(),
            queued: self.queued.len(),
            notice: self.notice.clone(),
            policy: self.policy,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn accept_message(&mut self, text: String) -> Vec<Effect> {
        if self.jobs.is_empty() {
            return vec![self.start_job(text)];
        }
        match self.policy {
            ConcurrencyPolicy::Concurrent => vec![self.start_job(text)],
            ConcurrencyPolicy::Queue => {
                self.queued.push_back(text);
                self.dirty = true;
                Vec::new()
            }
            ConcurrencyPolicy::Reject => {
                self.set_notice(format!("Busy, dropped message: {text}"));
                Vec::new()
            }
        }
    }

    fn start_job(&mut self, text: String) -> Effect {
        self.next_job_id += 1;
        let job_id = self.next_job_id;

        self.transcript.append(format!("You: {text}"));
        let slot = self.transcript.append(PLACEHOLDER);
        let mut job = Job::new(job_id, slot);
        job.begin();
        self.jobs.insert(job_id, job);

        self.scroll_back = 0;
        self.dirty = true;
        Effect::StartJob {
            job_id,
            user_text: text,
        }
    }

    pub(crate) fn animate(&mut self, job_id: JobId) {
        let Some(job) = self.jobs.get_mut(&job_id) else {
            return;
        };
        if let Some(frame) = job.advance_animation() {
            let slot = job.slot();
            self.write_slot(slot, frame);
        }
    }

    /// Applies the terminal rewrite and discards the job. Under the queue
    /// policy the next held message starts once nothing is pending.
    pub(crate) fn finish_job(&mut self, job_id: JobId, outcome: JobOutcome) -> Vec<Effect> {
        if let Some(mut job) = self.jobs.remove(&job_id) {
            if let Some(line) = job.resolve(&outcome) {
                self.write_slot(job.slot(), line);
            }
        }

        if self.policy == ConcurrencyPolicy::Queue && self.jobs.is_empty() {
            if let Some(next) = self.queued.pop_front() {
                return vec![self.start_job(next)];
            }
        }
        Vec::new()
    }

    fn write_slot(&mut self, slot: crate::LineIndex, line: String) {
        if let Err(err) = self.transcript.rewrite(slot, line) {
            self.notice = Some(err.to_string());
        }
        self.dirty = true;
    }

    pub(crate) fn set_notice(&mut self, notice: String) {
        self.notice = Some(notice);
        self.dirty = true;
    }

    pub(crate) fn scroll_up(&mut self) {
        let max = self.scroll_limit.unwrap_or_else(|| {
            display_rows(self.transcript.rendered_view())
                .len()
                .saturating_sub(1)
        });
        if self.scroll_back < max {
            self.scroll_back += 1;
            self.dirty = true;
        }
    }

    /// Records how far the view can scroll back and pulls the current
    /// position inside that range.
    pub(crate) fn set_scroll_limit(&mut self, max_scroll_back: usize) {
        self.scroll_limit = Some(max_scroll_back);
        if self.scroll_back > max_scroll_back {
            self.scroll_back = max_scroll_back;
            self.dirty = true;
        }
    }

    pub(crate) fn scroll_down(&mut self) {
        if self.scroll_back > 0 {
            self.scroll_back -= 1;
            self.dirty = true;
        }
    }

    /// Pending jobs keep running; their stale slots are no longer written.
    pub(crate) fn clear_transcript(&mut self) {
        self.transcript.reset();
        self.scroll_back = 0;
        self.notice = None;
        self.dirty = true;
    }
}

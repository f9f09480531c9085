use std::sync::Arc;
#[cfg(test)]
use std::time::Duration;

use datachat_core::{Effect, JobOutcome, Msg};
use datachat_engine::{
    prompt, CompletionOptions, DatasetSnapshot, EngineConfig, EngineEvent, EngineHandle,
    InferenceClient,
};
use engine_logging::{engine_info, engine_warn};

/// Turns core effects into engine jobs and engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    snapshot: DatasetSnapshot,
    options: CompletionOptions,
}

impl EffectRunner {
    pub fn new(
        client: Arc<dyn InferenceClient>,
        snapshot: DatasetSnapshot,
        options: CompletionOptions,
        config: EngineConfig,
    ) -> Self {
        Self {
            engine: EngineHandle::new(client, config),
            snapshot,
            options,
        }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartJob { job_id, user_text } => {
                    engine_info!(
                        "StartJob job_id={} text_len={}",
                        job_id,
                        user_text.len()
                    );
                    let request = prompt::chat_request(&self.snapshot, &user_text, &self.options);
                    self.engine.submit(job_id, request);
                }
            }
        }
    }

    /// Everything the engine reported since the last call, in arrival order.
    pub fn drain(&self) -> Vec<Msg> {
        let mut inbox = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            inbox.push(map_event(event));
        }
        inbox
    }

    #[cfg(test)]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::AnimationTick { job_id } => Msg::AnimationTick { job_id },
        EngineEvent::JobCompleted { job_id, result } => {
            let outcome = match result {
                Ok(answer) => JobOutcome::Answer(answer),
                Err(err) => {
                    engine_warn!("Job {} failed: {}", job_id, err);
                    JobOutcome::Failure(err.message)
                }
            };
            Msg::JobFinished { job_id, outcome }
        }
    }
}

#[cfg(test)]
mod tests {
    use datachat_engine::{InferenceError, InferenceFailure};

    use super::*;

    #[test]
    fn failures_carry_only_the_message() {
        let msg = map_event(EngineEvent::JobCompleted {
            job_id: 3,
            result: Err(InferenceError::new(
                InferenceFailure::Network,
                "connection refused",
            )),
        });
        assert_eq!(
            msg,
            Msg::JobFinished {
                job_id: 3,
                outcome: JobOutcome::Failure("connection refused".to_string()),
            }
        );
    }

    #[test]
    fn ticks_pass_through() {
        assert_eq!(
            map_event(EngineEvent::AnimationTick { job_id: 9 }),
            Msg::AnimationTick { job_id: 9 }
        );
    }
}

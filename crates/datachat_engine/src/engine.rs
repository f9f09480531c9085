use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use tokio_util::sync::CancellationToken;

use crate::animation::{animate_until_cancelled, DEFAULT_ANIMATION_PERIOD};
use crate::{CompletionRequest, EngineEvent, InferenceClient, JobId};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub animation_period: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            animation_period: DEFAULT_ANIMATION_PERIOD,
        }
    }
}

enum EngineCommand {
    Submit {
        job_id: JobId,
        request: CompletionRequest,
    },
}

/// Runs completion jobs on a background tokio runtime and reports animation
/// ticks and completions over a single ordered channel.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(client: Arc<dyn InferenceClient>, config: EngineConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let client = client.clone();
                let event_tx = event_tx.clone();
                let period = config.animation_period;
                runtime.spawn(async move {
                    handle_command(client.as_ref(), command, period, event_tx).await;
                });
            }
            // Let in-flight jobs finish before the runtime is dropped.
            runtime.shutdown_timeout(Duration::from_millis(100));
        });

        Self { cmd_tx, event_rx }
    }

    pub fn submit(&self, job_id: JobId, request: CompletionRequest) {
        if self
            .cmd_tx
            .send(EngineCommand::Submit { job_id, request })
            .is_err()
        {
            engine_warn!("engine worker gone; job {} dropped", job_id);
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    client: &dyn InferenceClient,
    command: EngineCommand,
    period: Duration,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Submit { job_id, request } => {
            run_job(client, job_id, request, period, event_tx).await;
        }
    }
}

/// The animation task is cancelled and joined before the completion is
/// published, so no tick for `job_id` can follow its `JobCompleted`.
async fn run_job(
    client: &dyn InferenceClient,
    job_id: JobId,
    request: CompletionRequest,
    period: Duration,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    engine_info!("job {} started", job_id);
    let token = CancellationToken::new();
    let ticker = {
        let tick_tx = event_tx.clone();
        tokio::spawn(animate_until_cancelled(period, token.clone(), move |_| {
            let _ = tick_tx.send(EngineEvent::AnimationTick { job_id });
        }))
    };

    let result = client.complete(&request).await;

    token.cancel();
    if let Err(err) = ticker.await {
        engine_warn!("job {} animation task ended abnormally: {}", job_id, err);
    }

    match &result {
        Ok(text) => engine_info!("job {} completed len={}", job_id, text.len()),
        Err(err) => engine_warn!("job {} failed: {}", job_id, err),
    }
    engine_debug!("job {} publishing completion", job_id);
    let _ = event_tx.send(EngineEvent::JobCompleted { job_id, result });
}

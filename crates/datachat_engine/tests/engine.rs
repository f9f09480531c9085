use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use datachat_engine::{
    CompletionRequest, EngineConfig, EngineEvent, EngineHandle, InferenceClient, InferenceError,
    InferenceFailure, InferenceSettings, JobId,
};

/// Answers each prompt after a fixed delay, keyed by user text.
struct ScriptedClient {
    script: HashMap<String, (Duration, Result<String, InferenceError>)>,
}

impl ScriptedClient {
    fn new(entries: Vec<(&str, u64, Result<&str, &str>)>) -> Self {
        let script = entries
            .into_iter()
            .map(|(prompt, delay_ms, result)| {
                let result = result
                    .map(ToOwned::to_owned)
                    .map_err(|message| InferenceError::new(InferenceFailure::Timeout, message));
                (prompt.to_string(), (Duration::from_millis(delay_ms), result))
            })
            .collect();
        Self { script }
    }
}

#[async_trait::async_trait]
impl InferenceClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, InferenceError> {
        let (delay, result) = self
            .script
            .get(&request.user_text)
            .cloned()
            .unwrap_or((Duration::ZERO, Ok(String::new())));
        tokio::time::sleep(delay).await;
        result
    }
}

fn request(text: &str) -> CompletionRequest {
    CompletionRequest {
        system_context: None,
        user_text: text.to_string(),
        options: InferenceSettings::default().options(),
    }
}

fn engine(client: ScriptedClient) -> EngineHandle {
    EngineHandle::new(
        Arc::new(client),
        EngineConfig {
            animation_period: Duration::from_millis(5),
        },
    )
}

/// Collects events until `completions` jobs finished, then a short grace
/// period to catch stray ticks.
fn collect(engine: &EngineHandle, completions: usize) -> Vec<EngineEvent> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut events = Vec::new();
    let mut done = 0;
    while done < completions && Instant::now() < deadline {
        if let Some(event) = engine.recv_timeout(Duration::from_millis(50)) {
            if matches!(event, EngineEvent::JobCompleted { .. }) {
                done += 1;
            }
            events.push(event);
        }
    }
    while let Some(event) = engine.recv_timeout(Duration::from_millis(40)) {
        events.push(event);
    }
    events
}

fn completion_position(events: &[EngineEvent], job: JobId) -> usize {
    events
        .iter()
        .position(|event| matches!(event, EngineEvent::JobCompleted { job_id, .. } if *job_id == job))
        .expect("job completed")
}

fn ticks_for(events: &[EngineEvent], job: JobId) -> Vec<usize> {
    events
        .iter()
        .enumerate()
        .filter(|(_, event)| matches!(event, EngineEvent::AnimationTick { job_id } if *job_id == job))
        .map(|(idx, _)| idx)
        .collect()
}

#[test]
fn ticks_stop_before_completion_is_published() {
    let engine = engine(ScriptedClient::new(vec![("hello", 60, Ok("42"))]));
    engine.submit(1, request("hello"));

    let events = collect(&engine, 1);
    let done_at = completion_position(&events, 1);
    let ticks = ticks_for(&events, 1);

    assert!(!ticks.is_empty(), "animation should tick while waiting");
    assert!(ticks.iter().all(|idx| *idx < done_at));
    assert_eq!(
        events[done_at],
        EngineEvent::JobCompleted {
            job_id: 1,
            result: Ok("42".to_string())
        }
    );
}

#[test]
fn failure_is_reported_with_message() {
    let engine = engine(ScriptedClient::new(vec![("hello", 10, Err("timeout"))]));
    engine.submit(7, request("hello"));

    let events = collect(&engine, 1);
    let done_at = completion_position(&events, 7);
    match &events[done_at] {
        EngineEvent::JobCompleted {
            result: Err(err), ..
        } => assert_eq!(err.message, "timeout"),
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn concurrent_jobs_complete_independently_in_arrival_order() {
    let engine = engine(ScriptedClient::new(vec![
        ("slow", 120, Ok("one")),
        ("fast", 20, Ok("two")),
    ]));
    engine.submit(1, request("slow"));
    engine.submit(2, request("fast"));

    let events = collect(&engine, 2);
    let slow_done = completion_position(&events, 1);
    let fast_done = completion_position(&events, 2);

    assert!(fast_done < slow_done);
    assert!(ticks_for(&events, 2).iter().all(|idx| *idx < fast_done));
    assert!(ticks_for(&events, 1).iter().all(|idx| *idx < slow_done));
    // The slow job keeps animating after the fast one resolved.
    assert!(ticks_for(&events, 1).iter().any(|idx| *idx > fast_done));
}

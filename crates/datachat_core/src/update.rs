use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::MailboxPolled(raw) => {
            let text = raw.trim();
            if text.is_empty() {
                return (state, Vec::new());
            }
            state.accept_message(text.to_string())
        }
        Msg::MailboxFailed(reason) => {
            state.set_notice(format!("Mailbox error: {reason}"));
            Vec::new()
        }
        Msg::AnimationTick { job_id } => {
            state.animate(job_id);
            Vec::new()
        }
        Msg::JobFinished { job_id, outcome } => state.finish_job(job_id, outcome),
        Msg::ScrollUp => {
            state.scroll_up();
            Vec::new()
        }
        Msg::ScrollDown => {
            state.scroll_down();
            Vec::new()
        }
        Msg::ClearTranscript => {
            state.clear_transcript();
            Vec::new()
        }
        Msg::Viewport { max_scroll_back } => {
            state.set_scroll_limit(max_scroll_back);
            Vec::new()
        }
    };

    (state, effects)
}

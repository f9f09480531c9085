use datachat_core::{Transcript, TranscriptError};
use pretty_assertions::assert_eq;

#[test]
fn append_returns_stable_positions() {
    let mut transcript = Transcript::new();
    let first = transcript.append("You: hello");
    let second = transcript.append("AI: Thinking");
    transcript.append("You: again");

    assert_eq!(first.position(), 0);
    assert_eq!(second.position(), 1);
    assert_eq!(transcript.len(), 3);
}

#[test]
fn rewrite_touches_only_the_addressed_line() {
    let mut transcript = Transcript::new();
    transcript.append("You: hello");
    let slot = transcript.append("AI: Thinking");
    transcript.append("You: later");

    transcript.rewrite(slot, "AI: 42").unwrap();

    assert_eq!(
        transcript.rendered_view(),
        &["You: hello", "AI: 42", "You: later"]
    );
}

#[test]
fn rewrite_past_the_end_is_out_of_range() {
    let mut longer = Transcript::new();
    longer.append("a");
    let foreign = longer.append("b");

    let mut shorter = Transcript::new();
    shorter.append("only");

    assert_eq!(
        shorter.rewrite(foreign, "x"),
        Err(TranscriptError::IndexOutOfRange {
            position: 1,
            len: 1
        })
    );
}

#[test]
fn rewrite_with_index_from_before_reset_is_ignored() {
    let mut transcript = Transcript::new();
    let stale = transcript.append("AI: Thinking");
    transcript.reset();
    transcript.append("You: fresh");

    assert_eq!(transcript.rewrite(stale, "AI: late answer"), Ok(()));
    assert_eq!(transcript.rendered_view(), &["You: fresh"]);
}

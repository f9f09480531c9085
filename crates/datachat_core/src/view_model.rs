use crate::{ConcurrencyPolicy, JobId, JobState};

/// First row of the chat view.
pub const TRANSCRIPT_HEADER: &str = "Chat with your data";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub lines: Vec<String>,
    /// Rows scrolled up from the bottom; 0 follows the newest line.
    pub scroll_back: usize,
    pub jobs: Vec<JobView>,
    pub queued: usize,
    pub notice: Option<String>,
    pub policy: ConcurrencyPolicy,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobView {
    pub job_id: JobId,
    pub state: JobState,
    pub slot: usize,
    pub animation_tick: u64,
}

/// Flattens transcript lines into display rows: the header, then every
/// message split on newlines and followed by a blank row.
pub fn display_rows(lines: &[String]) -> Vec<String> {
    let mut rows = Vec::with_capacity(lines.len() * 2 + 2);
    rows.push(TRANSCRIPT_HEADER.to_string());
    rows.push(String::new());
    for line in lines {
        if line.is_empty() {
            rows.push(String::new());
        } else {
            rows.extend(line.lines().map(ToOwned::to_owned));
        }
        rows.push(String::new());
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_line_answers_expand_into_rows() {
        let lines = vec!["You: hi".to_string(), "AI: one\ntwo".to_string()];
        let rows = display_rows(&lines);
        assert_eq!(
            rows,
            vec![
                TRANSCRIPT_HEADER,
                "",
                "You: hi",
                "",
                "AI: one",
                "two",
                ""
            ]
        );
    }
}

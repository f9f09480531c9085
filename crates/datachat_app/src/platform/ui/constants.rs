use std::time::Duration;

pub const CHAT_TITLE: &str = " Data Chat ";
pub const INPUT_TITLE: &str = " Enter your message ";
pub const CHAT_HELP: &str = "Press [up/k] and [down/j] to scroll | [ctrl-l] clear | [q] quit";
pub const OBSERVE_HELP: &str = "Press [q] to quit";
pub const INPUT_HELP: &str = "[enter] send | [ctrl-u] clear | [esc] quit";

/// How long one blocking wait for a terminal event may last.
pub const UI_POLL: Duration = Duration::from_millis(30);

pub const TAB_WIDTH: usize = 4;

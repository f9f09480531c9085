use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use datachat_core::InputField;
use datachat_engine::Mailbox;
use engine_logging::{engine_info, engine_warn};

use super::terminal::{TerminalGuard, Tui};
use super::ui::constants::UI_POLL;
use super::ui::render;
use crate::config::AppConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureAction {
    Continue,
    Quit,
}

/// Text entry that hands each submitted message to the mailbox.
pub struct InputCapture {
    field: InputField,
    mailbox: Mailbox,
    status: String,
}

impl InputCapture {
    pub fn new(mailbox: Mailbox) -> Self {
        let status = format!("Writing to {}", mailbox.path().display());
        Self {
            field: InputField::new(),
            mailbox,
            status,
        }
    }

    pub fn value(&self) -> &str {
        self.field.value()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> CaptureAction {
        if key.kind != KeyEventKind::Press {
            return CaptureAction::Continue;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return CaptureAction::Quit,
            KeyCode::Char('u') if ctrl => self.field.clear(),
            KeyCode::Esc => return CaptureAction::Quit,
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => self.field.backspace(),
            KeyCode::Char(ch) if !ctrl => self.field.push(ch),
            _ => {}
        }
        CaptureAction::Continue
    }

    /// Sends the trimmed field text. A failed write is shown in the status
    /// line and the field is cleared either way.
    pub fn submit(&mut self) {
        let Some(text) = self.field.submit() else {
            return;
        };
        match self.mailbox.write(&text) {
            Ok(()) => {
                engine_info!("Sent message of {} bytes", text.len());
                self.status = format!("Sent: {text}");
            }
            Err(err) => {
                engine_warn!("Failed to send message: {}", err);
                self.status = format!("Error: {err}");
            }
        }
    }
}

pub fn run(config: &AppConfig) -> Result<()> {
    let mut capture = InputCapture::new(Mailbox::new(&config.mailbox_path));
    let (_guard, mut terminal) = TerminalGuard::enter().context("preparing the terminal")?;
    event_loop(&mut terminal, &mut capture)
}

fn event_loop(terminal: &mut Tui, capture: &mut InputCapture) -> Result<()> {
    let mut redraw = true;
    loop {
        if redraw {
            terminal.draw(|frame| render::draw_input(frame, capture.value(), capture.status()))?;
            redraw = false;
        }
        if !event::poll(UI_POLL)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                if capture.handle_key(key) == CaptureAction::Quit {
                    engine_info!("Input capture closed by user");
                    return Ok(());
                }
                redraw = true;
            }
            Event::Resize(_, _) => redraw = true,
            _ => {}
        }
    }
}

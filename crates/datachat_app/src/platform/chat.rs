use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use datachat_core::{update, AppState, AppViewModel, ConcurrencyPolicy, Msg};
use datachat_engine::{
    CsvDatasetProvider, DatasetProvider, EngineConfig, Mailbox, OpenAiCompatClient,
};
use engine_logging::{engine_debug, engine_info, engine_warn};
use ratatui::layout::Rect;

use super::effects::EffectRunner;
use super::terminal::{TerminalGuard, Tui};
use super::ui::constants::UI_POLL;
use super::ui::render;
use crate::config::AppConfig;

/// What a key press means to the chat view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatKey {
    Dispatch(Msg),
    Quit,
    Ignore,
}

pub fn map_key(key: KeyEvent) -> ChatKey {
    if key.kind != KeyEventKind::Press {
        return ChatKey::Ignore;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => ChatKey::Quit,
        KeyCode::Char('l') if ctrl => ChatKey::Dispatch(Msg::ClearTranscript),
        KeyCode::Char('q') | KeyCode::Esc => ChatKey::Quit,
        KeyCode::Up | KeyCode::Char('k') => ChatKey::Dispatch(Msg::ScrollUp),
        KeyCode::Down | KeyCode::Char('j') => ChatKey::Dispatch(Msg::ScrollDown),
        _ => ChatKey::Ignore,
    }
}

/// Owns the chat state and feeds it from the mailbox, the engine and the
/// keyboard. All transcript mutation happens on the thread that calls it.
pub struct Orchestrator {
    state: AppState,
    runner: EffectRunner,
    mailbox: Mailbox,
}

impl Orchestrator {
    pub fn new(policy: ConcurrencyPolicy, runner: EffectRunner, mailbox: Mailbox) -> Self {
        Self {
            state: AppState::with_policy(policy),
            runner,
            mailbox,
        }
    }

    #[cfg(test)]
    fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (next, effects) = update(state, msg);
        self.state = next;
        self.runner.enqueue(effects);
    }

    /// Creates the mailbox file if needed. Failure is shown in the status
    /// line; polling keeps retrying.
    pub fn prepare_mailbox(&mut self) {
        if let Err(err) = self.mailbox.ensure_exists() {
            engine_warn!("Cannot create mailbox: {}", err);
            self.dispatch(Msg::MailboxFailed(err.to_string()));
        }
    }

    pub fn poll_mailbox(&mut self) {
        let msg = match self.mailbox.read_and_clear() {
            Ok(contents) => {
                if !contents.trim().is_empty() {
                    engine_debug!("Mailbox delivered {} bytes", contents.len());
                }
                Msg::MailboxPolled(contents)
            }
            Err(err) => {
                engine_warn!("Mailbox poll failed: {}", err);
                Msg::MailboxFailed(err.to_string())
            }
        };
        self.dispatch(msg);
    }

    pub fn pump_engine(&mut self) {
        for msg in self.runner.drain() {
            self.dispatch(msg);
        }
    }

    /// Tells the state how far a screen of size `area` can scroll back.
    pub fn sync_viewport(&mut self, area: Rect) {
        let max_scroll_back = render::chat_scroll_limit(area, &self.view().lines);
        self.dispatch(Msg::Viewport { max_scroll_back });
    }

    pub fn take_redraw(&mut self) -> bool {
        self.state.consume_dirty()
    }

    #[cfg(test)]
    fn pump_until_idle(&mut self, timeout: Duration) {
        let deadline = Instant::now() + timeout;
        while self.state.pending_jobs() > 0 && Instant::now() < deadline {
            if let Some(msg) = self.runner.recv_timeout(Duration::from_millis(20)) {
                self.dispatch(msg);
            }
        }
    }
}

pub fn run(config: &AppConfig) -> Result<()> {
    let provider = CsvDatasetProvider::new(&config.dataset_path, config.snapshot_mode);
    let snapshot = provider
        .load()
        .context("chat needs a readable dataset")?;
    engine_info!(
        "Loaded dataset {:?}: {} columns, {} rows",
        config.dataset_path,
        snapshot.columns().len(),
        snapshot.row_count()
    );

    let client = OpenAiCompatClient::new(config.inference.clone())
        .context("configuring the inference client")?;
    let runner = EffectRunner::new(
        Arc::new(client),
        snapshot,
        config.inference.options(),
        EngineConfig {
            animation_period: config.animation_period,
        },
    );
    let mut orchestrator =
        Orchestrator::new(config.policy, runner, Mailbox::new(&config.mailbox_path));
    orchestrator.prepare_mailbox();

    let (_guard, mut terminal) = TerminalGuard::enter().context("preparing the terminal")?;
    event_loop(&mut terminal, &mut orchestrator, config.poll_interval)
}

fn event_loop(
    terminal: &mut Tui,
    orchestrator: &mut Orchestrator,
    poll_interval: Duration,
) -> Result<()> {
    redraw(terminal, orchestrator)?;
    let mut next_poll = Instant::now();

    loop {
        orchestrator.pump_engine();

        if Instant::now() >= next_poll {
            orchestrator.poll_mailbox();
            next_poll = Instant::now() + poll_interval;
        }

        let mut resized = false;
        if event::poll(UI_POLL)? {
            match event::read()? {
                Event::Key(key) => match map_key(key) {
                    ChatKey::Quit => {
                        engine_info!("Chat closed by user");
                        return Ok(());
                    }
                    ChatKey::Dispatch(msg) => orchestrator.dispatch(msg),
                    ChatKey::Ignore => {}
                },
                Event::Resize(_, _) => resized = true,
                _ => {}
            }
        }

        if orchestrator.take_redraw() || resized {
            redraw(terminal, orchestrator)?;
        }
    }
}

fn redraw(terminal: &mut Tui, orchestrator: &mut Orchestrator) -> Result<()> {
    orchestrator.sync_viewport(terminal.size()?);
    terminal.draw(|frame| render::draw_chat(frame, &orchestrator.view()))?;
    // The frame just drawn already reflects any clamp from the sync.
    orchestrator.take_redraw();
    Ok(())
}

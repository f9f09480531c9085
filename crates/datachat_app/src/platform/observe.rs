use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use datachat_engine::{ColumnChart, CsvDatasetProvider};
use engine_logging::engine_info;

use super::terminal::{TerminalGuard, Tui};
use super::ui::constants::UI_POLL;
use super::ui::render;
use crate::config::AppConfig;

pub fn is_quit_key(key: KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        KeyCode::Char('q') | KeyCode::Esc => true,
        _ => false,
    }
}

pub fn run(config: &AppConfig) -> Result<()> {
    let charts = CsvDatasetProvider::new(&config.dataset_path, config.snapshot_mode)
        .distributions()
        .context("observing needs a readable dataset")?;
    engine_info!("Charting {} columns of {:?}", charts.len(), config.dataset_path);

    let (_guard, mut terminal) = TerminalGuard::enter().context("preparing the terminal")?;
    event_loop(&mut terminal, &charts)
}

fn event_loop(terminal: &mut Tui, charts: &[ColumnChart]) -> Result<()> {
    let mut redraw = true;
    loop {
        if redraw {
            terminal.draw(|frame| render::draw_observe(frame, charts))?;
            redraw = false;
        }
        if !event::poll(UI_POLL)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if is_quit_key(key) => {
                engine_info!("Observe view closed by user");
                return Ok(());
            }
            Event::Resize(_, _) => redraw = true,
            _ => {}
        }
    }
}

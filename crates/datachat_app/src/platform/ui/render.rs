use std::rc::Rc;

use datachat_core::{display_rows, AppViewModel, ConcurrencyPolicy};
use datachat_engine::ColumnChart;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{BarChart, Block, BorderType, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::constants::*;

const BORDER_COLOR: Color = Color::Rgb(90, 160, 255);
const TITLE_COLOR: Color = Color::Rgb(120, 185, 255);
const DIM_COLOR: Color = Color::Rgb(130, 140, 160);
const INPUT_COLOR: Color = Color::Rgb(255, 220, 100);
const BAR_COLOR: Color = Color::Rgb(120, 200, 160);

const CHARTS_PER_ROW: u32 = 4;
const BAR_WIDTH: u16 = 6;

fn chat_layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area)
}

pub fn draw_chat(frame: &mut Frame<'_>, view: &AppViewModel) {
    let chunks = chat_layout(frame.size());

    let inner = inner_area(chunks[0]);
    let rows = visible_rows(
        &view.lines,
        inner.width as usize,
        inner.height as usize,
        view.scroll_back,
    );
    let text = Text::from(rows.into_iter().map(Line::from).collect::<Vec<_>>());
    let transcript = Paragraph::new(text).block(titled_block(CHAT_TITLE));
    frame.render_widget(transcript, chunks[0]);

    let status = Paragraph::new(status_text(view)).style(Style::default().fg(DIM_COLOR));
    frame.render_widget(status, chunks[1]);

    let help = Paragraph::new(CHAT_HELP).style(Style::default().fg(DIM_COLOR));
    frame.render_widget(help, chunks[2]);
}

pub fn draw_input(frame: &mut Frame<'_>, value: &str, status: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(frame.size());

    let sanitized = sanitize(value);
    let input = Paragraph::new(sanitized.as_str())
        .block(titled_block(INPUT_TITLE))
        .style(Style::default().fg(INPUT_COLOR));
    frame.render_widget(input, chunks[0]);

    let status = Paragraph::new(status).style(Style::default().fg(DIM_COLOR));
    frame.render_widget(status, chunks[1]);

    let help = Paragraph::new(INPUT_HELP).style(Style::default().fg(DIM_COLOR));
    frame.render_widget(help, chunks[2]);

    // Keep the cursor inside the box even when the text overflows it.
    let inner_width = chunks[0].width.saturating_sub(2);
    let input_width = UnicodeWidthStr::width(sanitized.as_str()).min(u16::MAX as usize) as u16;
    let cursor_x = chunks[0]
        .x
        .saturating_add(1)
        .saturating_add(input_width.min(inner_width));
    frame.set_cursor(cursor_x, chunks[0].y + 1);
}

pub fn draw_observe(frame: &mut Frame<'_>, charts: &[ColumnChart]) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.size());

    if charts.is_empty() {
        let empty = Paragraph::new("The dataset has no columns").block(titled_block(" Observe "));
        frame.render_widget(empty, chunks[0]);
    }
    for (chart, area) in charts.iter().zip(chart_grid(chunks[0], charts.len())) {
        let bars: Vec<(&str, u64)> = chart
            .bars
            .iter()
            .map(|(label, count)| (label.as_str(), *count))
            .collect();
        let widget = BarChart::default()
            .block(titled_block(&chart.column))
            .data(bars.as_slice())
            .bar_width(BAR_WIDTH)
            .bar_gap(1)
            .bar_style(Style::default().fg(BAR_COLOR))
            .value_style(Style::default().fg(Color::Black).bg(BAR_COLOR));
        frame.render_widget(widget, area);
    }

    let help = Paragraph::new(OBSERVE_HELP).style(Style::default().fg(DIM_COLOR));
    frame.render_widget(help, chunks[1]);
}

/// Splits `area` into cells for `count` charts, four to a row.
pub fn chart_grid(area: Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let rows = (count as u32).div_ceil(CHARTS_PER_ROW);
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints((0..rows).map(|_| Constraint::Ratio(1, rows)))
        .split(area);
    row_areas
        .iter()
        .flat_map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints((0..CHARTS_PER_ROW).map(|_| Constraint::Ratio(1, CHARTS_PER_ROW)))
                .split(*row)
                .to_vec()
        })
        .take(count)
        .collect()
}

fn titled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(Span::styled(
            title,
            Style::default()
                .fg(TITLE_COLOR)
                .add_modifier(Modifier::BOLD),
        ))
}

fn inner_area(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

pub fn status_text(view: &AppViewModel) -> String {
    let policy = match view.policy {
        ConcurrencyPolicy::Concurrent => "concurrent",
        ConcurrencyPolicy::Queue => "queue",
        ConcurrencyPolicy::Reject => "reject",
    };
    let mut text = format!("Pending: {} | Policy: {}", view.jobs.len(), policy);
    if view.queued > 0 {
        text.push_str(&format!(" | Queued: {}", view.queued));
    }
    if view.scroll_back > 0 {
        text.push_str(&format!(" | Scrolled back {}", view.scroll_back));
    }
    if let Some(notice) = &view.notice {
        text.push_str(" | ");
        text.push_str(notice);
    }
    text
}

/// How far the chat screen of size `area` can scroll back over `lines`.
pub fn chat_scroll_limit(area: Rect, lines: &[String]) -> usize {
    let inner = inner_area(chat_layout(area)[0]);
    scroll_limit(lines, inner.width as usize, inner.height as usize)
}

/// Wrapped rows above the first screenful, i.e. the largest useful
/// `scroll_back` for a `width` x `height` viewport.
pub fn scroll_limit(lines: &[String], width: usize, height: usize) -> usize {
    wrapped_rows(lines, width).len().saturating_sub(height)
}

/// Rows that fit in a `width` x `height` viewport, `scroll_back` rows up from
/// the bottom. Long rows are wrapped by display width.
pub fn visible_rows(
    lines: &[String],
    width: usize,
    height: usize,
    scroll_back: usize,
) -> Vec<String> {
    let rows = wrapped_rows(lines, width);
    let max_back = rows.len().saturating_sub(height);
    let bottom = rows.len() - scroll_back.min(max_back);
    let top = bottom.saturating_sub(height);
    rows[top..bottom].to_vec()
}

fn wrapped_rows(lines: &[String], width: usize) -> Vec<String> {
    display_rows(lines)
        .iter()
        .flat_map(|row| wrap_row(&sanitize(row), width))
        .collect()
}

fn wrap_row(row: &str, width: usize) -> Vec<String> {
    if width == 0 || row.is_empty() {
        return vec![row.to_string()];
    }
    let mut wrapped = Vec::new();
    let mut current = String::new();
    let mut used = 0;
    for ch in row.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > width && !current.is_empty() {
            wrapped.push(std::mem::take(&mut current));
            used = 0;
        }
        current.push(ch);
        used += ch_width;
    }
    wrapped.push(current);
    wrapped
}

/// Expands tabs and drops control characters the terminal would interpret.
fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\t' => out.push_str(&" ".repeat(TAB_WIDTH)),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::App;
use crate::clock::Clock;
use crate::storage::Storage;
use crate::widget::{PanelSnapshot, PANEL_TITLE};

const PANEL_WIDTH: u16 = 46;
const COLLAPSED_WIDTH: u16 = 14;
const HELP: &str = "↑/↓ focus | enter click | (s)ubmit form | (t)imeline | PgUp/PgDn scroll | (q)uit";

impl<S: Storage, C: Clock> Widget for &App<S, C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);

        let snapshot = self.tracker.widget().surface().snapshot();
        let expanded = snapshot.as_ref().is_some_and(|s| s.expanded);
        let side = if expanded { PANEL_WIDTH } else { COLLAPSED_WIDTH };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(side)])
            .split(rows[0]);

        render_page(self, cols[0], buf);
        match snapshot {
            Some(snap) if snap.expanded => render_panel(&snap, self.scroll, cols[1], buf),
            _ => render_toggle(cols[1], buf),
        }

        let footer = self.status.as_deref().unwrap_or(HELP);
        Paragraph::new(Span::styled(
            footer.to_string(),
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(rows[1], buf);
    }
}

fn render_page<S: Storage, C: Clock>(app: &App<S, C>, area: Rect, buf: &mut Buffer) {
    let page = app.tracker.widget().store().page().to_string();
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(Span::styled(app.heading.clone(), bold.fg(Color::Yellow))),
        Line::from(app.intro.clone()),
        Line::from(""),
    ];
    for (idx, control) in app.controls.iter().enumerate() {
        let focused = idx == app.focus;
        let marker = if focused { "▶ " } else { "  " };
        let style = match (focused, control.tracked) {
            (true, _) => bold.fg(Color::Black).bg(Color::Cyan),
            (false, true) => bold.fg(Color::Cyan),
            (false, false) => Style::default(),
        };
        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("[ {} ]", control.label), style),
        ]));
    }

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(page))
        .wrap(Wrap { trim: false })
        .render(area, buf);
}

fn render_toggle(area: Rect, buf: &mut Buffer) {
    Paragraph::new("🕒 (t)")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
        .render(area, buf);
}

fn render_panel(snap: &PanelSnapshot, scroll: u16, area: Rect, buf: &mut Buffer) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let dim = Style::default().add_modifier(Modifier::DIM);

    let mut lines: Vec<Line> = snap
        .info
        .iter()
        .map(|l| Line::from(Span::styled(truncate(l, inner_width), dim)))
        .collect();
    lines.push(Line::from(""));
    for (label, value) in &snap.stats {
        lines.push(Line::from(vec![
            Span::raw(format!("{label}: ")),
            Span::styled(value.clone(), Style::default().add_modifier(Modifier::BOLD)),
        ]));
    }
    lines.push(Line::from("─".repeat(inner_width)));
    for item in &snap.items {
        let color = if item.is_pageview {
            Color::Cyan
        } else {
            Color::Magenta
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", item.time), dim),
            Span::styled(item.title.clone(), Style::default().fg(color)),
        ]));
        lines.push(Line::from(format!(
            "  {}",
            truncate(&item.details, inner_width.saturating_sub(2))
        )));
    }

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(PANEL_TITLE))
        .scroll((scroll, 0))
        .render(area, buf);
}

/// Cut `s` to at most `width` terminal columns, marking the cut with `…`.
fn truncate(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

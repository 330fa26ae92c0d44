use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;

use super::centered_rect_fixed;

const KEYS: &[(&str, &str)] = &[
    ("j/k \u{2191}\u{2193}", "move"),
    ("g/G", "first / last"),
    ("a", "add a bank"),
    ("e Enter", "edit the selected bank"),
    ("d", "delete the selected bank"),
    ("/", "search name, location, contact"),
    ("f then a/o/u/c/s/v", "filter: all, overdue, stage"),
    ("o then n/a/v", "order: next action, name, volume"),
    ("Esc", "clear search"),
    ("?", "toggle this help"),
    ("q", "quit"),
];

/// Render the key-binding help overlay
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let popup_w: u16 = 48.min(area.width.saturating_sub(2));

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        " Keys",
        Style::default()
            .fg(app.theme.highlight)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    for (key, action) in KEYS {
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {key:<20}"),
                Style::default().fg(app.theme.text_bright).bg(bg),
            ),
            Span::styled(
                action.to_string(),
                Style::default().fg(app.theme.text).bg(bg),
            ),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " ? or Esc to close",
        Style::default().fg(app.theme.dim).bg(bg),
    )));

    let popup_h = ((lines.len() as u16) + 2).min(area.height.saturating_sub(2));
    let overlay_area = centered_rect_fixed(popup_w, popup_h, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.highlight).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg));
    frame.render_widget(paragraph, overlay_area);
}

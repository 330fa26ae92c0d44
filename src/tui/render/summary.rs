use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Gauge, Paragraph};

use crate::model::bank::Stage;
use crate::tui::app::App;

/// Render the summary header: stage counters, the progress gauge, and a
/// separator line
pub fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // counters
            Constraint::Length(1), // progress gauge
            Constraint::Length(1), // separator
        ])
        .split(area);

    render_counters(frame, app, chunks[0]);
    render_progress(frame, app, chunks[1]);
    render_separator(frame, app, chunks[2]);
}

fn render_counters(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let counts = app.stage_counts();
    let overdue = app.overdue_count();

    let mut spans: Vec<Span> = Vec::new();
    spans.push(Span::styled(" ", Style::default().bg(bg)));
    spans.push(Span::styled(
        "\u{25B6} funnel",
        Style::default()
            .fg(app.theme.purple)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled(
        "  \u{2502}  ",
        Style::default().fg(app.theme.dim).bg(bg),
    ));

    for stage in Stage::ALL {
        spans.push(Span::styled(
            format!("{}{} ", counts.get(stage), stage.glyph()),
            Style::default().fg(app.theme.stage_color(stage)).bg(bg),
        ));
        spans.push(Span::styled(
            format!("{}  ", stage.label()),
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    }

    if overdue > 0 {
        spans.push(Span::styled(
            "\u{2502}  ",
            Style::default().fg(app.theme.dim).bg(bg),
        ));
        spans.push(Span::styled(
            format!("{overdue}! overdue"),
            Style::default().fg(app.theme.red).bg(bg),
        ));
    }

    // Right-aligned total
    let total = format!("{} banks ", counts.total());
    let width = area.width as usize;
    let content_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    if content_width + total.len() < width {
        spans.push(Span::styled(
            " ".repeat(width - content_width - total.len()),
            Style::default().bg(bg),
        ));
        spans.push(Span::styled(
            total,
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// Progress against the configured universe of known eligible
/// organizations, not against the live record count
fn render_progress(frame: &mut Frame, app: &App, area: Rect) {
    let converted = app.stage_counts().converted;
    let universe = app.store.config.pipeline.universe as usize;

    let ratio = if universe == 0 {
        0.0
    } else {
        (converted as f64 / universe as f64).clamp(0.0, 1.0)
    };

    let gauge = Gauge::default()
        .ratio(ratio)
        .label(Span::styled(
            format!("{converted}/{universe} converted"),
            Style::default().fg(app.theme.text_bright),
        ))
        .gauge_style(
            Style::default()
                .fg(app.theme.stage_converted)
                .bg(app.theme.selection_bg),
        );

    // Inset by one cell on each side, matching the counters row
    let inner = Rect {
        x: area.x + 1,
        y: area.y,
        width: area.width.saturating_sub(2),
        height: area.height,
    };
    frame.render_widget(gauge, inner);
}

fn render_separator(frame: &mut Frame, app: &App, area: Rect) {
    let line = "\u{2500}".repeat(area.width as usize);
    let widget = Paragraph::new(line).style(
        Style::default()
            .fg(app.theme.dim)
            .bg(app.theme.background),
    );
    frame.render_widget(widget, area);
}

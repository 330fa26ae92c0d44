use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::views::{Filter, SortKey};
use crate::tui::app::{App, Mode};

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let line = match app.mode {
        Mode::Search => {
            // Search prompt: /pattern▌
            let spans = vec![
                Span::styled(
                    format!("/{}", app.search_input),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ),
                Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)),
            ];
            with_right_hint(app, spans, "Enter search  Esc cancel", width)
        }
        Mode::Edit => {
            let spans = vec![Span::styled(
                " editing",
                Style::default().fg(app.theme.dim).bg(bg),
            )];
            with_right_hint(app, spans, "Enter save  Esc cancel", width)
        }
        Mode::Confirm => Line::from(Span::styled(
            " ".repeat(width),
            Style::default().bg(bg),
        )),
        Mode::Navigate => {
            if let Some(message) = &app.status_message {
                let color = if app.status_is_error {
                    app.theme.red
                } else {
                    app.theme.green
                };
                Line::from(Span::styled(
                    format!(" {message}"),
                    Style::default().fg(color).bg(bg),
                ))
            } else {
                navigate_indicator(app, width)
            }
        }
    };

    let paragraph = Paragraph::new(line).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// The idle indicator: active filter, sort, and committed search, dimmed
fn navigate_indicator(app: &App, width: usize) -> Line<'static> {
    let bg = app.theme.background;
    let mut spans: Vec<Span> = Vec::new();

    if app.filter_pending {
        spans.push(Span::styled(
            " filter: a all  o overdue  u/c/s/v stage",
            Style::default().fg(app.theme.purple).bg(bg),
        ));
        return with_right_hint(app, spans, "", width);
    }
    if app.sort_pending {
        spans.push(Span::styled(
            " order: n next action  a name  v volume",
            Style::default().fg(app.theme.purple).bg(bg),
        ));
        return with_right_hint(app, spans, "", width);
    }

    if app.filter != Filter::All {
        spans.push(Span::styled(
            " filter: ",
            Style::default().fg(app.theme.purple).bg(bg),
        ));
        spans.push(Span::styled(
            app.filter.label().to_string(),
            Style::default().fg(app.theme.text_bright).bg(bg),
        ));
    }
    if app.sort != SortKey::NextAction {
        spans.push(Span::styled(
            " sort: ",
            Style::default().fg(app.theme.purple).bg(bg),
        ));
        spans.push(Span::styled(
            app.sort.label().to_string(),
            Style::default().fg(app.theme.text_bright).bg(bg),
        ));
    }
    if let Some(pattern) = &app.last_search {
        spans.push(Span::styled(
            format!(" /{pattern}"),
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    }

    let hint = if app.store.config.ui.show_key_hints {
        "a add  e edit  d delete  / search  f filter  o order  ? help"
    } else {
        ""
    };
    with_right_hint(app, spans, hint, width)
}

/// Pad the given spans and right-align a dimmed hint
fn with_right_hint<'a>(
    app: &App,
    mut spans: Vec<Span<'a>>,
    hint: &'a str,
    width: usize,
) -> Line<'a> {
    let bg = app.theme.background;
    let content_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let hint_width = hint.chars().count();
    if content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        if !hint.is_empty() {
            spans.push(Span::styled(
                hint,
                Style::default().fg(app.theme.dim).bg(bg),
            ));
        }
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::bank::Stage;
    use crate::tui::render::test_helpers::{render_to_string, sample_app};

    #[test]
    fn search_mode_shows_the_prompt() {
        let (mut app, _tmp) = sample_app();
        app.mode = Mode::Search;
        app.search_input = "river".into();
        let text = render_to_string(60, 1, |frame, area| {
            render_status_row(frame, &app, area);
        });
        assert!(text.starts_with("/river"));
        assert!(text.contains("Enter search"));
    }

    #[test]
    fn status_message_wins_in_navigate_mode() {
        let (mut app, _tmp) = sample_app();
        app.set_status("added \"Riverside\"");
        let text = render_to_string(60, 1, |frame, area| {
            render_status_row(frame, &app, area);
        });
        assert!(text.contains("added \"Riverside\""));
    }

    #[test]
    fn active_filter_and_search_show_in_the_indicator() {
        let (mut app, _tmp) = sample_app();
        app.filter = crate::ops::views::Filter::Stage(Stage::Converted);
        app.last_search = Some("hill".into());
        let text = render_to_string(60, 1, |frame, area| {
            render_status_row(frame, &app, area);
        });
        assert!(text.contains("filter: converted"));
        assert!(text.contains("/hill"));
    }

    #[test]
    fn filter_prefix_shows_the_choices() {
        let (mut app, _tmp) = sample_app();
        app.filter_pending = true;
        let text = render_to_string(60, 1, |frame, area| {
            render_status_row(frame, &app, area);
        });
        assert!(text.contains("o overdue"));
    }
}

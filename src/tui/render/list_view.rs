use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::bank::Bank;
use crate::ops::views::is_overdue;
use crate::tui::app::App;
use crate::util::unicode::{display_width, truncate_to_width};

use super::push_highlighted_spans;

const NAME_COLS: usize = 28;
const LOCATION_COLS: usize = 20;

/// Render the bank list: one row per visible record
pub fn render_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let visible = app.visible();
    let height = area.height as usize;

    // Keep the cursor row inside the window
    if app.cursor < app.scroll_offset {
        app.scroll_offset = app.cursor;
    }
    if height > 0 && app.cursor >= app.scroll_offset + height {
        app.scroll_offset = app.cursor + 1 - height;
    }

    let mut lines: Vec<Line> = Vec::new();

    if visible.is_empty() {
        let message = if app.banks.is_empty() {
            " No banks yet \u{2014} press a to add one"
        } else {
            " No banks match the current filter"
        };
        lines.push(Line::from(Span::styled(
            message,
            Style::default().fg(app.theme.dim).bg(app.theme.background),
        )));
    } else {
        let search_re = app.search_re();
        let today = app.today();
        for (row, &bank_idx) in visible
            .iter()
            .enumerate()
            .skip(app.scroll_offset)
            .take(height.max(1))
        {
            lines.push(render_bank_line(
                app,
                &app.banks[bank_idx],
                row == app.cursor,
                area.width,
                search_re.as_ref(),
                today,
            ));
        }
    }

    let paragraph = Paragraph::new(lines).style(Style::default().bg(app.theme.background));
    frame.render_widget(paragraph, area);
}

fn render_bank_line<'a>(
    app: &App,
    bank: &Bank,
    is_cursor: bool,
    width: u16,
    search_re: Option<&regex::Regex>,
    today: chrono::NaiveDate,
) -> Line<'a> {
    let bg = if is_cursor {
        app.theme.selection_bg
    } else {
        app.theme.background
    };

    let mut spans: Vec<Span> = Vec::new();

    // Stage glyph
    spans.push(Span::styled(" ", Style::default().bg(bg)));
    spans.push(Span::styled(
        bank.stage.glyph().to_string(),
        Style::default().fg(app.theme.stage_color(bank.stage)).bg(bg),
    ));
    spans.push(Span::styled(" ", Style::default().bg(bg)));

    // Name, search-highlighted, padded to a fixed column
    let name = truncate_to_width(&bank.name, NAME_COLS);
    let name_style = Style::default().fg(app.theme.text_bright).bg(bg);
    let hl_style = Style::default()
        .fg(app.theme.search_match_fg)
        .bg(app.theme.search_match_bg);
    push_highlighted_spans(&mut spans, &name, name_style, hl_style, search_re);
    pad_cell(&mut spans, NAME_COLS + 2 - display_width(&name), bg);

    // Location, also searched, so also highlighted
    let location = truncate_to_width(&bank.location, LOCATION_COLS);
    let location_style = Style::default().fg(app.theme.text).bg(bg);
    push_highlighted_spans(&mut spans, &location, location_style, hl_style, search_re);
    pad_cell(&mut spans, LOCATION_COLS + 2 - display_width(&location), bg);

    // Next action date; overdue in red
    match bank.next_action {
        Some(date) => {
            let color = if is_overdue(bank, today) {
                app.theme.red
            } else {
                app.theme.text
            };
            spans.push(Span::styled(
                format!("\u{2192} {date}"),
                Style::default().fg(color).bg(bg),
            ));
        }
        None => {
            spans.push(Span::styled(
                "\u{2192} \u{2014}         ",
                Style::default().fg(app.theme.dim).bg(bg),
            ));
        }
    }

    // Volume potential
    if bank.volume_potential > 0 {
        spans.push(Span::styled(
            format!("  {}/mo", bank.volume_potential),
            Style::default().fg(app.theme.cyan).bg(bg),
        ));
    }

    // Pad to full width so the cursor bar spans the row
    if is_cursor {
        let content_width: usize = spans.iter().map(|s| display_width(&s.content)).sum();
        let w = width as usize;
        if content_width < w {
            spans.push(Span::styled(
                " ".repeat(w - content_width),
                Style::default().bg(bg),
            ));
        }
    }

    Line::from(spans)
}

fn pad_cell(spans: &mut Vec<Span<'_>>, cells: usize, bg: Color) {
    if cells > 0 {
        spans.push(Span::styled(" ".repeat(cells), Style::default().bg(bg)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::views::{Filter, SortKey};
    use crate::tui::render::test_helpers::{render_to_string, sample_app};

    #[test]
    fn rows_follow_display_order() {
        let (mut app, _tmp) = sample_app();
        app.sort = SortKey::Name;
        let text = render_to_string(100, 10, |frame, area| {
            render_list(frame, &mut app, area);
        });
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].contains("Hill Country Dairy"));
        assert!(lines[1].contains("Northgate Collective"));
        assert!(lines[2].contains("Riverside Milk Bank"));
        assert!(lines[3].contains("Seaside Bank"));
    }

    #[test]
    fn overdue_bank_sorts_first_and_shows_its_date() {
        let (mut app, _tmp) = sample_app();
        app.sort = SortKey::NextAction;
        let text = render_to_string(100, 10, |frame, area| {
            render_list(frame, &mut app, area);
        });
        let first = text.lines().next().unwrap();
        assert!(first.contains("Riverside Milk Bank"), "got:\n{text}");
        assert!(first.contains("2024-01-05"));
    }

    #[test]
    fn filtered_out_rows_disappear() {
        let (mut app, _tmp) = sample_app();
        app.filter = Filter::Overdue;
        let text = render_to_string(100, 10, |frame, area| {
            render_list(frame, &mut app, area);
        });
        assert!(text.contains("Riverside Milk Bank"));
        assert!(!text.contains("Seaside Bank"));
    }

    #[test]
    fn empty_store_shows_hint() {
        let (mut app, _tmp) = sample_app();
        app.banks.clear();
        let text = render_to_string(80, 5, |frame, area| {
            render_list(frame, &mut app, area);
        });
        assert!(text.contains("No banks yet"));
    }

    #[test]
    fn volume_shows_per_month() {
        let (mut app, _tmp) = sample_app();
        app.sort = SortKey::Volume;
        let text = render_to_string(100, 10, |frame, area| {
            render_list(frame, &mut app, area);
        });
        assert!(text.lines().next().unwrap().contains("600/mo"));
    }
}

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::model::bank::BottleSize;
use crate::tui::app::{App, FormField, FormState, FormTarget};

use super::centered_rect_fixed;

const LABEL_COLS: usize = 14;

/// Render the modal add/edit form over the list
pub fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let Some(form) = app.form.as_ref() else {
        return;
    };

    let bg = app.theme.background;
    let popup_w: u16 = 58.min(area.width.saturating_sub(2));

    let title = match form.target {
        FormTarget::New => " Add Bank",
        FormTarget::Existing(_) => " Edit Bank",
    };
    let header_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(title.to_string(), header_style)));
    lines.push(Line::from(""));

    for field in FormField::ALL {
        lines.push(field_line(app, form, field));
    }

    lines.push(Line::from(""));
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            format!(" {error}"),
            Style::default().fg(app.theme.red).bg(bg),
        )));
    }
    lines.push(Line::from(Span::styled(
        " Enter save  Esc cancel  Tab next field",
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

fn field_line<'a>(app: &App, form: &FormState, field: FormField) -> Line<'a> {
    let bg = app.theme.background;
    let focused = form.focus == field;

    let label_style = if focused {
        Style::default().fg(app.theme.text_bright).bg(bg)
    } else {
        Style::default().fg(app.theme.dim).bg(bg)
    };

    let mut spans: Vec<Span> = vec![Span::styled(
        format!(" {:<width$}", field.label(), width = LABEL_COLS),
        label_style,
    )];

    match field {
        FormField::Stage => {
            push_choice(
                &mut spans,
                form.stage.label(),
                app.theme.stage_color(form.stage),
                focused,
                app,
            );
        }
        FormField::Pasteurizer => {
            push_choice(
                &mut spans,
                form.pasteurizer.label(),
                app.theme.text,
                focused,
                app,
            );
        }
        FormField::BottleSizes => {
            for (i, size) in BottleSize::ALL.iter().enumerate() {
                let selected = form.bottle_sizes.contains(size);
                let chip_bg = if focused && i == form.size_cursor {
                    app.theme.selection_bg
                } else {
                    bg
                };
                let mark = if selected { 'x' } else { ' ' };
                let fg = if selected {
                    app.theme.green
                } else {
                    app.theme.text
                };
                spans.push(Span::styled(
                    format!("[{mark}] {} ", size.label()),
                    Style::default().fg(fg).bg(chip_bg),
                ));
            }
        }
        _ => {
            // Single-line text buffer, with the cursor bar when focused
            let text = form.text_value(field);
            if focused {
                let cursor = form.cursor.min(text.len());
                spans.push(Span::styled(
                    text[..cursor].to_string(),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ));
                spans.push(Span::styled(
                    "\u{258C}",
                    Style::default().fg(app.theme.highlight).bg(bg),
                ));
                spans.push(Span::styled(
                    text[cursor..].to_string(),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ));
            } else {
                spans.push(Span::styled(
                    text.to_string(),
                    Style::default().fg(app.theme.text).bg(bg),
                ));
            }
        }
    }

    Line::from(spans)
}

/// An enum value, arrow-wrapped when focused
fn push_choice<'a>(
    spans: &mut Vec<Span<'a>>,
    label: &str,
    color: ratatui::style::Color,
    focused: bool,
    app: &App,
) {
    let bg = app.theme.background;
    if focused {
        spans.push(Span::styled(
            "\u{2039} ",
            Style::default().fg(app.theme.highlight).bg(bg),
        ));
        spans.push(Span::styled(
            label.to_string(),
            Style::default().fg(color).bg(bg),
        ));
        spans.push(Span::styled(
            " \u{203A}",
            Style::default().fg(app.theme.highlight).bg(bg),
        ));
    } else {
        spans.push(Span::styled(
            label.to_string(),
            Style::default().fg(color).bg(bg),
        ));
    }
}

use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, Mode};
use crate::util::unicode::prev_grapheme_boundary;

pub(super) fn handle_search(app: &mut App, key: KeyEvent) {
    match key.code {
        // Commit: the typed query becomes the active search
        KeyCode::Enter => {
            app.last_search = if app.search_input.is_empty() {
                None
            } else {
                Some(app.search_input.clone())
            };
            app.search_input.clear();
            app.mode = Mode::Navigate;
            app.cursor = 0;
            app.scroll_offset = 0;
        }
        // Cancel: drop the typed query, keep whatever was committed before
        KeyCode::Esc => {
            app.search_input.clear();
            app.mode = Mode::Navigate;
            app.clamp_cursor();
        }
        KeyCode::Backspace => {
            if let Some(boundary) = prev_grapheme_boundary(&app.search_input, app.search_input.len())
            {
                app.search_input.truncate(boundary);
            }
            app.cursor = 0;
        }
        KeyCode::Char(c) => {
            app.search_input.push(c);
            // The list narrows as the query grows
            app.cursor = 0;
            app.scroll_offset = 0;
        }
        _ => {}
    }
}

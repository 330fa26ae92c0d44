use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::bank::Stage;
use crate::ops::views::{Filter, SortKey};
use crate::tui::app::{App, ConfirmAction, FormState, Mode};

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    // Help overlay intercepts ? and Esc
    if app.show_help {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            app.show_help = false;
        }
        return;
    }

    // Filter prefix key: 'f' was pressed, now handle second key
    if app.filter_pending {
        app.filter_pending = false;
        handle_filter_key(app, key);
        return;
    }

    // Sort prefix key: 'o' was pressed, now handle second key
    if app.sort_pending {
        app.sort_pending = false;
        handle_sort_key(app, key);
        return;
    }

    // Clear any transient status message on keypress
    app.status_message = None;
    app.status_is_error = false;

    match (key.modifiers, key.code) {
        // Quit: q or Ctrl+C
        (KeyModifiers::NONE, KeyCode::Char('q')) => {
            app.should_quit = true;
        }
        (m, KeyCode::Char('c')) if m.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }

        // Movement
        (_, KeyCode::Char('j')) | (_, KeyCode::Down) => {
            let count = app.visible().len();
            if count > 0 && app.cursor < count - 1 {
                app.cursor += 1;
            }
        }
        (_, KeyCode::Char('k')) | (_, KeyCode::Up) => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        (KeyModifiers::NONE, KeyCode::Char('g')) | (_, KeyCode::Home) => {
            app.cursor = 0;
        }
        (KeyModifiers::SHIFT, KeyCode::Char('G')) | (_, KeyCode::End) => {
            let count = app.visible().len();
            app.cursor = count.saturating_sub(1);
        }

        // Add a new bank
        (KeyModifiers::NONE, KeyCode::Char('a')) => {
            app.form = Some(FormState::blank());
            app.mode = Mode::Edit;
        }

        // Edit the bank under the cursor
        (KeyModifiers::NONE, KeyCode::Char('e')) | (_, KeyCode::Enter) => {
            if let Some(bank) = app.selected_bank() {
                app.form = Some(FormState::from_bank(bank));
                app.mode = Mode::Edit;
            }
        }

        // Delete the bank under the cursor (after confirmation)
        (KeyModifiers::NONE, KeyCode::Char('d')) => {
            if let Some(bank) = app.selected_bank() {
                app.confirm = Some(ConfirmAction::DeleteBank {
                    id: bank.id.clone(),
                    name: bank.name.clone(),
                });
                app.mode = Mode::Confirm;
            }
        }

        // Search
        (KeyModifiers::NONE, KeyCode::Char('/')) => {
            app.search_input.clear();
            app.mode = Mode::Search;
        }
        // Esc clears the committed search
        (_, KeyCode::Esc) => {
            if app.last_search.take().is_some() {
                app.clamp_cursor();
            }
        }

        // Filter / sort prefixes
        (KeyModifiers::NONE, KeyCode::Char('f')) => {
            app.filter_pending = true;
        }
        (KeyModifiers::NONE, KeyCode::Char('o')) => {
            app.sort_pending = true;
        }

        (KeyModifiers::NONE, KeyCode::Char('?')) => {
            app.show_help = true;
        }

        _ => {}
    }
}

/// Second key after 'f': pick the list filter
fn handle_filter_key(app: &mut App, key: KeyEvent) {
    let filter = match key.code {
        KeyCode::Char('a') => Filter::All,
        KeyCode::Char('o') => Filter::Overdue,
        KeyCode::Char('u') => Filter::Stage(Stage::Unknown),
        KeyCode::Char('c') => Filter::Stage(Stage::Compatible),
        KeyCode::Char('s') => Filter::Stage(Stage::Sampled),
        KeyCode::Char('v') => Filter::Stage(Stage::Converted),
        _ => return,
    };
    app.filter = filter;
    app.cursor = 0;
    app.scroll_offset = 0;
}

/// Second key after 'o': pick the sort order
fn handle_sort_key(app: &mut App, key: KeyEvent) {
    let sort = match key.code {
        KeyCode::Char('n') => SortKey::NextAction,
        KeyCode::Char('a') => SortKey::Name,
        KeyCode::Char('v') => SortKey::Volume,
        _ => return,
    };
    app.sort = sort;
    app.cursor = 0;
    app.scroll_offset = 0;
}

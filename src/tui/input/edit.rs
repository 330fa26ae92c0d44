use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::bank::{BankPatch, BottleSize};
use crate::tui::app::{App, FormField, FormTarget, Mode};
use crate::util::unicode::{next_grapheme_boundary, prev_grapheme_boundary};

pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    if app.form.is_none() {
        app.mode = Mode::Navigate;
        return;
    }

    match key.code {
        // Cancel: the draft is discarded, nothing is written
        KeyCode::Esc => {
            app.form = None;
            app.mode = Mode::Navigate;
            return;
        }
        // Save: validate the draft, then write through the store
        KeyCode::Enter => {
            save_form(app);
            return;
        }
        _ => {}
    }

    let Some(form) = app.form.as_mut() else {
        return;
    };

    match (key.modifiers, key.code) {
        // Field focus movement
        (KeyModifiers::NONE, KeyCode::Tab) | (_, KeyCode::Down) => {
            form.focus = form.focus.next();
            form.cursor = form.focused_text().map_or(0, |t| t.len());
            form.error = None;
        }
        (_, KeyCode::BackTab) | (_, KeyCode::Up) => {
            form.focus = form.focus.prev();
            form.cursor = form.focused_text().map_or(0, |t| t.len());
            form.error = None;
        }

        // Enum fields cycle; the bottle-size row moves; text fields
        // move the cursor by grapheme
        (_, KeyCode::Left) => match form.focus {
            FormField::Stage => form.stage = form.stage.prev(),
            FormField::Pasteurizer => form.pasteurizer = form.pasteurizer.prev(),
            FormField::BottleSizes => {
                form.size_cursor = form.size_cursor.saturating_sub(1);
            }
            _ => {
                if let Some(text) = form.focused_text()
                    && let Some(boundary) = prev_grapheme_boundary(text, form.cursor)
                {
                    form.cursor = boundary;
                }
            }
        },
        (_, KeyCode::Right) => match form.focus {
            FormField::Stage => form.stage = form.stage.next(),
            FormField::Pasteurizer => form.pasteurizer = form.pasteurizer.next(),
            FormField::BottleSizes => {
                if form.size_cursor + 1 < BottleSize::ALL.len() {
                    form.size_cursor += 1;
                }
            }
            _ => {
                if let Some(text) = form.focused_text()
                    && let Some(boundary) = next_grapheme_boundary(text, form.cursor)
                {
                    form.cursor = boundary;
                }
            }
        },
        (_, KeyCode::Home) => {
            if form.focused_text().is_some() {
                form.cursor = 0;
            }
        }
        (_, KeyCode::End) => {
            if let Some(text) = form.focused_text() {
                form.cursor = text.len();
            }
        }

        (_, KeyCode::Backspace) => {
            let cursor = form.cursor;
            if let Some(text) = form.focused_text_mut()
                && let Some(boundary) = prev_grapheme_boundary(text, cursor)
            {
                text.drain(boundary..cursor);
                form.cursor = boundary;
            }
        }
        (_, KeyCode::Delete) => {
            let cursor = form.cursor;
            if let Some(text) = form.focused_text_mut()
                && let Some(boundary) = next_grapheme_boundary(text, cursor)
            {
                text.drain(cursor..boundary);
            }
        }

        (_, KeyCode::Char(c)) => match form.focus {
            // Space toggles the highlighted bottle size; on enum fields
            // it cycles forward
            FormField::BottleSizes if c == ' ' => {
                let size = BottleSize::ALL[form.size_cursor];
                if !form.bottle_sizes.remove(&size) {
                    form.bottle_sizes.insert(size);
                }
            }
            FormField::Stage if c == ' ' => form.stage = form.stage.next(),
            FormField::Pasteurizer if c == ' ' => form.pasteurizer = form.pasteurizer.next(),
            FormField::Stage | FormField::Pasteurizer | FormField::BottleSizes => {}
            _ => {
                let cursor = form.cursor;
                if let Some(text) = form.focused_text_mut() {
                    text.insert(cursor, c);
                    form.cursor = cursor + c.len_utf8();
                }
            }
        },

        _ => {}
    }
}

fn save_form(app: &mut App) {
    let Some(form) = app.form.as_mut() else {
        return;
    };

    let fields = match form.to_fields() {
        Ok(fields) => fields,
        Err(message) => {
            form.error = Some(message);
            return;
        }
    };
    let target = form.target.clone();

    // The write is explicit and its outcome surfaced; the refreshed
    // snapshot itself arrives via the subscription echo
    let outcome = match &target {
        FormTarget::New => app
            .store
            .create(fields)
            .map(|bank| format!("added \"{}\"", bank.name)),
        FormTarget::Existing(id) => app
            .store
            .update(id, BankPatch::from_fields(fields))
            .map(|bank| format!("saved \"{}\"", bank.name)),
    };

    match outcome {
        Ok(message) => {
            app.form = None;
            app.mode = Mode::Navigate;
            app.set_status(message);
        }
        Err(e) => {
            // Keep the draft so nothing typed is lost
            if let Some(form) = app.form.as_mut() {
                form.error = Some(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::bank::{BankFields, Stage};
    use crate::tui::app::FormState;
    use crate::store::open_or_init;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_edit(app, key(KeyCode::Char(c)));
        }
    }

    fn app_with_blank_form() -> (App, TempDir) {
        let tmp = TempDir::new().unwrap();
        let store = open_or_init(tmp.path()).unwrap();
        let mut app = App::new(store, Vec::new());
        app.form = Some(FormState::blank());
        app.mode = Mode::Edit;
        (app, tmp)
    }

    #[test]
    fn typing_fills_the_focused_field() {
        let (mut app, _tmp) = app_with_blank_form();
        type_text(&mut app, "Riverside");
        assert_eq!(app.form.as_ref().unwrap().name, "Riverside");

        handle_edit(&mut app, key(KeyCode::Tab));
        type_text(&mut app, "Austin");
        let form = app.form.as_ref().unwrap();
        assert_eq!(form.focus, FormField::Location);
        assert_eq!(form.location, "Austin");
    }

    #[test]
    fn backspace_and_cursor_movement_edit_mid_field() {
        let (mut app, _tmp) = app_with_blank_form();
        type_text(&mut app, "Rivers");
        handle_edit(&mut app, key(KeyCode::Left));
        handle_edit(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.form.as_ref().unwrap().name, "Rives");
        handle_edit(&mut app, key(KeyCode::End));
        type_text(&mut app, "!");
        assert_eq!(app.form.as_ref().unwrap().name, "Rives!");
    }

    #[test]
    fn stage_field_cycles_with_arrows_and_space() {
        let (mut app, _tmp) = app_with_blank_form();
        // Tab to the stage field
        while app.form.as_ref().unwrap().focus != FormField::Stage {
            handle_edit(&mut app, key(KeyCode::Tab));
        }
        handle_edit(&mut app, key(KeyCode::Right));
        assert_eq!(app.form.as_ref().unwrap().stage, Stage::Compatible);
        handle_edit(&mut app, key(KeyCode::Char(' ')));
        assert_eq!(app.form.as_ref().unwrap().stage, Stage::Sampled);
        handle_edit(&mut app, key(KeyCode::Left));
        assert_eq!(app.form.as_ref().unwrap().stage, Stage::Compatible);
    }

    #[test]
    fn bottle_size_row_toggles_membership() {
        let (mut app, _tmp) = app_with_blank_form();
        while app.form.as_ref().unwrap().focus != FormField::BottleSizes {
            handle_edit(&mut app, key(KeyCode::Tab));
        }
        handle_edit(&mut app, key(KeyCode::Char(' ')));
        handle_edit(&mut app, key(KeyCode::Right));
        handle_edit(&mut app, key(KeyCode::Char(' ')));
        let form = app.form.as_ref().unwrap();
        assert!(form.bottle_sizes.contains(&BottleSize::Ml120));
        assert!(form.bottle_sizes.contains(&BottleSize::Ml240));

        // Toggling again removes
        handle_edit(&mut app, key(KeyCode::Char(' ')));
        assert!(
            !app.form
                .as_ref()
                .unwrap()
                .bottle_sizes
                .contains(&BottleSize::Ml240)
        );
    }

    #[test]
    fn esc_discards_the_draft() {
        let (mut app, _tmp) = app_with_blank_form();
        type_text(&mut app, "Never saved");
        handle_edit(&mut app, key(KeyCode::Esc));
        assert!(app.form.is_none());
        assert_eq!(app.mode, Mode::Navigate);
        assert!(app.store.load_all().unwrap().is_empty());
    }

    #[test]
    fn save_creates_a_bank_from_the_draft() {
        let (mut app, _tmp) = app_with_blank_form();
        type_text(&mut app, "Riverside");
        handle_edit(&mut app, key(KeyCode::Enter));

        assert!(app.form.is_none());
        assert_eq!(app.mode, Mode::Navigate);
        let banks = app.store.load_all().unwrap();
        assert_eq!(banks.len(), 1);
        assert_eq!(banks[0].name, "Riverside");
        assert_eq!(app.status_message.as_deref(), Some("added \"Riverside\""));
    }

    #[test]
    fn invalid_volume_keeps_the_form_open_with_an_error() {
        let (mut app, _tmp) = app_with_blank_form();
        type_text(&mut app, "Riverside");
        while app.form.as_ref().unwrap().focus != FormField::Volume {
            handle_edit(&mut app, key(KeyCode::Tab));
        }
        type_text(&mut app, "lots");
        handle_edit(&mut app, key(KeyCode::Enter));

        let form = app.form.as_ref().unwrap();
        assert_eq!(form.error.as_deref(), Some("volume must be a whole number"));
        assert_eq!(app.mode, Mode::Edit);
        assert!(app.store.load_all().unwrap().is_empty());
    }

    #[test]
    fn save_updates_an_existing_bank() {
        let tmp = TempDir::new().unwrap();
        let store = open_or_init(tmp.path()).unwrap();
        let bank = store
            .create(BankFields {
                name: "Alpha".into(),
                location: "Austin".into(),
                ..Default::default()
            })
            .unwrap();
        let banks = store.load_all().unwrap();
        let mut app = App::new(store, banks);
        app.form = Some(FormState::from_bank(&app.banks[0]));
        app.mode = Mode::Edit;

        // Rename: clear the name buffer and type a new one
        {
            let form = app.form.as_mut().unwrap();
            form.name.clear();
            form.cursor = 0;
        }
        type_text(&mut app, "Alpha Prime");
        handle_edit(&mut app, key(KeyCode::Enter));

        assert!(app.form.is_none());
        let banks = app.store.load_all().unwrap();
        assert_eq!(banks[0].name, "Alpha Prime");
        // Untouched form fields came along from the draft
        assert_eq!(banks[0].location, "Austin");
        assert!(banks[0].updated_at >= bank.updated_at);
    }

    #[test]
    fn saving_a_vanished_bank_surfaces_not_found_in_the_form() {
        let tmp = TempDir::new().unwrap();
        let store = open_or_init(tmp.path()).unwrap();
        let bank = store
            .create(BankFields {
                name: "Alpha".into(),
                ..Default::default()
            })
            .unwrap();
        let banks = store.load_all().unwrap();
        let mut app = App::new(store, banks);
        app.form = Some(FormState::from_bank(&app.banks[0]));
        app.mode = Mode::Edit;

        // Another user deletes it while we edit
        app.store.delete(&bank.id).unwrap();

        handle_edit(&mut app, key(KeyCode::Enter));
        let form = app.form.as_ref().unwrap();
        assert!(form.error.as_deref().unwrap().contains("no bank with id"));
        assert_eq!(app.mode, Mode::Edit);
    }
}

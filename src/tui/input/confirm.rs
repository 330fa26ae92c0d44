use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, ConfirmAction, Mode};

pub(super) fn handle_confirm(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        // Confirm: y
        (KeyModifiers::NONE, KeyCode::Char('y')) => {
            let action = app.confirm.take();
            app.mode = Mode::Navigate;
            if let Some(ConfirmAction::DeleteBank { id, name }) = action {
                confirm_delete_bank(app, &id, &name);
            }
        }
        // Cancel: n or Esc
        (KeyModifiers::NONE, KeyCode::Char('n')) | (_, KeyCode::Esc) => {
            app.confirm = None;
            app.mode = Mode::Navigate;
        }
        _ => {}
    }
}

fn confirm_delete_bank(app: &mut App, id: &str, name: &str) {
    // Idempotent at the store: deleting a bank someone else already
    // removed still reads as success
    match app.store.delete(id) {
        Ok(()) => app.set_status(format!("deleted \"{name}\"")),
        Err(e) => app.set_error(format!("delete failed: {e}")),
    }
    // The subscription echoes the removal; clamp now so the cursor
    // doesn't dangle until it arrives
    app.clamp_cursor();
}

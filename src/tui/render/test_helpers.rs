use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use tempfile::TempDir;

use crate::model::bank::{BankFields, Stage};
use crate::store::open_or_init;
use crate::tui::app::App;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// An app over a fresh store seeded with four banks covering the stages,
/// one of them overdue. The TempDir must outlive the returned App.
pub fn sample_app() -> (App, TempDir) {
    let tmp = TempDir::new().unwrap();
    let store = open_or_init(tmp.path()).unwrap();

    store
        .create(BankFields {
            name: "Riverside Milk Bank".into(),
            location: "Riverton".into(),
            contact: "Jo Meadows".into(),
            stage: Stage::Unknown,
            // Long past, so this bank stays overdue
            next_action: "2024-01-05".parse().ok(),
            ..Default::default()
        })
        .unwrap();
    store
        .create(BankFields {
            name: "Seaside Bank".into(),
            location: "Port Haven".into(),
            stage: Stage::Unknown,
            // Far future, so this bank never goes overdue
            next_action: "2099-01-01".parse().ok(),
            volume_potential: 120,
            ..Default::default()
        })
        .unwrap();
    store
        .create(BankFields {
            name: "Northgate Collective".into(),
            location: "Plains".into(),
            stage: Stage::Compatible,
            volume_potential: 600,
            ..Default::default()
        })
        .unwrap();
    store
        .create(BankFields {
            name: "Hill Country Dairy".into(),
            location: "Hillview".into(),
            stage: Stage::Converted,
            volume_potential: 250,
            ..Default::default()
        })
        .unwrap();

    let banks = store.load_all().unwrap();
    (App::new(store, banks), tmp)
}

use std::collections::BTreeSet;
use std::io;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use regex::Regex;

use crate::model::bank::{Bank, BankFields, BottleSize, PasteurizerType, Stage};
use crate::ops::views::{self, Filter, SortKey, StageCounts};
use crate::store::{Store, Subscription, open_or_init};

use super::input;
use super::render;
use super::theme::Theme;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    Search,
    Edit,
    Confirm,
}

/// What the open form writes to on save
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormTarget {
    /// Create a new bank
    New,
    /// Update the bank with this id
    Existing(String),
}

/// A field of the add/edit form, in focus order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Location,
    Contact,
    Email,
    Phone,
    Stage,
    Pasteurizer,
    Volume,
    BottleSizes,
    NextAction,
    LastContact,
    Notes,
}

impl FormField {
    pub const ALL: [FormField; 12] = [
        FormField::Name,
        FormField::Location,
        FormField::Contact,
        FormField::Email,
        FormField::Phone,
        FormField::Stage,
        FormField::Pasteurizer,
        FormField::Volume,
        FormField::BottleSizes,
        FormField::NextAction,
        FormField::LastContact,
        FormField::Notes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Location => "location",
            FormField::Contact => "contact",
            FormField::Email => "email",
            FormField::Phone => "phone",
            FormField::Stage => "stage",
            FormField::Pasteurizer => "pasteurizer",
            FormField::Volume => "volume/mo",
            FormField::BottleSizes => "bottles",
            FormField::NextAction => "next action",
            FormField::LastContact => "last contact",
            FormField::Notes => "notes",
        }
    }

    pub fn next(self) -> FormField {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> FormField {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// The in-progress add/edit form: a local draft copied from the record
/// (or blank for add), discarded on cancel, committed verbatim on save.
#[derive(Debug, Clone)]
pub struct FormState {
    pub target: FormTarget,
    pub name: String,
    pub location: String,
    pub contact: String,
    pub email: String,
    pub phone: String,
    pub stage: Stage,
    pub pasteurizer: PasteurizerType,
    /// Text buffer, parsed to u32 on save
    pub volume: String,
    pub bottle_sizes: BTreeSet<BottleSize>,
    /// Which bottle size the size row highlights
    pub size_cursor: usize,
    /// Text buffers, parsed to dates on save (YYYY-MM-DD, empty = none)
    pub next_action: String,
    pub last_contact: String,
    pub notes: String,
    pub focus: FormField,
    /// Byte offset into the focused text buffer
    pub cursor: usize,
    /// Validation or store error shown inside the form
    pub error: Option<String>,
}

impl FormState {
    /// Empty draft for the add form
    pub fn blank() -> Self {
        FormState {
            target: FormTarget::New,
            name: String::new(),
            location: String::new(),
            contact: String::new(),
            email: String::new(),
            phone: String::new(),
            stage: Stage::Unknown,
            pasteurizer: PasteurizerType::Unknown,
            volume: String::new(),
            bottle_sizes: BTreeSet::new(),
            size_cursor: 0,
            next_action: String::new(),
            last_contact: String::new(),
            notes: String::new(),
            focus: FormField::Name,
            cursor: 0,
            error: None,
        }
    }

    /// Draft seeded from an existing bank for the edit form
    pub fn from_bank(bank: &Bank) -> Self {
        FormState {
            target: FormTarget::Existing(bank.id.clone()),
            name: bank.name.clone(),
            location: bank.location.clone(),
            contact: bank.contact.clone(),
            email: bank.email.clone(),
            phone: bank.phone.clone(),
            stage: bank.stage,
            pasteurizer: bank.pasteurizer,
            volume: if bank.volume_potential == 0 {
                String::new()
            } else {
                bank.volume_potential.to_string()
            },
            bottle_sizes: bank.bottle_sizes.clone(),
            size_cursor: 0,
            next_action: bank.next_action.map(|d| d.to_string()).unwrap_or_default(),
            last_contact: bank.last_contact.map(|d| d.to_string()).unwrap_or_default(),
            notes: bank.notes.clone(),
            focus: FormField::Name,
            cursor: bank.name.len(),
            error: None,
        }
    }

    /// The text buffer backing a given field (empty for enum fields)
    pub fn text_value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Location => &self.location,
            FormField::Contact => &self.contact,
            FormField::Email => &self.email,
            FormField::Phone => &self.phone,
            FormField::Volume => &self.volume,
            FormField::NextAction => &self.next_action,
            FormField::LastContact => &self.last_contact,
            FormField::Notes => &self.notes,
            FormField::Stage | FormField::Pasteurizer | FormField::BottleSizes => "",
        }
    }

    /// The focused single-line text buffer, if the focused field is one
    pub fn focused_text(&self) -> Option<&String> {
        match self.focus {
            FormField::Name => Some(&self.name),
            FormField::Location => Some(&self.location),
            FormField::Contact => Some(&self.contact),
            FormField::Email => Some(&self.email),
            FormField::Phone => Some(&self.phone),
            FormField::Volume => Some(&self.volume),
            FormField::NextAction => Some(&self.next_action),
            FormField::LastContact => Some(&self.last_contact),
            FormField::Notes => Some(&self.notes),
            FormField::Stage | FormField::Pasteurizer | FormField::BottleSizes => None,
        }
    }

    pub fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Name => Some(&mut self.name),
            FormField::Location => Some(&mut self.location),
            FormField::Contact => Some(&mut self.contact),
            FormField::Email => Some(&mut self.email),
            FormField::Phone => Some(&mut self.phone),
            FormField::Volume => Some(&mut self.volume),
            FormField::NextAction => Some(&mut self.next_action),
            FormField::LastContact => Some(&mut self.last_contact),
            FormField::Notes => Some(&mut self.notes),
            FormField::Stage | FormField::Pasteurizer | FormField::BottleSizes => None,
        }
    }

    /// Validate the draft into store fields. Errors name the field the
    /// way they read in the form's error line.
    pub fn to_fields(&self) -> Result<BankFields, String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }

        let volume = if self.volume.trim().is_empty() {
            0
        } else {
            self.volume
                .trim()
                .parse::<u32>()
                .map_err(|_| "volume must be a whole number".to_string())?
        };

        Ok(BankFields {
            name: self.name.trim().to_string(),
            location: self.location.trim().to_string(),
            contact: self.contact.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            stage: self.stage,
            notes: self.notes.clone(),
            pasteurizer: self.pasteurizer,
            volume_potential: volume,
            bottle_sizes: self.bottle_sizes.clone(),
            next_action: parse_form_date(&self.next_action, "next action")?,
            last_contact: parse_form_date(&self.last_contact, "last contact")?,
        })
    }
}

/// Empty buffer is no date; anything else must be YYYY-MM-DD
fn parse_form_date(buf: &str, label: &str) -> Result<Option<NaiveDate>, String> {
    let trimmed = buf.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("{label} must be YYYY-MM-DD"))
}

/// What the open confirmation popup will do on `y`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteBank { id: String, name: String },
}

/// Main application state
pub struct App {
    pub store: Store,
    /// The latest snapshot from the store, ordered by name.
    /// Populated only by `reload` — user edits round-trip through the
    /// store and come back via the subscription.
    pub banks: Vec<Bank>,
    pub mode: Mode,
    pub should_quit: bool,
    pub theme: Theme,
    /// Cursor index into the visible list
    pub cursor: usize,
    /// Scroll offset (first visible row)
    pub scroll_offset: usize,
    pub filter: Filter,
    pub sort: SortKey,
    /// Search mode: current query being typed
    pub search_input: String,
    /// Last committed search
    pub last_search: Option<String>,
    /// 'f' was pressed; next key picks the filter
    pub filter_pending: bool,
    /// 'o' was pressed; next key picks the sort order
    pub sort_pending: bool,
    pub form: Option<FormState>,
    pub confirm: Option<ConfirmAction>,
    pub show_help: bool,
    pub status_message: Option<String>,
    pub status_is_error: bool,
}

impl App {
    pub fn new(store: Store, banks: Vec<Bank>) -> Self {
        let theme = Theme::from_config(&store.config.ui);
        App {
            store,
            banks,
            mode: Mode::Navigate,
            should_quit: false,
            theme,
            cursor: 0,
            scroll_offset: 0,
            filter: Filter::All,
            sort: SortKey::NextAction,
            search_input: String::new(),
            last_search: None,
            filter_pending: false,
            sort_pending: false,
            form: None,
            confirm: None,
            show_help: false,
            status_message: None,
            status_is_error: false,
        }
    }

    /// Start of the current calendar day, local time — the overdue boundary
    pub fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    /// The search query the derivations apply right now.
    /// In Search mode that is the query being typed; otherwise the last
    /// committed one.
    pub fn active_query(&self) -> &str {
        match self.mode {
            Mode::Search => &self.search_input,
            _ => self.last_search.as_deref().unwrap_or(""),
        }
    }

    /// The active search regex for list highlighting
    pub fn search_re(&self) -> Option<Regex> {
        views::search_matcher(self.active_query())
    }

    /// Indices into `banks` in display order: filter, search, sort
    pub fn visible(&self) -> Vec<usize> {
        views::visible_banks(
            &self.banks,
            self.filter,
            self.active_query(),
            self.sort,
            self.today(),
        )
    }

    pub fn stage_counts(&self) -> StageCounts {
        views::stage_counts(&self.banks)
    }

    pub fn overdue_count(&self) -> usize {
        views::overdue_count(&self.banks, self.today())
    }

    /// The bank under the cursor, if any
    pub fn selected_bank(&self) -> Option<&Bank> {
        let visible = self.visible();
        visible.get(self.cursor).map(|&i| &self.banks[i])
    }

    /// Replace the snapshot from the store. Called at startup and every
    /// time the subscription reports a change — our own writes and other
    /// users' writes arrive the same way.
    pub fn reload(&mut self) {
        match self.store.load_all() {
            Ok(banks) => {
                self.banks = banks;
                self.clamp_cursor();
            }
            Err(e) => self.set_error(format!("store read failed: {e}")),
        }
    }

    pub fn clamp_cursor(&mut self) {
        let count = self.visible().len();
        if count == 0 {
            self.cursor = 0;
        } else {
            self.cursor = self.cursor.min(count - 1);
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_is_error = false;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_is_error = true;
    }
}

/// Restore UI state from .state.json
pub fn restore_ui_state(app: &mut App) {
    use super::state::read_ui_state;

    let ui_state = match read_ui_state(&app.store.funnel_dir) {
        Some(s) => s,
        None => return,
    };

    app.filter = ui_state.filter;
    app.sort = ui_state.sort;
    app.last_search = ui_state.last_search;
    app.cursor = ui_state.cursor;
    app.clamp_cursor();
}

/// Save UI state to .state.json
pub fn save_ui_state(app: &App) {
    use super::state::{UiState, write_ui_state};

    let ui_state = UiState {
        filter: app.filter,
        sort: app.sort,
        last_search: app.last_search.clone(),
        cursor: app.cursor,
    };

    let _ = write_ui_state(&app.store.funnel_dir, &ui_state);
}

/// Run the TUI application
pub fn run(store_dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    // Open (or bootstrap) the store and take the initial snapshot
    let base = match store_dir {
        Some(dir) => std::path::PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    let store = open_or_init(&base)?;
    let banks = store.load_all()?;

    // The single owned subscription: lives for the whole session, torn
    // down when it drops at the end of this function
    let subscription = Subscription::start(store.collection_dir())?;

    let mut app = App::new(store, banks);

    // Restore saved UI state
    restore_ui_state(&mut app);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Run event loop
    let result = run_event_loop(&mut terminal, &mut app, &subscription);

    // Save UI state before exit
    save_ui_state(&app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    subscription: &Subscription,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        // Store snapshots arrive between key events; each tick folds any
        // pending change into a single reload
        if subscription.poll_changed() {
            app.reload();
        }

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

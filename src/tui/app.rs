use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::board::{Board, BoardSettings, Refresh};
use crate::io::config_io::{self, LoadedConfig};
use crate::io::publisher::FilePublisher;
use crate::io::snapshot_io::{board_path, board_snapshot};
use crate::io::state::FileUiStore;
use crate::io::watcher::StoreWatcher;
use crate::logging;
use crate::model::board::{BoardKey, Section};

use super::input;
use super::render;
use super::theme::Theme;

/// Longest wait for input when no timer is armed
const IDLE_TICK: Duration = Duration::from_millis(250);

/// A configured board, or the reason it could not be built
pub enum BoardSlot {
    Ready(Box<Board>),
    Broken { label: String, error: String },
}

impl BoardSlot {
    pub fn label(&self) -> &str {
        match self {
            BoardSlot::Ready(board) => &board.settings().title,
            BoardSlot::Broken { label, .. } => label,
        }
    }

    pub fn board(&self) -> Option<&Board> {
        match self {
            BoardSlot::Ready(board) => Some(&**board),
            BoardSlot::Broken { .. } => None,
        }
    }

    pub fn board_mut(&mut self) -> Option<&mut Board> {
        match self {
            BoardSlot::Ready(board) => Some(&mut **board),
            BoardSlot::Broken { .. } => None,
        }
    }
}

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    AddName,
    AddCategory,
    Filter,
    ConfirmDelete,
}

/// One selectable row of a board
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatItem {
    Section(Section),
    Group(String),
    /// A task, by id
    Task(String),
}

/// Per-board cursor position
#[derive(Debug, Clone, Default)]
pub struct BoardCursor {
    /// Index into the flat item list
    pub cursor: usize,
    /// First visible layout row
    pub scroll_offset: usize,
    /// Tick column that space toggles
    pub tick: usize,
}

/// Main application state
pub struct App {
    pub slots: Vec<BoardSlot>,
    pub cursors: Vec<BoardCursor>,
    /// Index of the board on screen
    pub current: usize,
    pub mode: Mode,
    pub should_quit: bool,
    pub theme: Theme,
    pub name_input: String,
    pub category_input: String,
    pub filter_input: String,
    /// Task id awaiting delete confirmation
    pub delete_target: Option<String>,
    /// One-line feedback shown in the status row
    pub message: Option<String>,
    /// Something on screen is stale
    pub dirty: bool,
    pub store_dir: PathBuf,
}

impl App {
    pub fn new(slots: Vec<BoardSlot>, theme: Theme, store_dir: PathBuf) -> Self {
        let cursors = slots.iter().map(|_| BoardCursor::default()).collect();
        App {
            slots,
            cursors,
            current: 0,
            mode: Mode::Navigate,
            should_quit: false,
            theme,
            name_input: String::new(),
            category_input: String::new(),
            filter_input: String::new(),
            delete_target: None,
            message: None,
            dirty: true,
            store_dir,
        }
    }

    pub fn current_board(&self) -> Option<&Board> {
        self.slots.get(self.current).and_then(BoardSlot::board)
    }

    pub fn current_board_mut(&mut self) -> Option<&mut Board> {
        self.slots.get_mut(self.current).and_then(BoardSlot::board_mut)
    }

    pub fn cursor(&self) -> BoardCursor {
        self.cursors.get(self.current).cloned().unwrap_or_default()
    }

    pub fn cursor_mut(&mut self) -> Option<&mut BoardCursor> {
        self.cursors.get_mut(self.current)
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Flat items for the board on screen
    pub fn flat_items(&mut self) -> Vec<FlatItem> {
        match self.current_board_mut() {
            Some(board) => build_flat_items(board),
            None => Vec::new(),
        }
    }

    /// The item under the cursor
    pub fn selected_item(&mut self) -> Option<FlatItem> {
        let items = self.flat_items();
        let cursor = self.cursor().cursor.min(items.len().saturating_sub(1));
        items.into_iter().nth(cursor)
    }

    /// Cycle boards by `delta` (wrapping)
    pub fn switch_board(&mut self, delta: isize) {
        let len = self.slots.len() as isize;
        if len == 0 {
            return;
        }
        self.current = (self.current as isize + delta).rem_euclid(len) as usize;
        self.mode = Mode::Navigate;
        self.message = None;
        self.dirty = true;
    }

    /// Read every board's entity file once
    pub fn load_all(&mut self, now: Instant) {
        for slot in &mut self.slots {
            if let BoardSlot::Ready(board) = slot {
                let snapshot =
                    board_snapshot(&self.store_dir, board.key(), board.settings().inline.as_deref());
                board.receive(snapshot, now);
            }
        }
        self.dirty = true;
    }

    /// Deliver a fresh snapshot to the board stored under `key`
    pub fn refresh_board(&mut self, key: &BoardKey, now: Instant) {
        for slot in &mut self.slots {
            if let BoardSlot::Ready(board) = slot
                && board.key() == key
            {
                // The tab bar shows pending edits, so a confirmation redraws too
                let was_pending = board.is_pending();
                let snapshot = board_snapshot(&self.store_dir, key, board.settings().inline.as_deref());
                let refresh = board.receive(snapshot, now);
                if refresh == Refresh::Redraw || was_pending != board.is_pending() {
                    self.dirty = true;
                }
            }
        }
    }

    /// Fire any due debounce timers
    pub fn poll_timers(&mut self, now: Instant) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let BoardSlot::Ready(board) = slot
                && board.poll(now) == Refresh::Redraw
                && index == self.current
            {
                self.dirty = true;
            }
        }
    }

    /// How long the loop may block waiting for input
    pub fn next_timeout(&self, now: Instant) -> Duration {
        self.slots
            .iter()
            .filter_map(BoardSlot::board)
            .filter_map(|board| board.next_deadline(now))
            .min()
            .map_or(IDLE_TICK, |d| d.min(IDLE_TICK))
    }
}

/// Selectable rows of a board in display order.
///
/// Empty when the board has no entity or nothing survives the filter.
pub fn build_flat_items(board: &mut Board) -> Vec<FlatItem> {
    if !board.is_available() {
        return Vec::new();
    }
    let ui = board.ui().clone();
    let view = board.view();
    let mut items = Vec::new();
    if view.is_empty() {
        return items;
    }

    items.push(FlatItem::Section(Section::InProgress));
    if ui.section_open(Section::InProgress) {
        for (category, tasks) in &view.groups {
            items.push(FlatItem::Group(category.clone()));
            if ui.group_expanded(category) {
                items.extend(tasks.iter().map(|t| FlatItem::Task(t.id.clone())));
            }
        }
    }

    if !view.completed.is_empty() {
        items.push(FlatItem::Section(Section::Completed));
        if ui.section_open(Section::Completed) {
            items.extend(view.completed.iter().map(|t| FlatItem::Task(t.id.clone())));
        }
    }
    items
}

/// One slot per configured board. Boards with bad settings become
/// `Broken` so the rest still work.
pub fn build_slots(loaded: &LoadedConfig) -> Vec<BoardSlot> {
    loaded
        .config
        .boards
        .iter()
        .enumerate()
        .map(|(index, config)| {
            let label = config.label(index);
            match open_board(loaded, index) {
                Ok(board) => BoardSlot::Ready(Box::new(board)),
                Err(error) => {
                    tracing::error!(board = %label, %error, "board disabled");
                    BoardSlot::Broken { label, error }
                }
            }
        })
        .collect()
}

fn open_board(loaded: &LoadedConfig, index: usize) -> Result<Board, String> {
    let settings = BoardSettings::from_config(&loaded.config.boards[index], index)
        .map_err(|e| e.to_string())?;
    let key = BoardKey::from_name(&settings.name);
    let publisher = FilePublisher::spawn(
        loaded.store_dir.clone(),
        board_path(&loaded.store_dir, &key),
    )
    .map_err(|e| format!("could not start publisher: {}", e))?;
    Ok(Board::with_settings(
        settings,
        &loaded.config.sync,
        Box::new(FileUiStore::new(&loaded.store_dir)),
        Box::new(publisher),
    ))
}

/// Run the TUI application
pub fn run(config: Option<&str>, verbose: u8) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = config_io::resolve_config(config.map(Path::new))?;
    std::fs::create_dir_all(&loaded.store_dir)?;
    logging::init_tracing(verbose, Some(&loaded.store_dir.join(logging::LOG_FILE)));
    tracing::info!(config = %loaded.path.display(), boards = loaded.config.boards.len(), "starting");

    let watcher = match StoreWatcher::start(&loaded.store_dir) {
        Ok(w) => Some(w),
        Err(e) => {
            tracing::warn!(error = %e, "store watcher unavailable; external edits will not show");
            None
        }
    };

    let mut app = App::new(
        build_slots(&loaded),
        Theme::from_config(&loaded.config.ui),
        loaded.store_dir.clone(),
    );
    app.load_all(Instant::now());

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

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Dropping the boards joins their publishers
    drop(app);
    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&StoreWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        if app.dirty {
            terminal.draw(|frame| render::render(frame, app))?;
            app.dirty = false;
        }

        if event::poll(app.next_timeout(Instant::now()))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app, key, Instant::now());
                    app.dirty = true;
                }
                Event::Resize(..) => app.dirty = true,
                _ => {}
            }
        }

        if let Some(watcher) = watcher {
            for key in watcher.poll() {
                app.refresh_board(&key, Instant::now());
            }
        }
        app.poll_timers(Instant::now());

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

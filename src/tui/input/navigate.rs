use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};

use crate::board::BoardError;
use crate::model::board::Section;
use crate::tui::app::{App, FlatItem, Mode};

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc => app.message = None,

        KeyCode::Tab => app.switch_board(1),
        KeyCode::BackTab => app.switch_board(-1),

        KeyCode::Char('j') | KeyCode::Down => move_cursor(app, 1),
        KeyCode::Char('k') | KeyCode::Up => move_cursor(app, -1),
        KeyCode::Char('g') | KeyCode::Home => move_cursor(app, isize::MIN),
        KeyCode::Char('G') | KeyCode::End => move_cursor(app, isize::MAX),
        KeyCode::Char('h') | KeyCode::Left => move_tick(app, -1),
        KeyCode::Char('l') | KeyCode::Right => move_tick(app, 1),

        KeyCode::Char(' ') => {
            if let Some(FlatItem::Task(id)) = app.selected_item() {
                toggle_selected_tick(app, &id, now);
            }
        }
        KeyCode::Enter => activate(app, now),

        KeyCode::Char('a') => begin_add(app),
        KeyCode::Char('/') => begin_filter(app),
        KeyCode::Char('x') | KeyCode::Char('d') => {
            if let Some(FlatItem::Task(id)) = app.selected_item() {
                if let Some(board) = app.current_board()
                    && board.settings().is_read_only()
                {
                    let message = BoardError::ReadOnly(board.key().clone()).to_string();
                    app.set_message(message);
                    return;
                }
                app.delete_target = Some(id);
                app.mode = Mode::ConfirmDelete;
            }
        }
        _ => {}
    }
}

fn move_cursor(app: &mut App, delta: isize) {
    let len = app.flat_items().len();
    let Some(cursor) = app.cursor_mut() else {
        return;
    };
    let last = len.saturating_sub(1);
    cursor.cursor = match delta {
        isize::MIN => 0,
        isize::MAX => last,
        d if d < 0 => cursor.cursor.min(last).saturating_sub(d.unsigned_abs()),
        d => (cursor.cursor + d as usize).min(last),
    };
}

fn move_tick(app: &mut App, delta: isize) {
    let ticks = app.current_board().map_or(1, |b| b.settings().ticks);
    if let Some(cursor) = app.cursor_mut() {
        cursor.tick = cursor
            .tick
            .saturating_add_signed(delta)
            .min(ticks.saturating_sub(1));
    }
}

fn toggle_selected_tick(app: &mut App, id: &str, now: Instant) {
    let tick = app.cursor().tick;
    let Some(board) = app.current_board_mut() else {
        return;
    };
    let index = tick.min(board.settings().ticks.saturating_sub(1));
    if let Err(e) = board.toggle_tick(id, index, now) {
        app.set_message(e.to_string());
    }
}

/// Enter: fold a header, or toggle the tick under the column cursor
fn activate(app: &mut App, now: Instant) {
    let Some(item) = app.selected_item() else {
        return;
    };
    match item {
        FlatItem::Task(id) => toggle_selected_tick(app, &id, now),
        FlatItem::Group(category) => {
            if let Some(board) = app.current_board_mut() {
                board.toggle_group(&category);
            }
        }
        FlatItem::Section(section) => toggle_section(app, section),
    }
}

fn toggle_section(app: &mut App, section: Section) {
    if let Some(board) = app.current_board_mut() {
        board.toggle_section(section);
    }
}

fn begin_add(app: &mut App) {
    let Some(board) = app.current_board() else {
        return;
    };
    if board.settings().is_read_only() {
        let message = BoardError::ReadOnly(board.key().clone()).to_string();
        app.set_message(message);
        return;
    }
    if !board.is_available() {
        let key = board.key().to_string();
        app.set_message(format!("board \"{}\" has no store file; adding is disabled", key));
        return;
    }
    let (name, category) = (board.ui().draft_name.clone(), board.ui().draft_category.clone());
    app.name_input = name;
    app.category_input = category;
    app.message = None;
    app.mode = Mode::AddName;
}

fn begin_filter(app: &mut App) {
    let Some(board) = app.current_board() else {
        return;
    };
    app.filter_input = board.ui().filter.clone();
    app.message = None;
    app.mode = Mode::Filter;
}

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, FlatItem, Mode};
use crate::util::unicode::pop_grapheme;

/// Name and category prompts for a new task. The draft is saved on every
/// keystroke so it survives Esc and restarts.
pub(super) fn handle_add(app: &mut App, key: KeyEvent, now: Instant) {
    let categories = app
        .current_board()
        .is_some_and(|b| b.settings().categories);

    match key.code {
        KeyCode::Esc => {
            app.mode = Mode::Navigate;
            return;
        }
        KeyCode::Enter => {
            commit_add(app, now);
            return;
        }
        KeyCode::Tab | KeyCode::BackTab if categories => {
            app.mode = match app.mode {
                Mode::AddName => Mode::AddCategory,
                _ => Mode::AddName,
            };
            return;
        }
        KeyCode::Backspace => {
            if app.mode == Mode::AddCategory {
                pop_grapheme(&mut app.category_input);
            } else {
                pop_grapheme(&mut app.name_input);
            }
        }
        KeyCode::Char(c) => {
            if app.mode == Mode::AddCategory {
                app.category_input.push(c);
            } else {
                app.name_input.push(c);
            }
        }
        _ => return,
    }

    app.message = None;
    let (name, category) = (app.name_input.clone(), app.category_input.clone());
    if let Some(board) = app.current_board_mut() {
        board.set_draft(&name, &category);
    }
}

fn commit_add(app: &mut App, now: Instant) {
    let (name, category) = (app.name_input.clone(), app.category_input.clone());
    let Some(board) = app.current_board_mut() else {
        return;
    };
    match board.add_task(&name, Some(&category), now) {
        Ok(id) => {
            app.name_input.clear();
            app.category_input.clear();
            app.mode = Mode::Navigate;
            app.set_message(format!("added {}", name.trim()));
            select_task(app, &id);
        }
        // Rejected: the list is untouched and the prompt stays open
        Err(e) => app.set_message(e.to_string()),
    }
}

/// Put the cursor on a task if it is visible
fn select_task(app: &mut App, id: &str) {
    let items = app.flat_items();
    if let Some(pos) = items
        .iter()
        .position(|item| matches!(item, FlatItem::Task(t) if t == id))
        && let Some(cursor) = app.cursor_mut()
    {
        cursor.cursor = pos;
    }
}

/// Filter prompt. Typing reschedules the debounce; Enter applies right away.
pub(super) fn handle_filter(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Esc => {
            app.mode = Mode::Navigate;
            return;
        }
        KeyCode::Enter => {
            if let Some(board) = app.current_board_mut() {
                board.commit_filter();
            }
            app.mode = Mode::Navigate;
            return;
        }
        KeyCode::Backspace => pop_grapheme(&mut app.filter_input),
        KeyCode::Char(c) => app.filter_input.push(c),
        _ => return,
    }

    let text = app.filter_input.clone();
    if let Some(board) = app.current_board_mut() {
        board.set_filter(&text, now);
    }
}

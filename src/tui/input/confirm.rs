use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, Mode};

/// y deletes the pending task; any other key cancels
pub(super) fn handle_confirm(app: &mut App, key: KeyEvent, now: Instant) {
    let target = app.delete_target.take();
    app.mode = Mode::Navigate;

    if !matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
        return;
    }
    let Some(id) = target else {
        return;
    };
    let Some(board) = app.current_board_mut() else {
        return;
    };
    match board.delete_task(&id, now) {
        Ok(true) => {}
        Ok(false) => app.set_message("task is already gone"),
        Err(e) => app.set_message(e.to_string()),
    }
}

mod confirm;
mod navigate;
mod prompt;

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode};

use confirm::handle_confirm;
use navigate::handle_navigate;
use prompt::{handle_add, handle_filter};

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.mode {
        Mode::Navigate => handle_navigate(app, key, now),
        Mode::AddName | Mode::AddCategory => handle_add(app, key, now),
        Mode::Filter => handle_filter(app, key, now),
        Mode::ConfirmDelete => handle_confirm(app, key, now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::board::Section;
    use crate::model::config::BoardConfig;
    use crate::tui::app::tests::{app_with, raw};
    use crate::tui::app::FlatItem;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn press(app: &mut App, code: KeyCode, now: Instant) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE), now);
    }

    fn type_text(app: &mut App, text: &str, now: Instant) {
        for c in text.chars() {
            press(app, KeyCode::Char(c), now);
        }
    }

    fn groceries() -> BoardConfig {
        BoardConfig {
            categories: true,
            ticks: 2,
            ..BoardConfig::named("Groceries")
        }
    }

    #[test]
    fn space_toggles_tick_under_column_cursor() {
        let now = Instant::now();
        let (mut app, publisher) = app_with(groceries(), vec![raw("m", "Milk", None, &[false, false])]);
        // Section, Group, Task
        press(&mut app, KeyCode::Char('j'), now);
        press(&mut app, KeyCode::Char('j'), now);
        press(&mut app, KeyCode::Char('l'), now);
        press(&mut app, KeyCode::Char(' '), now);

        let published = publisher.last().unwrap();
        assert_eq!(published[0].ticks, vec![false, true]);
    }

    #[test]
    fn enter_on_header_collapses_it() {
        let now = Instant::now();
        let (mut app, publisher) = app_with(groceries(), vec![raw("m", "Milk", None, &[false, false])]);
        press(&mut app, KeyCode::Enter, now);
        assert_eq!(app.flat_items(), vec![FlatItem::Section(Section::InProgress)]);
        assert_eq!(publisher.count(), 0);
    }

    #[test]
    fn add_flow_with_category() {
        let now = Instant::now();
        let (mut app, publisher) = app_with(groceries(), vec![]);
        press(&mut app, KeyCode::Char('a'), now);
        assert_eq!(app.mode, Mode::AddName);
        type_text(&mut app, "Oat milk", now);
        press(&mut app, KeyCode::Tab, now);
        assert_eq!(app.mode, Mode::AddCategory);
        type_text(&mut app, "Dairy", now);
        press(&mut app, KeyCode::Enter, now);

        assert_eq!(app.mode, Mode::Navigate);
        let published = publisher.last().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].name, "Oat milk");
        assert_eq!(published[0].category.as_deref(), Some("Dairy"));
        assert!(app.name_input.is_empty());
    }

    #[test]
    fn duplicate_add_keeps_prompt_open() {
        let now = Instant::now();
        let (mut app, publisher) = app_with(groceries(), vec![raw("m", "Milk", None, &[false, false])]);
        press(&mut app, KeyCode::Char('a'), now);
        type_text(&mut app, "MILK", now);
        press(&mut app, KeyCode::Enter, now);

        assert_eq!(app.mode, Mode::AddName);
        assert_eq!(app.name_input, "MILK");
        assert!(app.message.as_deref().unwrap_or("").contains("already"));
        assert_eq!(publisher.count(), 0);
    }

    #[test]
    fn escape_keeps_draft() {
        let now = Instant::now();
        let (mut app, _) = app_with(groceries(), vec![]);
        press(&mut app, KeyCode::Char('a'), now);
        type_text(&mut app, "Bre", now);
        press(&mut app, KeyCode::Esc, now);
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.current_board().unwrap().ui().draft_name, "Bre");

        // Reopening restores it
        press(&mut app, KeyCode::Char('a'), now);
        assert_eq!(app.name_input, "Bre");
    }

    #[test]
    fn filter_is_debounced_until_enter() {
        let now = Instant::now();
        let (mut app, _) = app_with(
            groceries(),
            vec![
                raw("m", "Milk", None, &[false, false]),
                raw("b", "Bread", None, &[false, false]),
            ],
        );
        press(&mut app, KeyCode::Char('/'), now);
        type_text(&mut app, "milk", now);
        assert_eq!(app.current_board().unwrap().applied_filter(), "");

        app.poll_timers(now + Duration::from_millis(100));
        assert_eq!(app.current_board().unwrap().applied_filter(), "");

        press(&mut app, KeyCode::Enter, now + Duration::from_millis(120));
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.current_board().unwrap().applied_filter(), "milk");
        assert_eq!(app.flat_items().len(), 3);
    }

    #[test]
    fn filter_lands_after_debounce() {
        let now = Instant::now();
        let (mut app, _) = app_with(groceries(), vec![raw("m", "Milk", None, &[false, false])]);
        press(&mut app, KeyCode::Char('/'), now);
        type_text(&mut app, "zzz", now);
        press(&mut app, KeyCode::Esc, now);
        assert_eq!(app.mode, Mode::Navigate);

        app.poll_timers(now + Duration::from_millis(300));
        assert_eq!(app.current_board().unwrap().applied_filter(), "zzz");
        assert!(app.flat_items().is_empty());
    }

    #[test]
    fn delete_needs_confirmation() {
        let now = Instant::now();
        let (mut app, publisher) = app_with(groceries(), vec![raw("m", "Milk", None, &[false, false])]);
        press(&mut app, KeyCode::Char('G'), now);
        press(&mut app, KeyCode::Char('x'), now);
        assert_eq!(app.mode, Mode::ConfirmDelete);
        press(&mut app, KeyCode::Char('n'), now);
        assert_eq!(publisher.count(), 0);

        press(&mut app, KeyCode::Char('x'), now);
        press(&mut app, KeyCode::Char('y'), now);
        assert_eq!(publisher.last(), Some(vec![]));
        assert_eq!(app.mode, Mode::Navigate);
    }

    #[test]
    fn inline_board_refuses_edits() {
        let now = Instant::now();
        let milk = raw("m", "Milk", None, &[false, false]);
        let config = BoardConfig {
            tasks: Some(vec![milk.clone()]),
            ..groceries()
        };
        let (mut app, publisher) = app_with(config, vec![milk]);

        press(&mut app, KeyCode::Char('a'), now);
        assert_eq!(app.mode, Mode::Navigate);
        assert!(app.message.as_deref().unwrap_or("").contains("read-only"));

        press(&mut app, KeyCode::Char('G'), now);
        press(&mut app, KeyCode::Char('x'), now);
        assert_eq!(app.mode, Mode::Navigate);
        press(&mut app, KeyCode::Char(' '), now);
        assert!(app.message.as_deref().unwrap_or("").contains("read-only"));
        assert_eq!(publisher.count(), 0);
    }

    #[test]
    fn q_quits() {
        let (mut app, _) = app_with(groceries(), vec![]);
        press(&mut app, KeyCode::Char('q'), Instant::now());
        assert!(app.should_quit);
    }
}

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, BoardSlot};
use crate::util::unicode::display_width;

/// Render the tab bar: one tab per board, with a separator line below
pub fn render_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // tabs
            Constraint::Length(1), // separator
        ])
        .split(area);

    let sep_cols = render_tabs(frame, app, chunks[0]);
    render_separator(frame, app, chunks[1], &sep_cols);
}

fn spans_width(spans: &[Span]) -> usize {
    spans.iter().map(|s| display_width(&s.content)).sum()
}

/// Render tabs and return the column positions of each separator character.
fn render_tabs(frame: &mut Frame, app: &App, area: Rect) -> Vec<usize> {
    let bg = app.theme.background;
    let mut spans: Vec<Span> = Vec::new();
    let mut sep_cols: Vec<usize> = Vec::new();
    let sep = Span::styled("\u{2502}", Style::default().fg(app.theme.dim).bg(bg));

    spans.push(Span::styled(" ", Style::default().bg(bg)));
    spans.push(Span::styled(
        "[x]",
        Style::default().fg(app.theme.purple).bg(bg),
    ));
    spans.push(Span::styled(" ", Style::default().bg(bg)));

    for (i, slot) in app.slots.iter().enumerate() {
        let is_current = i == app.current;
        let style = tab_style(app, is_current);
        let tab_bg = if is_current { app.theme.selection_bg } else { bg };
        spans.push(Span::styled(format!(" {} ", slot.label()), style));
        match slot {
            BoardSlot::Broken { .. } => {
                spans.push(Span::styled(
                    "! ",
                    Style::default().fg(app.theme.red).bg(tab_bg),
                ));
            }
            BoardSlot::Ready(board) if board.is_pending() => {
                // Local edit not yet echoed back by the store
                spans.push(Span::styled(
                    "\u{2022} ",
                    Style::default().fg(app.theme.yellow).bg(tab_bg),
                ));
            }
            BoardSlot::Ready(_) => {}
        }
        sep_cols.push(spans_width(&spans));
        spans.push(sep.clone());
    }

    let tabs = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(tabs, area);
    sep_cols
}

fn render_separator(frame: &mut Frame, app: &App, area: Rect, sep_cols: &[usize]) {
    let width = area.width as usize;
    let bg = app.theme.background;
    let dim = app.theme.dim;

    let filter = app
        .current_board()
        .map(|b| b.applied_filter().to_string())
        .unwrap_or_default();

    let mut indicator: Vec<Span> = Vec::new();
    if !filter.is_empty() {
        indicator.push(Span::styled("filter: ", Style::default().fg(app.theme.purple).bg(bg)));
        indicator.push(Span::styled(
            filter,
            Style::default().fg(app.theme.text_bright).bg(bg),
        ));
    }
    let indicator_width = spans_width(&indicator);

    // +2: one space before the indicator, one after
    let separator_end = if indicator.is_empty() {
        width
    } else {
        width.saturating_sub(indicator_width + 2)
    };
    let line: String = (0..separator_end)
        .map(|col| if sep_cols.contains(&col) { '\u{2534}' } else { '\u{2500}' })
        .collect();

    let mut spans = vec![Span::styled(line, Style::default().fg(dim).bg(bg))];
    if !indicator.is_empty() {
        spans.push(Span::styled(" ", Style::default().bg(bg)));
        spans.extend(indicator);
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(bg)),
        area,
    );
}

/// Style for a tab: highlighted if current, normal otherwise
fn tab_style(app: &App, is_current: bool) -> Style {
    if is_current {
        Style::default()
            .fg(app.theme.text_bright)
            .bg(app.theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.text).bg(app.theme.background)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::BoardConfig;
    use crate::tui::app::tests::{app_with, raw};
    use crate::tui::render::test_helpers::*;

    #[test]
    fn tabs_show_titles_and_broken_marker() {
        let (mut app, _) = app_with(BoardConfig::named("Groceries"), vec![]);
        app.slots.push(BoardSlot::Broken {
            label: "board #2".into(),
            error: "board #2 has no name".into(),
        });
        app.cursors.push(Default::default());

        let output = render_to_string(TERM_W, 2, |frame, area| {
            render_tab_bar(frame, &app, area);
        });
        let first = output.lines().next().unwrap_or("");
        assert_eq!(first, " [x]  Groceries \u{2502} board #2 ! \u{2502}");
    }

    #[test]
    fn pending_edit_marks_tab() {
        let (mut app, _) = app_with(
            BoardConfig::named("Groceries"),
            vec![raw("m", "Milk", None, &[false])],
        );
        if let Some(board) = app.current_board_mut() {
            board
                .toggle_tick("m", 0, std::time::Instant::now())
                .unwrap();
        }
        let output = render_to_string(TERM_W, 2, |frame, area| {
            render_tab_bar(frame, &app, area);
        });
        assert!(output.contains("Groceries \u{2022}"));
    }

    #[test]
    fn separator_shows_applied_filter() {
        let (mut app, _) = app_with(BoardConfig::named("Groceries"), vec![]);
        if let Some(board) = app.current_board_mut() {
            board.set_filter("milk", std::time::Instant::now());
            board.commit_filter();
        }
        let output = render_to_string(40, 2, |frame, area| {
            render_tab_bar(frame, &app, area);
        });
        let second = output.lines().nth(1).unwrap_or("");
        assert!(second.ends_with(" filter: milk"));
    }
}

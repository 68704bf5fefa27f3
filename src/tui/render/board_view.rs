use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::board::{Board, Presence};
use crate::io::snapshot_io::board_path;
use crate::model::board::Section;
use crate::ops::task_ops::find_task;
use crate::tui::app::{App, BoardCursor, BoardSlot, FlatItem, build_flat_items};
use crate::tui::theme::Theme;
use crate::util::unicode::{display_width, truncate_to_width};

use super::{filter_regex, push_highlighted_spans};

/// A screen row: one item across the full width, or one cell per column
#[derive(Debug, Clone, PartialEq, Eq)]
enum Row {
    Full(usize),
    Split(Vec<Option<usize>>),
}

impl Row {
    fn contains(&self, index: usize) -> bool {
        match self {
            Row::Full(i) => *i == index,
            Row::Split(cells) => cells.contains(&Some(index)),
        }
    }
}

/// Lay flat items out in rows. Group blocks in the In Progress section are
/// dealt round-robin into `columns` columns; everything else spans the width.
fn layout_rows(items: &[FlatItem], columns: usize) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut i = 0;
    while i < items.len() {
        if columns > 1 && matches!(items[i], FlatItem::Group(_)) {
            let mut blocks: Vec<Vec<usize>> = Vec::new();
            while i < items.len() && !matches!(items[i], FlatItem::Section(_)) {
                if matches!(items[i], FlatItem::Group(_)) {
                    blocks.push(Vec::new());
                }
                if let Some(block) = blocks.last_mut() {
                    block.push(i);
                }
                i += 1;
            }
            let mut cols: Vec<Vec<usize>> = vec![Vec::new(); columns];
            for (b, block) in blocks.into_iter().enumerate() {
                cols[b % columns].extend(block);
            }
            let height = cols.iter().map(Vec::len).max().unwrap_or(0);
            for r in 0..height {
                rows.push(Row::Split(cols.iter().map(|c| c.get(r).copied()).collect()));
            }
        } else {
            rows.push(Row::Full(i));
            i += 1;
        }
    }
    rows
}

/// Render the content area for the board on screen
pub fn render_board_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let App {
        slots,
        cursors,
        current,
        theme,
        store_dir,
        ..
    } = app;

    let Some(slot) = slots.get_mut(*current) else {
        render_notice(frame, theme, area, " No boards configured. Add one with `tb init --board NAME`.", theme.dim);
        return;
    };

    let board = match slot {
        BoardSlot::Broken { label, error } => {
            render_notice(frame, theme, area, &format!(" {}: {}", label, error), theme.red);
            return;
        }
        BoardSlot::Ready(board) => board,
    };

    match board.presence() {
        Presence::Unknown => {
            render_notice(frame, theme, area, " Loading\u{2026}", theme.dim);
            return;
        }
        Presence::Missing => {
            let path = board_path(store_dir, board.key());
            let msg = format!(
                " Board \"{}\" not found: {} does not exist. Changes are disabled.",
                board.settings().name,
                path.display()
            );
            render_notice(frame, theme, area, &msg, theme.yellow);
            return;
        }
        Presence::Present => {}
    }

    let items = build_flat_items(board);
    if items.is_empty() {
        let msg = if board.applied_filter().is_empty() {
            " No tasks"
        } else {
            " No matching tasks"
        };
        render_notice(frame, theme, area, msg, theme.dim);
        return;
    }

    let Some(cursor) = cursors.get_mut(*current) else {
        return;
    };
    cursor.cursor = cursor.cursor.min(items.len() - 1);

    let columns = board.settings().columns;
    let rows = layout_rows(&items, columns);

    // Keep the cursor's row on screen
    let visible_height = area.height as usize;
    let cursor_row = rows
        .iter()
        .position(|r| r.contains(cursor.cursor))
        .unwrap_or(0);
    if cursor_row < cursor.scroll_offset {
        cursor.scroll_offset = cursor_row;
    } else if visible_height > 0 && cursor_row >= cursor.scroll_offset + visible_height {
        cursor.scroll_offset = cursor_row + 1 - visible_height;
    }

    let width = area.width as usize;
    let col_width = width / columns.max(1);
    let ctx = RowContext::new(board, theme, cursor);

    let lines: Vec<Line> = rows
        .iter()
        .skip(cursor.scroll_offset)
        .take(visible_height)
        .map(|row| match row {
            Row::Full(i) => ctx.item_line(&items[*i], *i, width),
            Row::Split(cells) => {
                let mut spans = Vec::new();
                for cell in cells {
                    let cell_spans = match cell {
                        Some(i) => ctx.item_line(&items[*i], *i, col_width).spans,
                        None => vec![Span::styled(
                            " ".repeat(col_width),
                            Style::default().bg(theme.background),
                        )],
                    };
                    spans.extend(cell_spans);
                }
                Line::from(spans)
            }
        })
        .collect();

    let paragraph = Paragraph::new(lines).style(Style::default().bg(theme.background));
    frame.render_widget(paragraph, area);
}

fn render_notice(frame: &mut Frame, theme: &Theme, area: Rect, msg: &str, fg: ratatui::style::Color) {
    let line = Line::from(Span::styled(
        msg.to_string(),
        Style::default().fg(fg).bg(theme.background),
    ));
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(theme.background)),
        area,
    );
}

/// Everything needed to draw a single item
struct RowContext<'a> {
    board: &'a Board,
    theme: &'a Theme,
    cursor: usize,
    tick: usize,
    in_progress: usize,
    completed: usize,
    group_sizes: Vec<(String, usize)>,
    filter: Option<regex::Regex>,
}

impl<'a> RowContext<'a> {
    fn new(board: &'a mut Board, theme: &'a Theme, cursor: &BoardCursor) -> Self {
        let (in_progress, completed, group_sizes) = {
            let view = board.view();
            (
                view.in_progress_count(),
                view.completed.len(),
                view.groups
                    .iter()
                    .map(|(name, tasks)| (name.clone(), tasks.len()))
                    .collect::<Vec<_>>(),
            )
        };
        let filter = filter_regex(board.applied_filter());
        RowContext {
            board,
            theme,
            cursor: cursor.cursor,
            tick: cursor.tick,
            in_progress,
            completed,
            group_sizes,
            filter,
        }
    }

    fn group_size(&self, category: &str) -> usize {
        self.group_sizes
            .iter()
            .find(|(name, _)| name == category)
            .map_or(0, |(_, n)| *n)
    }

    fn item_line(&self, item: &FlatItem, index: usize, width: usize) -> Line<'static> {
        let selected = index == self.cursor;
        let bg = if selected {
            self.theme.selection_bg
        } else {
            self.theme.background
        };
        let ui = self.board.ui();

        let mut spans: Vec<Span<'static>> = Vec::new();
        match item {
            FlatItem::Section(section) => {
                let open = ui.section_open(*section);
                let count = match section {
                    Section::InProgress => self.in_progress,
                    Section::Completed => self.completed,
                };
                let text = format!("{} {} ({})", fold_marker(open), section.label(), count);
                spans.push(Span::styled(
                    truncate_to_width(&text, width),
                    Style::default()
                        .fg(self.theme.text_bright)
                        .bg(bg)
                        .add_modifier(Modifier::BOLD),
                ));
            }
            FlatItem::Group(category) => {
                let open = ui.group_expanded(category);
                let text = format!(
                    "  {} {} ({})",
                    fold_marker(open),
                    category,
                    self.group_size(category)
                );
                spans.push(Span::styled(
                    truncate_to_width(&text, width),
                    Style::default().fg(self.theme.cyan).bg(bg),
                ));
            }
            FlatItem::Task(id) => {
                if let Some(task) = find_task(self.board.tasks(), id) {
                    self.task_spans(&mut spans, task, selected, bg, width);
                }
            }
        }

        let used: usize = spans.iter().map(|s| display_width(&s.content)).sum();
        if used < width {
            spans.push(Span::styled(
                " ".repeat(width - used),
                Style::default().bg(bg),
            ));
        }
        Line::from(spans)
    }

    fn task_spans(
        &self,
        spans: &mut Vec<Span<'static>>,
        task: &crate::model::task::Task,
        selected: bool,
        bg: ratatui::style::Color,
        width: usize,
    ) {
        let indent = if task.is_complete() { "  " } else { "    " };
        spans.push(Span::styled(indent, Style::default().bg(bg)));
        for (i, &done) in task.ticks.iter().enumerate() {
            let mut style = Style::default().fg(self.theme.tick_color(done)).bg(bg);
            if selected && i == self.tick {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(if done { "[x]" } else { "[ ]" }, style));
        }
        spans.push(Span::styled(" ", Style::default().bg(bg)));

        let used: usize = spans.iter().map(|s| display_width(&s.content)).sum();
        let name = truncate_to_width(&task.name, width.saturating_sub(used));
        let name_fg = if task.is_complete() {
            self.theme.dim
        } else if selected {
            self.theme.text_bright
        } else {
            self.theme.text
        };
        push_highlighted_spans(
            spans,
            &name,
            Style::default().fg(name_fg).bg(bg),
            Style::default()
                .fg(self.theme.search_match_fg)
                .bg(self.theme.search_match_bg),
            self.filter.as_ref(),
        );
    }
}

fn fold_marker(open: bool) -> &'static str {
    if open { "\u{25BE}" } else { "\u{25B8}" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::BoardConfig;
    use crate::tui::app::tests::{app_with, raw};
    use crate::tui::render::test_helpers::*;
    use insta::assert_snapshot;

    fn groceries() -> BoardConfig {
        BoardConfig {
            categories: true,
            ticks: 2,
            ..BoardConfig::named("Groceries")
        }
    }

    #[test]
    fn layout_deals_groups_into_columns() {
        let items = vec![
            FlatItem::Section(Section::InProgress),
            FlatItem::Group("A".into()),
            FlatItem::Task("1".into()),
            FlatItem::Group("B".into()),
            FlatItem::Task("2".into()),
            FlatItem::Task("3".into()),
            FlatItem::Section(Section::Completed),
            FlatItem::Task("4".into()),
        ];
        assert_eq!(
            layout_rows(&items, 2),
            vec![
                Row::Full(0),
                Row::Split(vec![Some(1), Some(3)]),
                Row::Split(vec![Some(2), Some(4)]),
                Row::Split(vec![None, Some(5)]),
                Row::Full(6),
                Row::Full(7),
            ]
        );
        assert_eq!(layout_rows(&items, 1).len(), items.len());
    }

    #[test]
    fn grouped_board() {
        let (mut app, _) = app_with(
            groceries(),
            vec![
                raw("m", "Milk", Some("Dairy"), &[true, false]),
                raw("b", "Bread", None, &[false, false]),
                raw("e", "Eggs", Some("Dairy"), &[true, true]),
            ],
        );
        let output = render_to_string(40, 10, |frame, area| {
            render_board_view(frame, &mut app, area);
        });
        assert_snapshot!(output, @r"
        ▾ In Progress (2)
          ▾ Ungrouped (1)
            [ ][ ] Bread
          ▾ Dairy (1)
            [x][ ] Milk
        ▾ Completed (1)
          [x][x] Eggs
        ");
    }

    #[test]
    fn two_columns() {
        let config = BoardConfig {
            columns: 2,
            ..groceries()
        };
        let (mut app, _) = app_with(
            config,
            vec![
                raw("m", "Milk", Some("Dairy"), &[false, false]),
                raw("b", "Bread", Some("Bakery"), &[false, false]),
            ],
        );
        let output = render_to_string(40, 10, |frame, area| {
            render_board_view(frame, &mut app, area);
        });
        assert_snapshot!(output, @r"
        ▾ In Progress (2)
          ▾ Bakery (1)        ▾ Dairy (1)
            [ ][ ] Bread        [ ][ ] Milk
        ");
    }

    #[test]
    fn collapsed_completed_section() {
        let (mut app, _) = app_with(groceries(), vec![raw("e", "Eggs", None, &[true, true])]);
        if let Some(board) = app.current_board_mut() {
            board.toggle_section(Section::Completed);
        }
        let output = render_to_string(40, 5, |frame, area| {
            render_board_view(frame, &mut app, area);
        });
        assert_eq!(output, "\u{25BE} In Progress (0)\n\u{25B8} Completed (1)");
    }

    #[test]
    fn empty_board() {
        let (mut app, _) = app_with(groceries(), vec![]);
        let output = render_to_string(40, 3, |frame, area| {
            render_board_view(frame, &mut app, area);
        });
        assert_eq!(output, " No tasks");
    }

    #[test]
    fn missing_entity_warns() {
        let (mut app, _) = app_with(groceries(), vec![]);
        if let Some(board) = app.current_board_mut() {
            board.receive(None, std::time::Instant::now());
        }
        let output = render_to_string(120, 3, |frame, area| {
            render_board_view(frame, &mut app, area);
        });
        assert!(output.starts_with(" Board \"Groceries\" not found"));
        assert!(output.contains("groceries.json"));
    }

    #[test]
    fn broken_board_shows_error() {
        let mut app = App::new(
            vec![BoardSlot::Broken {
                label: "board #1".into(),
                error: "board #1 has no name; every board needs a `name`".into(),
            }],
            crate::tui::theme::Theme::default(),
            std::path::PathBuf::from("/tmp"),
        );
        let output = render_to_string(80, 3, |frame, area| {
            render_board_view(frame, &mut app, area);
        });
        assert_eq!(
            output,
            " board #1: board #1 has no name; every board needs a `name`"
        );
    }
}

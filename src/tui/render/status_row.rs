use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::task_ops::find_task;
use crate::tui::app::{App, Mode};
use crate::util::unicode::{display_width, padding_for};

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let categories = app
        .current_board()
        .is_some_and(|b| b.settings().categories);

    let (mut spans, hint) = match app.mode {
        Mode::Navigate => {
            let spans = match &app.message {
                Some(msg) => vec![Span::styled(
                    msg.clone(),
                    Style::default().fg(app.theme.yellow).bg(bg),
                )],
                None => Vec::new(),
            };
            (spans, "a add  / filter  space tick  x delete  q quit")
        }
        Mode::AddName | Mode::AddCategory => {
            let mut spans = prompt_spans(app, "add: ", &app.name_input, app.mode == Mode::AddName);
            if categories {
                spans.extend(prompt_spans(
                    app,
                    "  category: ",
                    &app.category_input,
                    app.mode == Mode::AddCategory,
                ));
            }
            if let Some(msg) = &app.message {
                spans.push(Span::styled(
                    format!("  {}", msg),
                    Style::default().fg(app.theme.red).bg(bg),
                ));
            }
            let hint = if categories {
                "Enter add  Tab field  Esc keep draft"
            } else {
                "Enter add  Esc keep draft"
            };
            (spans, hint)
        }
        Mode::Filter => (
            prompt_spans(app, "/", &app.filter_input, true),
            "Enter apply  Esc close",
        ),
        Mode::ConfirmDelete => (
            vec![Span::styled(
                format!("delete \"{}\"? (y/n)", delete_label(app)),
                Style::default().fg(app.theme.red).bg(bg),
            )],
            "",
        ),
    };

    // Right-aligned key hint, dropped when it does not fit
    let content: String = spans.iter().map(|s| s.content.as_ref()).collect();
    let content_width = display_width(&content);
    let hint_width = display_width(hint);
    if !hint.is_empty() && content_width + hint_width + 1 < width {
        let padding = padding_for(&content, width - hint_width);
        spans.push(Span::styled(padding, Style::default().bg(bg)));
        spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn delete_label(app: &App) -> &str {
    let Some(id) = app.delete_target.as_deref() else {
        return "task";
    };
    app.current_board()
        .and_then(|b| find_task(b.tasks(), id))
        .map_or(id, |t| t.name.as_str())
}

/// `label` + text, with a block cursor when the field has focus
fn prompt_spans<'a>(app: &App, label: &'a str, text: &str, focused: bool) -> Vec<Span<'a>> {
    let bg = app.theme.background;
    let mut spans = vec![
        Span::styled(label, Style::default().fg(app.theme.purple).bg(bg)),
        Span::styled(
            text.to_string(),
            Style::default().fg(app.theme.text_bright).bg(bg),
        ),
    ];
    if focused {
        spans.push(Span::styled(
            "\u{258C}",
            Style::default().fg(app.theme.highlight).bg(bg),
        ));
    }
    spans
}

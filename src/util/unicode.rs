use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` down to `max_cells` terminal cells, ending with `…` when shortened.
/// Never splits a grapheme cluster.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if max_cells == 0 {
        return String::new();
    }
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 1 {
        return "\u{2026}".to_string();
    }
    let budget = max_cells - 1;
    let mut width = 0;
    let mut result = String::new();
    for grapheme in s.graphemes(true) {
        let gw = display_width(grapheme);
        if width + gw > budget {
            break;
        }
        width += gw;
        result.push_str(grapheme);
    }
    result.push('\u{2026}');
    result
}

/// Spaces needed to pad `s` out to `cells`
pub fn padding_for(s: &str, cells: usize) -> String {
    " ".repeat(cells.saturating_sub(display_width(s)))
}

/// Remove the last grapheme cluster (a backspace in a text prompt)
pub fn pop_grapheme(s: &mut String) {
    if let Some((start, _)) = s.grapheme_indices(true).next_back() {
        s.truncate(start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_of_wide_text() {
        assert_eq!(display_width("milk"), 4);
        assert_eq!(display_width("你好"), 4);
        assert_eq!(display_width("cafe\u{0301}"), 4);
    }

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate_to_width("Milk", 10), "Milk");
        assert_eq!(truncate_to_width("Milk", 0), "");
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate_to_width("Oat milk", 5), "Oat \u{2026}");
        assert_eq!(truncate_to_width("你好世界", 5), "你好\u{2026}");
        assert_eq!(truncate_to_width("Milk", 1), "\u{2026}");
    }

    #[test]
    fn padding_counts_cells() {
        assert_eq!(padding_for("你", 4), "  ");
        assert_eq!(padding_for("toolong", 3), "");
    }

    #[test]
    fn backspace_removes_whole_grapheme() {
        let mut s = String::from("cafe\u{0301}");
        pop_grapheme(&mut s);
        assert_eq!(s, "caf");
        let mut empty = String::new();
        pop_grapheme(&mut empty);
        assert_eq!(empty, "");
    }
}

//! UI helper functions and utilities

use crate::util::truncate_to_width;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Create a centered rect using up certain percentage of the available rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// The last `max_lines` lines of `text`, each cut to `width` columns. Tail,
/// not head, so the line being typed stays visible.
pub fn tail_preview(text: &str, max_lines: usize, width: usize) -> Vec<String> {
    if max_lines == 0 {
        return Vec::new();
    }
    let lines: Vec<&str> = text.split('\n').collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..]
        .iter()
        .map(|line| truncate_to_width(&line.replace('\t', "    "), width))
        .collect()
}

/// First visible row so that `selected` stays inside a window of `visible`
/// rows.
pub fn scroll_offset(selected: usize, visible: usize, len: usize) -> usize {
    if visible == 0 || len <= visible {
        return 0;
    }
    let max_offset = len - visible;
    selected.saturating_sub(visible - 1).min(max_offset)
}

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }

    let char_count = s.chars().count();
    if char_count <= max {
        return s.to_string();
    }

    if max <= 3 {
        return s.chars().take(max).collect();
    }

    let truncated: String = s.chars().take(max - 3).collect();
    format!("{}...", truncated)
}

/// Like [`truncate`] but counts terminal columns, so wide characters don't
/// overflow a cell.
pub fn truncate_to_width(s: &str, max_cols: usize) -> String {
    if s.width() <= max_cols {
        return s.to_string();
    }
    if max_cols <= 3 {
        return take_cols(s, max_cols);
    }
    format!("{}...", take_cols(s, max_cols - 3))
}

fn take_cols(s: &str, cols: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > cols {
            break;
        }
        used += w;
        out.push(c);
    }
    out
}

/// Pad with spaces to exactly `cols` columns, truncating if longer.
pub fn pad_to_width(s: &str, cols: usize) -> String {
    let cut = truncate_to_width(s, cols);
    let pad = cols.saturating_sub(cut.width());
    format!("{}{}", cut, " ".repeat(pad))
}

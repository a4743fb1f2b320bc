use crate::github::{format_size, EntryKind, RepositoryRef, TreeEntry};
use crate::ui::helpers::{centered_rect, scroll_offset};
use crate::ui::theme::Theme;
use crate::ui::App;
use crate::util::{pad_to_width, truncate_to_width};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub(super) fn render_help(frame: &mut Frame, scroll: usize) {
    let area = centered_rect(55, 80, frame.area());
    frame.render_widget(Clear, area);

    fn section_start(title: &str) -> Vec<Line<'static>> {
        vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("    ╭─ ".to_string(), Style::default().fg(Theme::GREY_600)),
                Span::styled(
                    title.to_string(),
                    Style::default()
                        .fg(Theme::WHITE)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    " ─────────────────────────╮".to_string(),
                    Style::default().fg(Theme::GREY_600),
                ),
            ]),
        ]
    }

    fn key_row(key: &str, desc: &str) -> Line<'static> {
        Line::from(vec![
            Span::styled("    │  ".to_string(), Style::default().fg(Theme::GREY_600)),
            Span::styled(format!(" {} ", key), Theme::key()),
            Span::styled(format!("  {}", desc), Style::default().fg(Theme::GREY_200)),
        ])
    }

    fn section_end() -> Line<'static> {
        Line::from(vec![Span::styled(
            "    ╰─────────────────────────────────────╯".to_string(),
            Style::default().fg(Theme::GREY_600),
        )])
    }

    let sections: [(&str, &[(&str, &str)]); 4] = [
        (
            "Workflows",
            &[
                ("1-4", "Switch workflow"),
                ("Tab", "Next workflow"),
                ("s", "Submit"),
                ("c", "Stop waiting for a result"),
            ],
        ),
        (
            "Form",
            &[
                ("↑↓", "Move between fields"),
                ("↵ / e", "Edit field"),
                ("←→", "Change a choice"),
                ("Esc", "Stop editing"),
                ("^U", "Clear field while editing"),
                ("PgUp/Dn", "Scroll result"),
            ],
        ),
        (
            "GitHub",
            &[
                ("l", "Log in"),
                ("L", "Log out"),
                ("g", "Pick a file from a repository"),
                ("x", "Drop the selected file"),
            ],
        ),
        ("General", &[("?", "Show help"), ("q", "Quit")]),
    ];

    let mut help_text: Vec<Line<'static>> = vec![Line::from("")];
    for (title, rows) in sections {
        help_text.extend(section_start(title));
        for (key, desc) in rows {
            help_text.push(key_row(key, desc));
        }
        help_text.push(section_end());
    }

    let max_lines = (area.height as usize).saturating_sub(2);
    let start = scroll.min(help_text.len().saturating_sub(max_lines));
    let visible = help_text[start..help_text.len().min(start + max_lines)].to_vec();

    let block = Paragraph::new(visible).block(
        Block::default()
            .title(" Help ")
            .title_style(Style::default().fg(Theme::GREY_100))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Theme::GREY_400))
            .style(Style::default().bg(Theme::GREY_900)),
    );

    frame.render_widget(block, area);
}

pub(super) fn render_picker(frame: &mut Frame, app: &App, selected: usize) {
    let area = centered_rect(70, 75, frame.area());
    frame.render_widget(Clear, area);

    let view = app.view();
    let nav = &view.navigation;

    let title = match nav.selected_repo() {
        Some(repo) if nav.path().is_empty() => format!(" {} ", repo.full_name),
        Some(repo) => format!(" {}/{} ", repo.full_name, nav.path()),
        None => " Repositories ".to_string(),
    };
    let block = Block::default()
        .title(Span::styled(title, Theme::title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Theme::GREY_400))
        .style(Style::default().bg(Theme::GREY_900));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1), // Listing
            Constraint::Length(1),
            Constraint::Length(1), // Hints
        ])
        .split(inner);

    let width = rows[1].width as usize;
    let height = rows[1].height as usize;

    let lines: Vec<Line> = if view.picker_loading() {
        let what = if view.file_loading {
            "Reading file…"
        } else if nav.selected_repo().is_some() {
            "Loading directory…"
        } else {
            "Loading repositories…"
        };
        vec![Line::from(vec![
            Span::styled(
                format!("  {} ", Theme::spinner(app.loading_frame)),
                Style::default().fg(Theme::YELLOW),
            ),
            Span::styled(what, Theme::text_muted()),
        ])]
    } else if nav.selected_repo().is_some() {
        let entries = nav.current_entries();
        if entries.is_empty() {
            vec![Line::from(Span::styled("  Empty directory", Theme::text_dim()))]
        } else {
            let offset = scroll_offset(selected, height, entries.len());
            entries
                .iter()
                .enumerate()
                .skip(offset)
                .take(height)
                .map(|(i, entry)| entry_line(entry, i == selected, width))
                .collect()
        }
    } else if view.repositories.is_empty() {
        vec![Line::from(Span::styled(
            "  No repositories · r to refresh",
            Theme::text_dim(),
        ))]
    } else {
        let offset = scroll_offset(selected, height, view.repositories.len());
        view.repositories
            .iter()
            .enumerate()
            .skip(offset)
            .take(height)
            .map(|(i, repo)| repo_line(repo, i == selected, width))
            .collect()
    };
    frame.render_widget(Paragraph::new(lines), rows[1]);

    let hint = if nav.selected_repo().is_some() {
        "  ↵ open   ⌫ up   r refresh   Esc close"
    } else {
        "  ↵ browse   r refresh   Esc close"
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(hint, Theme::text_dim()))),
        rows[3],
    );
}

fn row_style(selected: bool) -> Style {
    if selected {
        Theme::selected()
    } else {
        Theme::text()
    }
}

fn repo_line(repo: &RepositoryRef, selected: bool, width: usize) -> Line<'static> {
    let name_col = 32.min(width.saturating_sub(4));
    let mut spans = vec![
        Span::styled(format!(" {}", Theme::ICON_REPO), Theme::text_dim()),
        Span::styled(pad_to_width(&repo.full_name, name_col), row_style(selected)),
    ];
    if repo.is_private {
        spans.push(Span::styled(
            format!(" {} ", Theme::BADGE_PRIVATE),
            Style::default().fg(Theme::YELLOW),
        ));
    }
    if let Some(lang) = &repo.primary_language {
        spans.push(Span::styled(format!(" {} ", lang), Theme::text_muted()));
    }
    if let Some(description) = &repo.description {
        let used: usize = spans.iter().map(|s| s.width()).sum();
        let room = width.saturating_sub(used + 1);
        if room > 3 {
            spans.push(Span::styled(
                format!(" {}", truncate_to_width(description, room)),
                Theme::text_dim(),
            ));
        }
    }
    Line::from(spans)
}

fn entry_line(entry: &TreeEntry, selected: bool, width: usize) -> Line<'static> {
    let icon = match entry.kind {
        EntryKind::Directory => Theme::ICON_DIR,
        EntryKind::File => Theme::ICON_FILE,
        EntryKind::Other => Theme::ICON_OTHER,
    };
    let size = if entry.is_file() {
        format_size(entry.size)
    } else {
        String::new()
    };
    let name_col = width.saturating_sub(size.len() + 6);
    let name = if entry.is_dir() {
        format!("{}/", entry.name)
    } else {
        entry.name.clone()
    };
    let name_style = match entry.kind {
        EntryKind::Other if !selected => Theme::text_dim(),
        _ => row_style(selected),
    };
    Line::from(vec![
        Span::styled(format!(" {}", icon), Theme::text_dim()),
        Span::styled(pad_to_width(&name, name_col), name_style),
        Span::styled(format!(" {}", size), Theme::text_dim()),
    ])
}

pub(super) fn render_login(frame: &mut Frame, app: &App, input: &str) {
    let area = centered_rect(70, 50, frame.area());
    frame.render_widget(Clear, area);

    let view = app.view();
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Log in with GitHub",
            Style::default()
                .fg(Theme::WHITE)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    match &view.login_url {
        Some(url) => {
            lines.push(Line::from(Span::styled(
                "  Open this address in a browser (^O) and authorize:",
                Theme::text_muted(),
            )));
            lines.push(Line::from(Span::styled(format!("  {}", url), Theme::text())));
        }
        None => lines.push(Line::from(vec![
            Span::styled(
                format!("  {} ", Theme::spinner(app.loading_frame)),
                Style::default().fg(Theme::YELLOW),
            ),
            Span::styled("fetching authorization address…", Theme::text_muted()),
        ])),
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Then paste the address you were sent back to:",
        Theme::text_muted(),
    )));
    lines.push(Line::from(vec![
        Span::styled("  › ", Theme::text_dim()),
        Span::styled(input.to_string(), Theme::text()),
        Span::styled(Theme::CURSOR, Theme::border_active()),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  ↵ sign in   ^O open browser   ^U clear   Esc cancel",
        Theme::text_dim(),
    )));

    let block = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(" Login ")
            .title_style(Style::default().fg(Theme::GREY_100))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Theme::GREY_400))
            .style(Style::default().bg(Theme::GREY_900)),
    );
    frame.render_widget(block, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, kind: EntryKind, size: u64) -> TreeEntry {
        TreeEntry {
            name: name.into(),
            path: name.into(),
            kind,
            size,
        }
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_entry_line_marks_directories() {
        let line = entry_line(&entry("src", EntryKind::Directory, 0), false, 40);
        assert!(text(&line).contains("src/"));

        let line = entry_line(&entry("a.py", EntryKind::File, 2048), false, 40);
        let rendered = text(&line);
        assert!(rendered.contains("a.py"));
        assert!(rendered.contains(&format_size(2048)));
    }

    #[test]
    fn test_repo_line_shows_badge_and_language() {
        let repo: RepositoryRef = serde_json::from_str(
            r#"{"id": 1, "full_name": "alice/demo", "private": true, "language": "Python", "description": "demo repo"}"#,
        )
        .unwrap();
        let rendered = text(&repo_line(&repo, true, 80));
        assert!(rendered.contains("alice/demo"));
        assert!(rendered.contains(Theme::BADGE_PRIVATE));
        assert!(rendered.contains("Python"));
        assert!(rendered.contains("demo repo"));
    }
}

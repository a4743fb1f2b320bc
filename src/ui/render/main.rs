use crate::selector::CodeBuffer;
use crate::ui::helpers::tail_preview;
use crate::ui::theme::Theme;
use crate::ui::{App, InputMode};
use crate::workflow::FormField;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub(super) fn render_main(frame: &mut Frame, area: Rect, app: &App) {
    let padded = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(10),
            Constraint::Length(2),
        ])
        .split(area);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(45), // Form
            Constraint::Length(2),      // Gap
            Constraint::Percentage(55), // Result
        ])
        .split(padded[1]);

    render_form(frame, panels[0], app);
    render_result(frame, panels[2], app);
}

fn field_constraint(field: FormField) -> Constraint {
    match field {
        FormField::Language | FormField::TestType => Constraint::Length(3),
        FormField::Code | FormField::Idea => Constraint::Min(6),
        _ => Constraint::Length(5),
    }
}

fn render_form(frame: &mut Frame, area: Rect, app: &App) {
    let fields = app.view().tab.fields();
    let mut constraints: Vec<Constraint> = fields.iter().map(|f| field_constraint(*f)).collect();
    constraints.push(Constraint::Length(1)); // Submit line

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        render_field(frame, rows[i], app, *field, i == app.focus);
    }
    render_submit_line(frame, rows[fields.len()], app);
}

fn render_field(frame: &mut Frame, area: Rect, app: &App, field: FormField, focused: bool) {
    let editing = app.input_mode == InputMode::Editing(field);
    let mut title = format!(" {} ", field.label());
    if editing {
        title.push_str("· editing ");
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if focused {
            Theme::border_active()
        } else {
            Theme::border()
        })
        .title(Span::styled(
            title,
            if focused { Theme::title() } else { Theme::text_muted() },
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width as usize;
    let height = inner.height as usize;
    let forms = &app.view().forms;

    let lines: Vec<Line> = if field.choices().is_some() {
        vec![Line::from(vec![
            Span::styled("◂ ", Theme::text_dim()),
            Span::styled(forms.value(field).to_string(), Theme::text()),
            Span::styled(" ▸", Theme::text_dim()),
        ])]
    } else if field == FormField::Code {
        code_lines(&forms.code, width, height, editing)
    } else {
        text_lines(forms.value(field), width, height, editing)
    };

    frame.render_widget(Paragraph::new(lines), inner);
}

fn text_lines(text: &str, width: usize, height: usize, editing: bool) -> Vec<Line<'static>> {
    if text.is_empty() && !editing {
        return vec![Line::from(Span::styled("empty · ↵ to edit", Theme::text_dim()))];
    }
    let mut lines: Vec<Line> = tail_preview(text, height, width.saturating_sub(1))
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Theme::text())))
        .collect();
    if editing {
        if let Some(last) = lines.last_mut() {
            last.spans.push(Span::styled(Theme::CURSOR, Theme::border_active()));
        }
    }
    lines
}

fn code_lines(code: &CodeBuffer, width: usize, height: usize, editing: bool) -> Vec<Line<'static>> {
    match code {
        CodeBuffer::Remote { file, content } => {
            let mut lines = vec![Line::from(vec![
                Span::styled("⎇ ", Style::default().fg(Theme::GREEN)),
                Span::styled(
                    file.display(),
                    Style::default()
                        .fg(Theme::GREY_50)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {} lines · x to clear", content.lines().count()),
                    Theme::text_dim(),
                ),
            ])];
            lines.extend(
                tail_preview(content, height.saturating_sub(1), width)
                    .into_iter()
                    .map(|l| Line::from(Span::styled(l, Theme::text_muted()))),
            );
            lines
        }
        CodeBuffer::Inline(text) if text.is_empty() && !editing => vec![Line::from(
            Span::styled("paste code (↵) or pick a file from GitHub (g)", Theme::text_dim()),
        )],
        CodeBuffer::Inline(text) => text_lines(text, width, height, editing),
    }
}

fn render_submit_line(frame: &mut Frame, area: Rect, app: &App) {
    let view = app.view();
    let kind = view.tab;
    let line = if view.request.active {
        let running = view.request.kind.unwrap_or(kind);
        Line::from(vec![
            Span::styled(
                format!(" {} ", Theme::spinner(app.loading_frame)),
                Style::default().fg(Theme::YELLOW),
            ),
            Span::styled(format!("{} running · c to cancel", running.label()), Theme::text_muted()),
        ])
    } else if view.can_submit {
        Line::from(vec![
            Span::styled(" s ", Theme::key()),
            Span::styled(format!(" {}", kind.submit_label()), Theme::title()),
        ])
    } else {
        Line::from(vec![
            Span::styled(" s ", Style::default().fg(Theme::GREY_600).bg(Theme::GREY_800)),
            Span::styled(format!(" {}", kind.submit_label()), Theme::text_dim()),
        ])
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_result(frame: &mut Frame, area: Rect, app: &App) {
    let view = app.view();
    let request = &view.request;

    let title = match request.kind {
        Some(kind) if request.active || !request.result_text.is_empty() => {
            format!(" RESULT · {} ", kind.label())
        }
        _ => " RESULT ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border())
        .title(Span::styled(title, Theme::title()));

    let paragraph = if request.active {
        Paragraph::new(vec![
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    format!("  {} ", Theme::spinner(app.loading_frame)),
                    Style::default().fg(Theme::YELLOW),
                ),
                Span::styled("Working on it…", Theme::text()),
            ]),
            Line::from(Span::styled(
                "  Multi-agent runs often take a minute or three.",
                Theme::text_dim(),
            )),
        ])
    } else if request.result_text.is_empty() {
        Paragraph::new(Line::from(Span::styled(
            "  Fill in the form and press s.",
            Theme::text_dim(),
        )))
    } else {
        let style = if request.succeeded == Some(false) {
            Style::default().fg(Theme::RED)
        } else {
            Theme::text()
        };
        Paragraph::new(request.result_text.as_str())
            .style(style)
            .wrap(Wrap { trim: false })
            .scroll((app.result_scroll, 0))
    };

    frame.render_widget(paragraph.block(block), area);
}

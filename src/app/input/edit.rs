use crate::ui::{App, InputMode};
use crate::workflow::FormField;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Fields where Enter inserts a newline instead of finishing the edit
fn is_multiline(field: FormField) -> bool {
    matches!(field, FormField::Code | FormField::ErrorLogs | FormField::Idea)
}

fn replace_value(app: &mut App, field: FormField, value: String) {
    app.controller.edit_field(field, value);
    app.sync_view();
}

/// Handle key events while a form field is being typed into
pub(super) fn handle_edit_input(app: &mut App, field: FormField, key: KeyEvent) -> Result<()> {
    let current = app.view().forms.value(field).to_string();
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter if is_multiline(field) => replace_value(app, field, current + "\n"),
        KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Backspace => {
            let mut value = current;
            value.pop();
            replace_value(app, field, value);
        }
        KeyCode::Tab if field == FormField::Code => replace_value(app, field, current + "    "),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            replace_value(app, field, String::new())
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let mut value = current;
            value.push(c);
            replace_value(app, field, value);
        }
        _ => {}
    }
    Ok(())
}

pub(super) fn handle_edit_paste(app: &mut App, field: FormField, text: &str) {
    let pasted = if is_multiline(field) {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text.lines().collect::<Vec<_>>().join(" ")
    };
    let value = format!("{}{}", app.view().forms.value(field), pasted);
    replace_value(app, field, value);
}

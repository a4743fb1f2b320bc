//! TUI runtime
//!
//! # Error Handling
//!
//! Channel sends use `let _ =`; see `background.rs`. The terminal is restored
//! even when the loop fails, and the loop's error is returned afterwards.

use crate::app::messages::BackgroundMessage;
use crate::app::{background, input, RuntimeContext};
use crate::backend::Backend;
use crate::controller::Effect;
use crate::ui;
use crate::ui::App;
use anyhow::Result;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::sync::{mpsc, Arc};
use std::time::Duration;

/// Run the TUI until the user quits.
///
/// `initial` holds effects produced before the terminal came up, such as
/// resolving a restored session.
pub async fn run_tui(
    mut app: App,
    backend: Arc<dyn Backend>,
    open_browser: bool,
    initial: Vec<Effect>,
) -> Result<()> {
    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    let (tx, rx) = mpsc::channel::<BackgroundMessage>();
    let ctx = RuntimeContext {
        backend: &backend,
        tx: &tx,
        open_browser,
    };

    for effect in initial {
        tracing::debug!(effect = effect.name(), "starting initial effect");
        background::spawn_effect(&ctx, effect);
    }

    let result = run_loop(&mut terminal, &mut app, &rx, &ctx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    result
}

/// Main event loop with background message handling
fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: &mpsc::Receiver<BackgroundMessage>,
    ctx: &RuntimeContext,
) -> Result<()> {
    loop {
        app.clear_expired_toast();
        app.tick_loading();

        // Check for background messages (non-blocking)
        background::drain_messages(app, rx, ctx);

        terminal.draw(|f| ui::render(f, app))?;

        // Poll for events with fast timeout (snappy animations)
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key_event(app, key, ctx)?;
                }
                Event::Paste(text) => input::handle_paste(app, &text),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

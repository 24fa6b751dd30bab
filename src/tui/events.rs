use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, size as terminal_size, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io;
use std::time::{Duration, Instant};

use crate::models::View;
use crate::tui::app::Mode;
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::tui::App;

/// How long to wait for input before looping to re-check ticks and timeouts
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Guard that ensures terminal state is restored even on panic
/// If the terminal is left in raw mode or alternate screen, the user's
/// terminal will be unusable.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;

        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Restore terminal state on normal exit; the guard does nothing on drop afterwards
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Ignore errors in drop - we're already in a cleanup path
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Check terminal size before entering alternate screen so the error
    // lands in the normal terminal
    let (width, height) = terminal_size()?;
    let min_width_with_border = Layout::MIN_WIDTH + 2;
    let min_height_with_border = Layout::MIN_HEIGHT + 2;

    if width < min_width_with_border || height < min_height_with_border {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width_with_border, min_height_with_border
        )));
    }

    let mut guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    tracing::debug!(width, height, "terminal ready");

    loop {
        app.check_status_message_timeout();
        app.on_tick();

        let terminal_size = terminal.size()?;
        let terminal_rect = Rect::new(0, 0, terminal_size.width, terminal_size.height);
        terminal.draw(|f| {
            let layout = Layout::calculate(terminal_rect);
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        // Only process Press events to avoid duplicate processing on Windows
        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press && handle_key_event(&mut app, key_event)? {
                    break; // Quit requested
                }
            }
        }
    }

    guard.restore()?;
    tracing::info!("tui closed");
    Ok(())
}

/// Dispatch one key press. Returns true when the app should quit.
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if key_event.code == KeyCode::Char('c') && key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(true);
    }

    match app.ui.mode {
        Mode::Help => handle_help_mode(app, key_event),
        Mode::Form => handle_form_mode(app, key_event),
        Mode::Normal => handle_normal_mode(app, key_event),
    }
}

fn handle_help_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if key_event.code == KeyCode::Esc || app.keys.help.matches(&key_event) {
        app.exit_help_mode();
    }
    Ok(false)
}

fn handle_form_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if app.keys.next_field.matches(&key_event) {
        app.navigate_form_field(true);
        return Ok(false);
    }

    match key_event.code {
        KeyCode::Esc => app.exit_form_mode(),
        KeyCode::Enter => app.submit_form(),
        KeyCode::BackTab => app.navigate_form_field(false),
        KeyCode::Tab => app.navigate_form_field(true),
        KeyCode::Backspace => app.form.current_editor_mut().delete_char(),
        KeyCode::Delete => app.form.current_editor_mut().delete_forward(),
        KeyCode::Left => app.form.current_editor_mut().move_cursor_left(),
        KeyCode::Right => app.form.current_editor_mut().move_cursor_right(),
        KeyCode::Home => app.form.current_editor_mut().move_cursor_home(),
        KeyCode::End => app.form.current_editor_mut().move_cursor_end(),
        KeyCode::Char(ch) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            app.form.current_editor_mut().insert_char(ch);
        }
        _ => {}
    }
    Ok(false)
}

fn handle_normal_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if app.keys.quit.matches(&key_event) {
        return Ok(true);
    }
    if app.keys.help.matches(&key_event) {
        app.enter_help_mode();
        return Ok(false);
    }

    match app.view() {
        View::Build => handle_build_keys(app, key_event),
        View::Focus => handle_focus_keys(app, key_event),
        View::Review => handle_review_keys(app, key_event),
    }
    Ok(false)
}

fn handle_build_keys(app: &mut App, key_event: KeyEvent) {
    let keys = &app.keys;
    if keys.new.matches(&key_event) || key_event.code == KeyCode::Enter {
        app.enter_form_mode();
    } else if keys.list_up.matches(&key_event) || key_event.code == KeyCode::Up {
        app.move_selection_up();
    } else if keys.list_down.matches(&key_event) || key_event.code == KeyCode::Down {
        app.move_selection_down();
    } else if keys.delete.matches(&key_event) || key_event.code == KeyCode::Delete {
        app.delete_selected();
    } else if keys.reset.matches(&key_event) {
        app.request_reset(Instant::now());
    } else if keys.start.matches(&key_event) {
        app.start_day();
    }
}

fn handle_focus_keys(app: &mut App, key_event: KeyEvent) {
    if app.keys.edit.matches(&key_event) {
        app.edit_schedule();
    } else if app.keys.end_day.matches(&key_event) {
        app.finish_day();
    }
}

fn handle_review_keys(app: &mut App, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Left | KeyCode::Down | KeyCode::Char('-') | KeyCode::Char('h') => app.adjust_rating(-1),
        KeyCode::Right | KeyCode::Up | KeyCode::Char('+') | KeyCode::Char('l') => app.adjust_rating(1),
        KeyCode::Char('0') => app.set_rating(10),
        KeyCode::Char(d @ '1'..='9') => app.set_rating(d as u8 - b'0'),
        KeyCode::Enter => app.save_rating(),
        KeyCode::Esc => app.cancel_review(),
        _ => {}
    }
}

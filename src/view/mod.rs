//! Terminal demo host (impure shell)
//!
//! Owns the terminal, the event loop and input routing. Screen state lives in
//! [`DemoScreen`]; this module only feeds it events and frames.

pub mod cells;
pub mod constants;
pub mod screen;
pub mod styles;

pub use screen::{DemoScreen, OuterItem, TableView};
pub use styles::{ColorConfig, GridStyles};

use crate::config::{ConfigError, KeyAction, KeyBindings, ResolvedConfig};
use crate::demo::demo_tables;
use crate::error::SizeError;
use crate::grid::{DragDispatcher, Px};
use crate::logging::LoggingError;
use constants::{FRAME_INTERVAL, IDLE_POLL_INTERVAL, NUDGE_STEP, STATUS_BAR_HEIGHT, WHEEL_LINES};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Layout},
    text::Line,
    Terminal,
};
use std::io::{self, Stdout};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can end the demo.
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging could not be initialized
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// Size computation failed
    #[error("Size computation error: {0}")]
    Size(#[from] SizeError),

    /// Dimension summary could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Main demo application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: Backend,
{
    terminal: Terminal<B>,
    screen: DemoScreen,
    key_bindings: KeyBindings,
    drag: DragDispatcher,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Put the terminal in raw mode with alternate screen and mouse capture.
    pub fn new(screen: DemoScreen, config: &ResolvedConfig) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self::with_terminal(terminal, screen, config))
    }
}

impl<B> TuiApp<B>
where
    B: Backend,
{
    /// Wrap an already prepared terminal.
    pub fn with_terminal(
        terminal: Terminal<B>,
        screen: DemoScreen,
        config: &ResolvedConfig,
    ) -> Self {
        Self {
            terminal,
            screen,
            key_bindings: KeyBindings::default(),
            drag: DragDispatcher::new(config.drag_threshold),
        }
    }

    /// Screen state.
    pub fn screen(&self) -> &DemoScreen {
        &self.screen
    }

    /// Run the event loop until the user quits.
    ///
    /// Each iteration advances flings, draws, waits for input (briefly while
    /// something is moving), then runs one measurement burst.
    pub fn run(&mut self) -> Result<(), TuiError> {
        loop {
            let animating = self.screen.tick(Instant::now());
            self.draw()?;

            let measuring = self.screen.is_measuring();
            let timeout = if animating || measuring {
                FRAME_INTERVAL
            } else {
                IDLE_POLL_INTERVAL
            };

            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if self.handle_key(key) {
                            return Ok(());
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse, Instant::now()),
                    // Resize is picked up by the next draw
                    _ => {}
                }
            }

            if measuring {
                self.screen.advance_sizing();
            }
        }
    }

    /// Handle a key press. Returns true when the user asked to quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let Some(action) = self.key_bindings.get(key) else {
            return false;
        };
        debug!(?action, "Key action");

        match action {
            KeyAction::Quit => return true,
            KeyAction::ScrollUp => self.screen.scroll_outer(-1),
            KeyAction::ScrollDown => self.screen.scroll_outer(1),
            KeyAction::PageUp => {
                let page = self.screen.page_size();
                self.screen.scroll_outer(-page);
            }
            KeyAction::PageDown => {
                let page = self.screen.page_size();
                self.screen.scroll_outer(page);
            }
            KeyAction::ScrollToTop => self.screen.scroll_outer_to_top(),
            KeyAction::ScrollToBottom => self.screen.scroll_outer_to_bottom(),
            KeyAction::NudgeLeft => self.screen.nudge(-NUDGE_STEP),
            KeyAction::NudgeRight => self.screen.nudge(NUDGE_STEP),
        }
        false
    }

    /// Route a mouse event.
    ///
    /// Left-button press, drag and release go through the drag dispatcher;
    /// the vertical wheel scrolls the outer list and the horizontal wheel pans
    /// the grid under the pointer.
    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        let x = f32::from(mouse.column);
        let y = f32::from(mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag.pointer_down(x, y, self.screen.registry());
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.drag.pointer_move(x, now, self.screen.registry_mut());
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.drag.pointer_up(now, self.screen.registry_mut());
            }
            MouseEventKind::ScrollUp => self.screen.scroll_outer(-WHEEL_LINES),
            MouseEventKind::ScrollDown => self.screen.scroll_outer(WHEEL_LINES),
            MouseEventKind::ScrollLeft => {
                self.screen
                    .nudge_at(Px::from(mouse.column), Px::from(mouse.row), -NUDGE_STEP);
            }
            MouseEventKind::ScrollRight => {
                self.screen
                    .nudge_at(Px::from(mouse.column), Px::from(mouse.row), NUDGE_STEP);
            }
            _ => {}
        }
    }

    /// Render the current frame.
    fn draw(&mut self) -> Result<(), TuiError> {
        let screen = &mut self.screen;
        self.terminal.draw(|frame| {
            let [list, status] =
                Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_BAR_HEIGHT)])
                    .areas(frame.area());
            screen.render(list, frame.buffer_mut());
            let status_style = screen.styles().status;
            frame.render_widget(Line::styled(screen.status_line(), status_style), status);
        })?;
        Ok(())
    }
}

/// Run the demo on the real terminal.
///
/// Logging must be initialized by the caller. The terminal is restored even
/// when the loop fails.
pub fn run(config: &ResolvedConfig, styles: GridStyles) -> Result<(), TuiError> {
    let screen = DemoScreen::new(demo_tables(), config, styles);
    info!(tables = screen.tables().len(), "Starting demo");

    let result = TuiApp::new(screen, config).and_then(|mut app| app.run());
    restore_terminal()?;
    result
}

/// Restore terminal to normal state
///
/// Disables raw mode, mouse capture, and leaves alternate screen
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::TableData;
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::backend::TestBackend;
    use std::time::Duration;

    fn create_test_app() -> TuiApp<TestBackend> {
        let config = ResolvedConfig::default();
        let styles = GridStyles::with_color_config(ColorConfig::from_env_and_args(true));
        let mut screen = DemoScreen::new(
            vec![TableData::generate("A", 3, 20), TableData::generate("B", 30, 4)],
            &config,
            styles,
        );
        while screen.advance_sizing_for(Duration::ZERO) {}
        let terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        TuiApp::with_terminal(terminal, screen, &config)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn tui_error_from_io_error() {
        let tui_err: TuiError = io::Error::other("test error").into();
        assert!(matches!(tui_err, TuiError::Io(_)));
    }

    mod keys {
        use super::*;

        #[test]
        fn q_and_ctrl_c_quit() {
            let mut app = create_test_app();
            assert!(app.handle_key(key(KeyCode::Char('q'))));
            assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        }

        #[test]
        fn unbound_key_is_ignored() {
            let mut app = create_test_app();
            assert!(!app.handle_key(key(KeyCode::Char('z'))));
        }

        #[test]
        fn arrows_scroll_outer_list() {
            let mut app = create_test_app();
            app.draw().unwrap();
            app.handle_key(key(KeyCode::Down));
            app.handle_key(key(KeyCode::Down));
            assert_eq!(app.screen().outer_offset(), 2);
            app.handle_key(key(KeyCode::Up));
            assert_eq!(app.screen().outer_offset(), 1);
            app.handle_key(key(KeyCode::Home));
            assert_eq!(app.screen().outer_offset(), 0);
            app.handle_key(key(KeyCode::End));
            assert_eq!(app.screen().outer_offset(), app.screen().max_outer_offset());
        }

        #[test]
        fn right_arrow_pans_first_visible_grid() {
            let mut app = create_test_app();
            app.draw().unwrap();
            app.handle_key(key(KeyCode::Right));
            let offset = app.screen().registry().scroll("A").map(|s| s.offset());
            assert_eq!(offset, Some(NUDGE_STEP));
        }
    }

    mod mouse {
        use super::*;

        #[test]
        fn drag_pans_grid_under_pointer() {
            let mut app = create_test_app();
            app.draw().unwrap();
            let t0 = Instant::now();

            app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 30, 3), t0);
            app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 27, 3), t0);
            app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 20, 3), t0);

            // The event that crosses the threshold already applies its delta
            let offset = app.screen().registry().scroll("A").map(|s| s.offset());
            assert_eq!(offset, Some(10.0));
        }

        #[test]
        fn quick_release_starts_fling() {
            let mut app = create_test_app();
            app.draw().unwrap();
            let t0 = Instant::now();

            app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 30, 3), t0);
            app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 26, 3), t0);
            app.handle_mouse(
                mouse(MouseEventKind::Drag(MouseButton::Left), 22, 3),
                t0 + Duration::from_millis(10),
            );
            app.handle_mouse(
                mouse(MouseEventKind::Up(MouseButton::Left), 22, 3),
                t0 + Duration::from_millis(20),
            );

            assert!(app
                .screen()
                .registry()
                .scroll("A")
                .is_some_and(|s| s.is_flinging()));
        }

        #[test]
        fn wheel_scrolls_outer_list() {
            let mut app = create_test_app();
            app.draw().unwrap();
            app.handle_mouse(mouse(MouseEventKind::ScrollDown, 5, 5), Instant::now());
            assert_eq!(app.screen().outer_offset(), WHEEL_LINES);
        }
    }

    #[test]
    fn draw_renders_grid_and_status_bar() {
        let mut app = create_test_app();
        app.draw().unwrap();
        let buffer = app.terminal.backend().buffer();
        let status: String = (0..40)
            .filter_map(|x| buffer.cell((x, 11)).map(|c| c.symbol().to_owned()))
            .collect();
        assert!(status.contains("lazygrid"), "status bar: {status:?}");
        assert!(status.contains("ready"), "status bar: {status:?}");
    }
}

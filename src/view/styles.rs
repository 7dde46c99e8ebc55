//! Grid cell styling.
//!
//! Header row, sticky column, body cells and screen chrome each get their own
//! style; with colors disabled everything falls back to modifiers only.

use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Configuration for color output.
///
/// Priority (first match wins):
/// 1. `--no-color` flag (disables colors)
/// 2. `NO_COLOR` environment variable (any value disables colors)
/// 3. Default: colors enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Create a ColorConfig from the CLI flag and environment.
    pub fn from_env_and_args(no_color_flag: bool) -> Self {
        let enabled = !no_color_flag && std::env::var("NO_COLOR").is_err();
        Self { enabled }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

// ===== GridStyles =====

/// Styles for the demo screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridStyles {
    /// Row 0 cells.
    pub header: Style,
    /// Column 0 cells outside the header row.
    pub sticky_column: Style,
    /// Every other cell.
    pub body: Style,
    /// Divider drawn on the right edge of column 0.
    pub divider: Style,
    /// Heading and trailer lines of the outer list.
    pub label: Style,
    /// "Measuring" and failure placeholders.
    pub placeholder: Style,
    /// Bottom status bar.
    pub status: Style,
}

impl GridStyles {
    /// Styles for the given color configuration.
    pub fn with_color_config(config: ColorConfig) -> Self {
        if config.colors_enabled() {
            Self {
                header: Style::default()
                    .fg(Color::Black)
                    .bg(Color::Gray)
                    .add_modifier(Modifier::BOLD),
                sticky_column: Style::default().fg(Color::White).bg(Color::DarkGray),
                body: Style::default(),
                divider: Style::default().fg(Color::White).bg(Color::DarkGray),
                label: Style::default().fg(Color::Cyan),
                placeholder: Style::default().fg(Color::Yellow),
                status: Style::default().fg(Color::Black).bg(Color::Cyan),
            }
        } else {
            Self {
                header: Style::default().add_modifier(Modifier::REVERSED),
                sticky_column: Style::default().add_modifier(Modifier::BOLD),
                body: Style::default(),
                divider: Style::default(),
                label: Style::default(),
                placeholder: Style::default().add_modifier(Modifier::ITALIC),
                status: Style::default().add_modifier(Modifier::REVERSED),
            }
        }
    }

    /// Style for the cell at `(row, col)`.
    pub fn for_cell(&self, row: usize, col: usize) -> Style {
        match (row, col) {
            (0, _) => self.header,
            (_, 0) => self.sticky_column,
            _ => self.body,
        }
    }
}

impl Default for GridStyles {
    fn default() -> Self {
        Self::with_color_config(ColorConfig::from_env_and_args(false))
    }
}

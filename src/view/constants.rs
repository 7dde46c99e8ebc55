//! Layout and timing constants for the demo screen.
//!
//! One terminal cell is one pixel of grid geometry.

use crate::grid::Px;
use std::time::Duration;

/// Height of the status bar in lines.
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Height of a heading or trailer item in the outer list.
pub const LABEL_HEIGHT: Px = 1;

/// Height of the placeholder shown while a table is being measured.
pub const PLACEHOLDER_HEIGHT: Px = 1;

/// Blank columns left of each grid, outside its scroll range.
pub const GRID_PAD_START: Px = 2;

/// Blank columns after the last grid column, inside its scroll range.
pub const GRID_PAD_END: Px = 2;

/// Lines scrolled per wheel notch.
pub const WHEEL_LINES: Px = 3;

/// Columns moved per nudge key or horizontal wheel notch.
pub const NUDGE_STEP: f32 = 8.0;

/// Event poll timeout while a fling runs or tables are being measured.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Event poll timeout when nothing is animating.
pub const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(250);

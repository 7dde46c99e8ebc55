//! Property-based tests for horizontal scroll physics.
//!
//! Properties Under Test:
//! - no sequence of drag deltas, layout changes or flings moves the offset
//!   outside `[0, max_offset]`
//! - a fling moves in one direction only and comes to rest in finite time

use lazygrid::grid::scroll::{FlingConfig, ScrollState};
use lazygrid::grid::Px;
use proptest::prelude::*;
use std::time::{Duration, Instant};

// ===== Arbitrary Strategies =====

/// One input to a scroll state.
#[derive(Debug, Clone)]
enum ScrollInput {
    Drag(f32),
    Wait(u64),
    Release,
    Layout(Px, Px),
    Nudge(f32),
}

fn arb_input() -> impl Strategy<Value = ScrollInput> {
    prop_oneof![
        4 => (-200.0..200.0f32).prop_map(ScrollInput::Drag),
        2 => (0..400u64).prop_map(ScrollInput::Wait),
        1 => Just(ScrollInput::Release),
        1 => (0..2000i32, 0..500i32).prop_map(|(c, v)| ScrollInput::Layout(c, v)),
        1 => (-100.0..100.0f32).prop_map(ScrollInput::Nudge),
    ]
}

fn arb_config() -> impl Strategy<Value = FlingConfig> {
    (1.0..200.0f32, 0.1..5.0f32).prop_map(|(velocity_multiplier, friction_multiplier)| {
        FlingConfig {
            velocity_multiplier,
            friction_multiplier,
            ..FlingConfig::default()
        }
    })
}

fn in_bounds(scroll: &ScrollState) -> bool {
    scroll.offset() >= 0.0 && scroll.offset() <= scroll.max_offset() as f32
}

proptest! {
    #[test]
    fn offset_stays_within_bounds(
        config in arb_config(),
        content in 0..2000i32,
        viewport in 0..500i32,
        inputs in prop::collection::vec(arb_input(), 1..60),
    ) {
        let mut scroll = ScrollState::new(config);
        scroll.update_layout(content, viewport);
        let mut now = Instant::now();

        for input in inputs {
            match input {
                ScrollInput::Drag(delta) => {
                    scroll.consume_delta(delta, now);
                }
                ScrollInput::Wait(ms) => {
                    now += Duration::from_millis(ms);
                    scroll.tick(now);
                }
                ScrollInput::Release => {
                    scroll.release(now);
                }
                ScrollInput::Layout(c, v) => scroll.update_layout(c, v),
                ScrollInput::Nudge(delta) => scroll.scroll_by(delta),
            }
            prop_assert!(
                in_bounds(&scroll),
                "offset {} outside [0, {}]",
                scroll.offset(),
                scroll.max_offset()
            );
        }
    }

    #[test]
    fn consumed_movement_never_exceeds_delta(
        start in 0.0..1000.0f32,
        delta in -500.0..500.0f32,
    ) {
        let mut scroll = ScrollState::new(FlingConfig::default());
        scroll.update_layout(1500, 500);
        scroll.scroll_by(start);

        let consumed = scroll.consume_delta(delta, Instant::now());
        prop_assert!(consumed.abs() <= delta.abs() + 0.01);
        prop_assert!(in_bounds(&scroll));
    }

    #[test]
    fn fling_is_monotonic_and_terminates(
        config in arb_config(),
        start in 0.0..10_000.0f32,
        delta in prop_oneof![-80.0..-2.0f32, 2.0..80.0f32],
    ) {
        let mut scroll = ScrollState::new(config);
        scroll.update_layout(20_000, 100);
        scroll.scroll_by(start);

        let t0 = Instant::now();
        scroll.consume_delta(delta, t0);
        prop_assume!(scroll.release(t0 + Duration::from_millis(5)));

        // Dragging right moves content right, so the offset decreases
        let direction = -delta.signum();
        let mut previous = scroll.offset();
        let mut now = t0 + Duration::from_millis(5);
        let mut steps = 0;
        while scroll.tick(now) {
            let current = scroll.offset();
            prop_assert!(
                (current - previous) * direction >= -0.001,
                "fling reversed from {} to {}",
                previous,
                current
            );
            prop_assert!(in_bounds(&scroll));
            previous = current;
            now += Duration::from_millis(16);
            steps += 1;
            prop_assert!(steps < 100_000, "fling did not come to rest");
        }
        prop_assert!(!scroll.is_flinging());
    }
}

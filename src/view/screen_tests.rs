//! Tests for the demo screen state.

use super::*;
use crate::grid::registry::Bounds;
use crate::view::styles::ColorConfig;

fn screen_with(tables: Vec<TableData>) -> DemoScreen {
    let styles = GridStyles::with_color_config(ColorConfig::from_env_and_args(true));
    DemoScreen::new(tables, &ResolvedConfig::default(), styles)
}

fn measured(tables: Vec<TableData>) -> DemoScreen {
    let mut screen = screen_with(tables);
    while screen.advance_sizing_for(Duration::ZERO) {}
    screen
}

fn row_text(buf: &Buffer, y: u16) -> String {
    (buf.area.left()..buf.area.right())
        .filter_map(|x| buf.cell((x, y)).map(|c| c.symbol().to_owned()))
        .collect()
}

fn table_a() -> TableData {
    // Widths [8, 12, 8, 8, 8, 8], heights [2, 3, 3, 3]
    TableData::generate("A", 3, 6)
}

fn table_b() -> TableData {
    // Widths [8, 12, 8, 8], heights [2, 3, 3]
    TableData::generate("B", 2, 4)
}

mod sizing {
    use super::*;

    #[test]
    fn tables_are_measured_in_order() {
        let mut screen = screen_with(vec![table_a(), table_b()]);
        assert!(screen.is_measuring());

        while screen.tables()[0].is_measuring() {
            assert!(screen.advance_sizing_for(Duration::ZERO));
            assert!(screen.tables()[1].progress() == 0.0);
        }
        while screen.advance_sizing_for(Duration::ZERO) {}

        assert!(!screen.is_measuring());
        assert!(screen.tables().iter().all(|t| t.dimensions().is_some()));
    }

    #[test]
    fn measured_dimensions_follow_text_width() {
        let screen = measured(vec![table_a()]);
        let dims = screen.tables()[0].dimensions().unwrap();
        assert_eq!(dims.col_sizes(), &[8, 12, 8, 8, 8, 8]);
        assert_eq!(dims.row_sizes(), &[2, 3, 3, 3]);
    }

    #[test]
    fn status_line_reports_progress() {
        let mut screen = screen_with(vec![table_a()]);
        assert!(screen.status_line().contains("measuring A 0%"));
        while screen.advance_sizing_for(Duration::ZERO) {}
        assert!(screen.status_line().contains("ready"));
    }

    #[test]
    fn nothing_to_do_without_tables() {
        let mut screen = screen_with(Vec::new());
        assert!(!screen.advance_sizing_for(Duration::ZERO));
        assert_eq!(screen.content_height(), 0);
    }
}

mod outer_list {
    use super::*;

    #[test]
    fn placeholder_occupies_one_line_until_measured() {
        let screen = screen_with(vec![table_a()]);
        assert_eq!(screen.content_height(), 3);

        let screen = measured(vec![table_a()]);
        assert_eq!(screen.content_height(), 1 + 11 + 1);
    }

    #[test]
    fn scrolling_is_clamped() {
        let mut screen = measured(vec![table_a()]);
        screen.set_list_height(5);
        screen.scroll_outer(100);
        assert_eq!(screen.outer_offset(), 8);
        screen.scroll_outer(-100);
        assert_eq!(screen.outer_offset(), 0);
        screen.scroll_outer_to_bottom();
        assert_eq!(screen.outer_offset(), 8);
        screen.scroll_outer_to_top();
        assert_eq!(screen.outer_offset(), 0);
    }

    #[test]
    fn geometry_reports_first_visible_item_and_its_scroll() {
        let mut screen = measured(vec![table_a()]);
        screen.set_list_height(5);
        screen.scroll_outer(3);

        let geometry = screen.geometry();
        assert_eq!(geometry.viewport_height, 5);
        assert_eq!(geometry.first_visible_index, 1);
        assert_eq!(geometry.first_visible_scroll_offset, 2);
        assert_eq!(
            geometry.visible_items,
            vec![ListItem {
                index: 1,
                offset: -2,
                size: 11
            }]
        );
    }

    #[test]
    fn item_kinds_repeat_per_table() {
        assert_eq!(OuterItem::at(0), OuterItem::Heading(0));
        assert_eq!(OuterItem::at(4), OuterItem::Grid(1));
        assert_eq!(OuterItem::at(5), OuterItem::Trailer(1));
    }
}

mod rendering {
    use super::*;

    fn render(screen: &mut DemoScreen, width: u16, height: u16) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        screen.render(area, &mut buf);
        buf
    }

    #[test]
    fn placeholder_is_drawn_while_measuring() {
        let mut screen = screen_with(vec![table_a()]);
        let buf = render(&mut screen, 40, 6);
        assert!(row_text(&buf, 0).contains("[A]"));
        assert!(row_text(&buf, 1).contains("measuring"));
        assert!(row_text(&buf, 2).contains("end of table A"));
        assert_eq!(screen.registry().bounds("A"), None);
    }

    #[test]
    fn measured_grid_records_bounds() {
        let mut screen = measured(vec![table_a()]);
        render(&mut screen, 40, 8);
        assert_eq!(screen.registry().bounds("A"), Some(Bounds::new(2, 1, 38, 11)));
        let scroll = screen.registry().scroll("A").unwrap();
        assert_eq!(scroll.content(), 52 + GRID_PAD_END);
        assert_eq!(scroll.viewport(), 38);
    }

    #[test]
    fn header_row_sticks_to_viewport_top() {
        let mut screen = measured(vec![table_a()]);
        screen.set_list_height(8);
        screen.scroll_outer(3);
        let buf = render(&mut screen, 40, 8);
        // Header of column 0 spans x 2..10; "見出し" is centered at x 3
        assert_eq!(buf.cell((3, 0)).map(|c| c.symbol()), Some("見"));
    }

    #[test]
    fn first_column_sticks_while_panning() {
        let mut screen = measured(vec![table_a()]);
        let before = render(&mut screen, 40, 8);
        // Row 1 starts at grid top 1 + header height 2
        assert_eq!(before.cell((5, 3)).map(|c| c.symbol()), Some("1"));

        screen.nudge(10.0);
        assert_eq!(screen.registry().scroll("A").map(|s| s.offset()), Some(10.0));
        let after = render(&mut screen, 40, 8);
        assert_eq!(after.cell((5, 3)).map(|c| c.symbol()), Some("1"));
        assert_eq!(after.cell((9, 3)).map(|c| c.symbol()), Some("│"));
    }

    #[test]
    fn grid_scrolled_away_loses_bounds() {
        let mut screen = measured(vec![table_a(), table_b()]);
        render(&mut screen, 40, 8);
        assert!(screen.registry().bounds("A").is_some());

        screen.scroll_outer_to_bottom();
        render(&mut screen, 40, 8);
        assert_eq!(screen.registry().bounds("A"), None);
        assert!(screen.registry().bounds("B").is_some());
        assert_eq!(screen.first_visible_grid(), Some("B"));
    }

    #[test]
    fn nudge_at_pans_grid_under_pointer() {
        let mut screen = measured(vec![table_a()]);
        render(&mut screen, 40, 8);
        screen.nudge_at(20, 4, 6.0);
        assert_eq!(screen.registry().scroll("A").map(|s| s.offset()), Some(6.0));
        screen.nudge_at(20, 0, 6.0);
        assert_eq!(screen.registry().scroll("A").map(|s| s.offset()), Some(6.0));
    }

    #[test]
    fn cells_are_reused_when_panning_back() {
        let mut screen = measured(vec![table_a()]);
        render(&mut screen, 20, 8);
        let created = screen.tables()[0].renderer().stats().created;

        screen.nudge(30.0);
        render(&mut screen, 20, 8);
        screen.nudge(-30.0);
        render(&mut screen, 20, 8);

        let stats = screen.tables()[0].renderer().stats();
        assert!(stats.reused > 0, "Expected pool reuse, got {:?}", stats);
        assert!(stats.created > created);
    }
}

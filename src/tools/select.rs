use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use floorplan_session::KeyValueStore;

use super::handle_motion;
use crate::app::App;

/// Handle mouse events when no placement tool is armed
pub fn handle_select_event<S: KeyValueStore>(app: &mut App<S>, event: MouseEvent) {
    if handle_motion(app, event) {
        return;
    }
    let (p, inside) = app.canvas_point(event.column, event.row);
    match event.kind {
        // Press on an element starts a drag, on its handle a resize
        MouseEventKind::Down(MouseButton::Left) if inside => app.pointer_down(p),
        // Moves and releases are followed anywhere on screen so elements can
        // be dragged off the canvas
        MouseEventKind::Drag(MouseButton::Left) => app.pointer_move(p, inside),
        MouseEventKind::Up(MouseButton::Left) => app.pointer_up(p),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use floorplan_core::Tool;
    use floorplan_geometry::Point;

    use crate::tools::tests::{app, drag, press, release};

    #[test]
    fn drag_off_canvas_deletes() {
        let mut app = app();
        app.arm_tool(Tool::Zone);
        press(&mut app, 12, 6);
        release(&mut app, 12, 6);
        assert_eq!(app.editor.elements().len(), 1);
        app.escape();

        press(&mut app, 12, 6);
        // Column 39 is still on screen but right of the 200px canvas
        drag(&mut app, 39, 6);
        assert!(app.editor.drag_out_of_bounds());
        release(&mut app, 39, 6);
        assert!(app.editor.elements().is_empty());
        assert!(app.store.load_elements().is_empty());
    }

    #[test]
    fn drag_across_canvas_edge_and_back_keeps_element() {
        let mut app = app();
        app.arm_tool(Tool::Zone);
        press(&mut app, 12, 6);
        app.escape();
        // 50x50 zone at (75, 79), grabbed 25px from its left edge
        press(&mut app, 12, 6);

        drag(&mut app, 20, 6);
        assert_eq!(app.editor.elements()[0].origin(), Point::new(139.0, 79.0));
        assert!(!app.editor.drag_out_of_bounds());

        // Pointer at x=212 is off the canvas, the zone still overlaps it
        drag(&mut app, 26, 6);
        assert!(!app.pointer_inside);
        assert_eq!(app.editor.elements()[0].origin(), Point::new(187.0, 79.0));
        assert!(!app.editor.drag_out_of_bounds());

        drag(&mut app, 30, 6);
        assert_eq!(app.editor.elements()[0].origin(), Point::new(219.0, 79.0));
        assert!(app.editor.drag_out_of_bounds());

        drag(&mut app, 24, 6);
        assert!(!app.editor.drag_out_of_bounds());
        release(&mut app, 24, 6);

        assert_eq!(app.editor.elements().len(), 1);
        let saved = app.store.load_elements();
        assert_eq!(saved[0].origin(), Point::new(171.0, 79.0));
        assert_eq!(app.editor.selected_id(), None);
    }

    #[test]
    fn click_without_tool_selects() {
        let mut app = app();
        app.arm_tool(Tool::Barrier);
        press(&mut app, 12, 6);
        app.escape();

        press(&mut app, 12, 6);
        release(&mut app, 12, 6);
        assert_eq!(app.editor.selected_id(), Some(app.editor.elements()[0].id));

        press(&mut app, 2, 2);
        assert_eq!(app.editor.selected_id(), None);
    }
}

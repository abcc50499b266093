use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use floorplan_session::KeyValueStore;

use super::handle_motion;
use crate::app::App;

/// Handle mouse events while a placement tool is armed.
///
/// Placement completes on press; a held button only moves the ghost and the
/// release has nothing left to finish.
pub fn handle_place_event<S: KeyValueStore>(app: &mut App<S>, event: MouseEvent) {
    if handle_motion(app, event) {
        return;
    }
    let (p, inside) = app.canvas_point(event.column, event.row);
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) if inside => app.pointer_down(p),
        MouseEventKind::Drag(MouseButton::Left) => app.pointer_move(p, inside),
        _ => {}
    }
}

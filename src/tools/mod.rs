//! Mouse routing from the terminal to the editor.
//!
//! With a placement tool armed, presses place elements; otherwise they
//! select, drag and resize. A press that started a drag or resize keeps its
//! events until release, even if a tool is armed meanwhile. Pointer motion is
//! shared by both.

mod place;
mod select;

use crossterm::event::{MouseEvent, MouseEventKind};
use floorplan_session::KeyValueStore;

use crate::app::App;

pub use place::handle_place_event;
pub use select::handle_select_event;

/// Dispatch a mouse event to the active tool
pub fn handle_mouse_event<S: KeyValueStore>(app: &mut App<S>, event: MouseEvent) {
    if app.editor.tool().is_some() && !app.editor.captures_pointer() {
        handle_place_event(app, event);
    } else {
        handle_select_event(app, event);
    }
}

/// Plain pointer motion: hover, ghost, and enter/leave tracking
fn handle_motion<S: KeyValueStore>(app: &mut App<S>, event: MouseEvent) -> bool {
    match event.kind {
        MouseEventKind::Moved => {
            let (p, inside) = app.canvas_point(event.column, event.row);
            app.pointer_move(p, inside);
            true
        }
        _ => false,
    }
}

use floorplan_core::{ElementField, Tool};
use floorplan_geometry::{Point, Size, Viewport};
use floorplan_session::{FileStore, FloorplanStore, KeyValueStore};
use ratatui::layout::Rect as Area;
use tracing::{info, warn};

use crate::editor::{Change, Editor, EditorConfig, Key};

/// Application mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Typing a new value for a property-panel field
    FieldInput { field: ElementField, text: String },
}

/// Main application state
pub struct App<S: KeyValueStore = FileStore> {
    pub editor: Editor,
    pub store: FloorplanStore<S>,
    pub viewport: Viewport,
    /// Screen area the canvas occupies
    pub canvas_area: Area,
    /// Canvas size pinned by settings or CLI; follows the terminal otherwise
    fixed_canvas: Option<Size>,
    pub mode: Mode,
    /// Property-panel field under the cursor
    pub field_index: usize,
    /// Whether the pointer was over the canvas on the last mouse event
    pub pointer_inside: bool,
    pub running: bool,
    pub status_message: Option<String>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(store: FloorplanStore<S>, viewport: Viewport, fixed_canvas: Option<Size>) -> Self {
        let config = EditorConfig {
            canvas: fixed_canvas.unwrap_or_else(|| viewport.canvas_size()),
        };
        let mut editor = Editor::new(config, store.load_catalog());
        editor.load(store.load_elements());
        info!(
            elements = editor.elements().len(),
            table_types = editor.catalog().len(),
            "Floor plan loaded"
        );

        Self {
            editor,
            store,
            viewport,
            canvas_area: Area::new(0, 0, viewport.width, viewport.height),
            fixed_canvas,
            mode: Mode::Normal,
            field_index: 0,
            pointer_inside: false,
            running: true,
            status_message: None,
        }
    }

    /// Track the screen area the canvas is drawn in
    pub fn set_canvas_area(&mut self, area: Area) {
        self.canvas_area = area;
        self.viewport.resize(area.width, area.height);
        if self.fixed_canvas.is_none() {
            self.editor.set_canvas_size(self.viewport.canvas_size());
        }
    }

    /// Canvas point under a screen cell, and whether the cell is on the canvas
    pub fn canvas_point(&self, column: u16, row: u16) -> (Point, bool) {
        let area = self.canvas_area;
        let col = column as i32 - area.x as i32;
        let row = row as i32 - area.y as i32;
        let p = self.viewport.cell_to_canvas(col, row);
        let on_area = col >= 0 && row >= 0 && col < area.width as i32 && row < area.height as i32;
        let canvas = self.editor.canvas_size();
        let inside = on_area && p.x <= canvas.width && p.y <= canvas.height;
        (p, inside)
    }

    /// Persist the element list after the editor reports changes, and
    /// close the panel once nothing is selected (a miss clears the
    /// selection without changing any element).
    ///
    /// Save failures are logged and shown; the editor keeps its state.
    pub fn apply(&mut self, changes: Vec<Change>) {
        if self.editor.selected_id().is_none() {
            self.close_panel();
        }
        if changes.is_empty() {
            return;
        }
        if let Err(e) = self.store.save_elements(self.editor.elements()) {
            warn!(error = %e, "Failed to save elements");
            self.set_status(format!("Save error: {}", e));
        }
    }

    // --- Pointer input ---

    pub fn pointer_down(&mut self, p: Point) {
        let changes = self.editor.pointer_down(p);
        self.apply(changes);
    }

    pub fn pointer_move(&mut self, p: Point, inside: bool) {
        if inside && !self.pointer_inside {
            self.editor.pointer_enter(p);
        }
        self.pointer_inside = inside;
        // Drags and resizes keep following the pointer off the canvas
        if inside || self.editor.captures_pointer() {
            self.editor.pointer_move(p);
        } else {
            self.editor.pointer_leave();
        }
    }

    pub fn pointer_up(&mut self, p: Point) {
        let before = self.editor.selected_id();
        let changes = self.editor.pointer_up(p);
        self.apply(changes);
        if self.editor.selected_id() != before {
            self.field_index = 0;
            self.mode = Mode::Normal;
        }
    }

    // --- Toolbar ---

    pub fn arm_tool(&mut self, tool: Tool) {
        self.set_status(format!("{} tool: click to place", tool.name()));
        self.editor.arm_tool(tool);
    }

    /// Arm the table type in catalog slot `slot` (1-based, as shown)
    pub fn arm_catalog_slot(&mut self, slot: usize) {
        let entry = slot
            .checked_sub(1)
            .and_then(|i| self.editor.catalog().as_slice().get(i))
            .map(|t| (t.id.clone(), t.label.clone()));
        match entry {
            Some((id, label)) => {
                self.editor.arm_tool(Tool::TableType(id));
                self.set_status(format!("{}: click to place", label));
            }
            None => self.set_status(format!("No table type in slot {}", slot)),
        }
    }

    /// Escape cancels field input first, then disarms the tool
    pub fn escape(&mut self) {
        if matches!(self.mode, Mode::FieldInput { .. }) {
            self.mode = Mode::Normal;
            return;
        }
        self.editor.key_down(Key::Escape);
    }

    // --- Property panel ---

    /// Fields shown for the edit-selected element
    pub fn panel_fields(&self) -> &'static [ElementField] {
        self.editor
            .selected()
            .map(|e| ElementField::for_kind(&e.kind))
            .unwrap_or(&[])
    }

    pub fn current_field(&self) -> Option<ElementField> {
        let fields = self.panel_fields();
        fields.get(self.field_index.min(fields.len().saturating_sub(1))).copied()
    }

    pub fn next_field(&mut self) {
        let len = self.panel_fields().len();
        if len > 0 {
            self.field_index = (self.field_index + 1) % len;
        }
    }

    pub fn prev_field(&mut self) {
        let len = self.panel_fields().len();
        if len > 0 {
            self.field_index = (self.field_index + len - 1) % len;
        }
    }

    /// Start typing a replacement value for the current field
    pub fn start_field_input(&mut self) -> bool {
        let Some(field) = self.current_field() else {
            return false;
        };
        let text = self
            .editor
            .selected()
            .and_then(|e| field.read(e))
            .unwrap_or_default();
        self.mode = Mode::FieldInput { field, text };
        true
    }

    pub fn add_input_char(&mut self, c: char) {
        if let Mode::FieldInput { text, .. } = &mut self.mode {
            text.push(c);
        }
    }

    pub fn backspace_input(&mut self) {
        if let Mode::FieldInput { text, .. } = &mut self.mode {
            text.pop();
        }
    }

    pub fn commit_field_input(&mut self) {
        if let Mode::FieldInput { field, text } = std::mem::replace(&mut self.mode, Mode::Normal) {
            let changes = self.editor.edit_field(field, &text);
            self.apply(changes);
        }
    }

    /// Cycle a table's shape without typing
    pub fn cycle_shape(&mut self) {
        let next = self
            .editor
            .selected()
            .and_then(|e| ElementField::Shape.read(e))
            .and_then(|s| s.parse::<floorplan_core::TableShape>().ok())
            .map(|s| s.next());
        if let Some(shape) = next {
            let changes = self.editor.edit_field(ElementField::Shape, shape.name());
            self.apply(changes);
        }
    }

    pub fn delete_selected(&mut self) {
        let changes = self.editor.delete_selected();
        if !changes.is_empty() {
            self.set_status("Element deleted");
        }
        self.apply(changes);
    }

    fn close_panel(&mut self) {
        self.field_index = 0;
        self.mode = Mode::Normal;
    }

    /// Set a status message to display
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    /// Clear the status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

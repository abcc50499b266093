//! Floor-plan interaction state machine.
//!
//! The editor owns the element list and all transient interaction state:
//! the armed tool, the pending/active drag, the active resize, hover, and the
//! edit-selected element. It is the only thing that mutates the element list
//! in response to input. Every mutating call returns the [`Change`]s it made
//! so the host can persist them.

use floorplan_core::{
    Catalog, ElementField, ElementId, ElementKind, FloorplanElement, IdGenerator, Placement, Tool, apply_edit,
    resolve_placement,
};
use floorplan_geometry::{
    Point, Rect, Size, hit_test, is_out_of_canvas, resize_handle_rect,
};
use tracing::{debug, warn};

use crate::listeners::{ListenerGuard, ListenerKind, ListenerRegistry};

/// Canvas size used until the host reports the real one
pub const DEFAULT_CANVAS_SIZE: Size = Size {
    width: 800.0,
    height: 600.0,
};

/// Explicit editor configuration, passed in at construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorConfig {
    pub canvas: Size,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas: DEFAULT_CANVAS_SIZE,
        }
    }
}

/// A committed mutation of the element list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Added(ElementId),
    Moved(ElementId),
    Resized(ElementId),
    Updated(ElementId),
    Removed(ElementId),
}

/// Keys the editor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
}

/// Summary of what the editor is doing, most specific first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Resizing,
    Dragging,
    /// Pointer is down on an element but has not moved yet
    PendingDrag,
    ToolSelected,
    EditSelected,
    Idle,
}

/// Pointer-down on an element. Becomes a drag on the first move; a release
/// without movement is a click.
#[derive(Debug)]
struct DragState {
    id: ElementId,
    offset: (f64, f64),
    is_dragging: bool,
    out_of_bounds: bool,
}

#[derive(Debug)]
struct ResizeState {
    id: ElementId,
    initial: Size,
    start: Point,
    _listeners: ListenerGuard,
}

#[derive(Debug)]
struct ArmedTool {
    tool: Tool,
    _escape: ListenerGuard,
}

pub struct Editor {
    config: EditorConfig,
    elements: Vec<FloorplanElement>,
    catalog: Catalog,
    ids: IdGenerator,
    armed: Option<ArmedTool>,
    drag: Option<DragState>,
    resize: Option<ResizeState>,
    hovered: Option<ElementId>,
    /// Last pointer position while over the canvas
    pointer: Option<Point>,
    selected: Option<ElementId>,
    listeners: ListenerRegistry,
}

impl Editor {
    pub fn new(config: EditorConfig, catalog: Catalog) -> Self {
        Self {
            config,
            elements: Vec::new(),
            catalog,
            ids: IdGenerator::new(),
            armed: None,
            drag: None,
            resize: None,
            hovered: None,
            pointer: None,
            selected: None,
            listeners: ListenerRegistry::new(),
        }
    }

    /// Replace the element list (on mount). Transient state is dropped.
    ///
    /// Duplicate ids in stored data get fresh ids so the list invariant holds.
    /// Sizes below the minimum, negative positions and zero seats are
    /// normalized the same way live edits are.
    pub fn load(&mut self, elements: Vec<FloorplanElement>) {
        self.cancel_interaction();
        self.selected = None;
        self.elements.clear();
        for element in &elements {
            self.ids.observe(element.id);
        }
        for mut element in elements {
            if self.element(element.id).is_some() {
                let fresh = self.ids.next_id();
                warn!(old = %element.id, new = %fresh, "Duplicate element id in stored data");
                element.id = fresh;
            }
            normalize(&mut element);
            self.elements.push(element);
        }
        debug!(count = self.elements.len(), "Elements loaded");
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn set_canvas_size(&mut self, canvas: Size) {
        self.config.canvas = canvas;
    }

    pub fn canvas_size(&self) -> Size {
        self.config.canvas
    }

    fn canvas_rect(&self) -> Rect {
        Rect::from_origin_size(Point::default(), self.config.canvas)
    }

    // --- Queries ---

    pub fn elements(&self) -> &[FloorplanElement] {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> Option<&FloorplanElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut FloorplanElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn selected_id(&self) -> Option<ElementId> {
        self.selected
    }

    /// The edit-selected element, with its current attributes
    pub fn selected(&self) -> Option<&FloorplanElement> {
        self.selected.and_then(|id| self.element(id))
    }

    pub fn hovered(&self) -> Option<ElementId> {
        self.hovered
    }

    pub fn tool(&self) -> Option<&Tool> {
        self.armed.as_ref().map(|a| &a.tool)
    }

    /// Element currently being dragged (after the first move)
    pub fn dragging(&self) -> Option<ElementId> {
        self.drag.as_ref().filter(|d| d.is_dragging).map(|d| d.id)
    }

    /// True while a drag would delete its element if released now
    pub fn drag_out_of_bounds(&self) -> bool {
        self.drag.as_ref().is_some_and(|d| d.is_dragging && d.out_of_bounds)
    }

    /// True from pointer-down on an element until release: pending drags,
    /// drags and resizes all keep receiving moves outside the canvas
    pub fn captures_pointer(&self) -> bool {
        self.drag.is_some() || self.resize.is_some()
    }

    pub fn resizing(&self) -> Option<ElementId> {
        self.resize.as_ref().map(|r| r.id)
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn state(&self) -> InteractionState {
        if self.resize.is_some() {
            InteractionState::Resizing
        } else if let Some(drag) = &self.drag {
            if drag.is_dragging {
                InteractionState::Dragging
            } else {
                InteractionState::PendingDrag
            }
        } else if self.armed.is_some() {
            InteractionState::ToolSelected
        } else if self.selected.is_some() {
            InteractionState::EditSelected
        } else {
            InteractionState::Idle
        }
    }

    /// Preview of what a click would place, while a tool is armed and the
    /// pointer is over the canvas. Never shown during a drag or resize.
    pub fn ghost(&self) -> Option<Placement> {
        if self.drag.is_some() || self.resize.is_some() {
            return None;
        }
        let tool = &self.armed.as_ref()?.tool;
        let at = self.pointer?;
        Some(resolve_placement(tool, &self.catalog, at))
    }

    // --- Tools and keys ---

    /// Arm a placement tool. It stays armed after each placement.
    pub fn arm_tool(&mut self, tool: Tool) {
        debug!(%tool, "Tool armed");
        // Drop the previous guard before registering the new one
        self.armed = None;
        let escape = self.listeners.register(&[ListenerKind::KeyDown]);
        self.armed = Some(ArmedTool {
            tool,
            _escape: escape,
        });
    }

    pub fn disarm_tool(&mut self) {
        if let Some(armed) = self.armed.take() {
            debug!(tool = %armed.tool, "Tool disarmed");
        }
    }

    /// `Escape` disarms the tool; drags and resizes are unaffected
    pub fn key_down(&mut self, key: Key) {
        match key {
            Key::Escape => self.disarm_tool(),
        }
    }

    // --- Pointer input ---

    pub fn pointer_enter(&mut self, p: Point) {
        self.track_pointer(p);
    }

    /// Clears hover and the ghost; an active drag or resize carries on
    pub fn pointer_leave(&mut self) {
        self.pointer = None;
        self.hovered = None;
    }

    fn track_pointer(&mut self, p: Point) {
        let inside = self.canvas_rect().contains(p);
        self.pointer = inside.then_some(p);
        self.hovered = if inside && self.drag.is_none() && self.resize.is_none() {
            hit_test(p, &self.elements).map(|e| e.id)
        } else {
            None
        };
    }

    pub fn pointer_down(&mut self, p: Point) -> Vec<Change> {
        if self.resize.is_some() {
            return Vec::new();
        }

        if let Some(armed) = &self.armed {
            if !self.canvas_rect().contains(p) {
                return Vec::new();
            }
            let placement = resolve_placement(&armed.tool, &self.catalog, p);
            let element = placement.into_element(self.ids.next_id());
            let id = element.id;
            debug!(%id, kind = element.kind.type_name(), x = element.x, y = element.y, "Element placed");
            self.elements.push(element);
            self.selected = None;
            return vec![Change::Added(id)];
        }

        let Some(target) = hit_test(p, &self.elements) else {
            if self.drag.is_none() {
                self.selected = None;
            }
            return Vec::new();
        };

        let id = target.id;
        if resize_handle_rect(target.rect()).contains(p) {
            self.begin_resize(id, p);
            return Vec::new();
        }

        let offset = p.delta_from(target.origin());
        self.drag = Some(DragState {
            id,
            offset,
            is_dragging: false,
            out_of_bounds: false,
        });
        Vec::new()
    }

    pub fn pointer_move(&mut self, p: Point) {
        self.track_pointer(p);

        if let Some(resize) = &self.resize {
            let (dx, dy) = p.delta_from(resize.start);
            let (id, initial) = (resize.id, resize.initial);
            if let Some(element) = self.element_mut(id) {
                element.resize_to(initial.width + dx, initial.height + dy);
            }
            return;
        }

        let canvas = self.config.canvas;
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        if !drag.is_dragging {
            debug!(id = %drag.id, "Drag started");
            drag.is_dragging = true;
        }
        let (x, y) = (p.x - drag.offset.0, p.y - drag.offset.1);
        let id = drag.id;

        let Some(element) = self.elements.iter_mut().find(|e| e.id == id) else {
            self.drag = None;
            return;
        };
        // Bounds are judged on the unclamped box; the stored position is clamped
        let candidate = Rect::new(x, y, element.width, element.height);
        drag.out_of_bounds = is_out_of_canvas(candidate, canvas);
        element.move_to(x, y);
    }

    pub fn pointer_up(&mut self, p: Point) -> Vec<Change> {
        if let Some(resize) = self.resize.take() {
            let changed = self
                .element(resize.id)
                .is_some_and(|e| e.width != resize.initial.width || e.height != resize.initial.height);
            debug!(id = %resize.id, changed, "Resize finished");
            return if changed {
                vec![Change::Resized(resize.id)]
            } else {
                Vec::new()
            };
        }

        let Some(drag) = self.drag.take() else {
            return Vec::new();
        };

        if drag.is_dragging {
            if drag.out_of_bounds {
                debug!(id = %drag.id, "Dropped outside canvas");
                return self.delete_element(drag.id);
            }
            return vec![Change::Moved(drag.id)];
        }

        if hit_test(p, &self.elements).is_some_and(|e| e.id == drag.id) {
            debug!(id = %drag.id, "Element selected for edit");
            self.selected = Some(drag.id);
        }
        Vec::new()
    }

    /// Start resizing `id` from its handle at `p`
    pub fn begin_resize(&mut self, id: ElementId, p: Point) -> bool {
        if self.resize.is_some() {
            return false;
        }
        let Some(element) = self.element(id) else {
            return false;
        };
        let initial = Size::new(element.width, element.height);
        self.drag = None;
        self.hovered = None;
        let listeners = self
            .listeners
            .register(&[ListenerKind::PointerMove, ListenerKind::PointerUp]);
        self.resize = Some(ResizeState {
            id,
            initial,
            start: p,
            _listeners: listeners,
        });
        debug!(%id, "Resize started");
        true
    }

    /// Drop any pending drag or resize without committing further changes
    fn cancel_interaction(&mut self) {
        self.drag = None;
        self.resize = None;
        self.hovered = None;
    }

    // --- Property panel ---

    /// Apply a panel field change to the edit-selected element immediately
    pub fn edit_field(&mut self, field: ElementField, value: &str) -> Vec<Change> {
        match self.selected {
            Some(id) => self.edit_element(id, field, value),
            None => Vec::new(),
        }
    }

    pub fn edit_element(&mut self, id: ElementId, field: ElementField, value: &str) -> Vec<Change> {
        let Some(element) = self.element_mut(id) else {
            return Vec::new();
        };
        if apply_edit(element, field, value) {
            debug!(%id, %field, "Element edited");
            vec![Change::Updated(id)]
        } else {
            Vec::new()
        }
    }

    /// Delete the edit-selected element and close the panel
    pub fn delete_selected(&mut self) -> Vec<Change> {
        match self.selected {
            Some(id) => self.delete_element(id),
            None => Vec::new(),
        }
    }

    pub fn delete_element(&mut self, id: ElementId) -> Vec<Change> {
        let Some(index) = self.elements.iter().position(|e| e.id == id) else {
            return Vec::new();
        };
        self.elements.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        if self.drag.as_ref().is_some_and(|d| d.id == id) {
            self.drag = None;
        }
        if self.resize.as_ref().is_some_and(|r| r.id == id) {
            self.resize = None;
        }
        debug!(%id, "Element deleted");
        vec![Change::Removed(id)]
    }
}

fn normalize(element: &mut FloorplanElement) {
    let (x, y, width, height) = (element.x, element.y, element.width, element.height);
    element.move_to(x, y);
    element.resize_to(width, height);
    if let ElementKind::Table { seats, .. } = &mut element.kind {
        *seats = (*seats).max(1);
    }
}

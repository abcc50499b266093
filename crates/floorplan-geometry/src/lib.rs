//! Canvas geometry for the floor-plan editor.
//!
//! Everything here is pure and stateless: points, sizes and axis-aligned
//! boxes in canvas pixel space (top-left origin), plus the spatial queries
//! the editor runs on every pointer event.

use serde::{Deserialize, Serialize};

/// Smallest width or height an element may have, in pixels.
pub const MIN_ELEMENT_SIZE: f64 = 24.0;

/// Side length of the square resize handle at an element's bottom-right corner.
pub const RESIZE_HANDLE_SIZE: f64 = 8.0;

/// A point in canvas pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`
    pub fn delta_from(self, other: Point) -> (f64, f64) {
        (self.x - other.x, self.y - other.y)
    }
}

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned box: `[x, x + width] × [y, y + height]`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Box of `size` whose center is `center`
    pub fn centered_on(center: Point, size: Size) -> Self {
        Self::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Inclusive on all four edges
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

/// Anything with an axis-aligned box on the canvas.
pub trait Bounded {
    type Id: Copy + PartialEq;

    fn id(&self) -> Self::Id;
    fn bounds(&self) -> Rect;
}

/// Topmost item whose box contains `point`.
///
/// There is no z-order field: later items in the slice are drawn on top,
/// so the last match wins.
pub fn hit_test<T: Bounded>(point: Point, items: &[T]) -> Option<&T> {
    items.iter().rev().find(|item| item.bounds().contains(point))
}

/// True iff `rect` has no positive-area overlap with `[0, W] × [0, H]`.
///
/// A box whose trailing edge only touches the canvas edge (`x + width == 0`)
/// counts as outside. Any partial overlap does not.
pub fn is_out_of_canvas(rect: Rect, canvas: Size) -> bool {
    rect.right() <= 0.0
        || rect.x >= canvas.width
        || rect.bottom() <= 0.0
        || rect.y >= canvas.height
}

/// Clamp the lower bound only; there is no right/bottom clamp.
pub fn clamp_position(x: f64, y: f64) -> Point {
    Point::new(x.max(0.0), y.max(0.0))
}

/// Apply the minimum element size floor to both dimensions.
pub fn clamp_size(width: f64, height: f64) -> Size {
    Size::new(width.max(MIN_ELEMENT_SIZE), height.max(MIN_ELEMENT_SIZE))
}

/// Square handle anchored inside the bottom-right corner of `rect`
pub fn resize_handle_rect(rect: Rect) -> Rect {
    Rect::new(
        rect.right() - RESIZE_HANDLE_SIZE,
        rect.bottom() - RESIZE_HANDLE_SIZE,
        RESIZE_HANDLE_SIZE,
        RESIZE_HANDLE_SIZE,
    )
}

/// Maps terminal cells to canvas pixels.
///
/// Each cell covers `cell_width × cell_height` pixels; a cell maps to the
/// pixel at its center so clicks land inside the element they visually hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub cell_width: f64,
    pub cell_height: f64,
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16, cell_width: f64, cell_height: f64) -> Self {
        Self {
            cell_width,
            cell_height,
            width,
            height,
        }
    }

    /// Convert a cell relative to the canvas area (may be negative) to canvas pixels
    pub fn cell_to_canvas(&self, col: i32, row: i32) -> Point {
        Point::new(
            (col as f64 + 0.5) * self.cell_width,
            (row as f64 + 0.5) * self.cell_height,
        )
    }

    /// Cell containing a canvas pixel, if it is inside the visible area
    pub fn canvas_to_cell(&self, p: Point) -> Option<(u16, u16)> {
        let col = (p.x / self.cell_width).floor();
        let row = (p.y / self.cell_height).floor();
        if col >= 0.0 && row >= 0.0 && col < self.width as f64 && row < self.height as f64 {
            Some((col as u16, row as u16))
        } else {
            None
        }
    }

    /// Canvas size in pixels covered by the visible cells
    pub fn canvas_size(&self) -> Size {
        Size::new(
            self.width as f64 * self.cell_width,
            self.height as f64 * self.cell_height,
        )
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug)]
    struct Item(u32, Rect);

    impl Bounded for Item {
        type Id = u32;

        fn id(&self) -> u32 {
            self.0
        }

        fn bounds(&self) -> Rect {
            self.1
        }
    }

    #[test]
    fn hit_test_is_inclusive_on_edges() {
        let items = [Item(1, Rect::new(10.0, 10.0, 48.0, 48.0))];
        assert_eq!(hit_test(Point::new(10.0, 10.0), &items).map(|i| i.id()), Some(1));
        assert_eq!(hit_test(Point::new(58.0, 58.0), &items).map(|i| i.id()), Some(1));
        assert!(hit_test(Point::new(58.1, 30.0), &items).is_none());
        assert!(hit_test(Point::new(9.9, 30.0), &items).is_none());
    }

    #[test]
    fn hit_test_last_item_wins_on_overlap() {
        let items = [
            Item(1, Rect::new(0.0, 0.0, 100.0, 100.0)),
            Item(2, Rect::new(20.0, 20.0, 30.0, 30.0)),
        ];
        assert_eq!(hit_test(Point::new(25.0, 25.0), &items).map(|i| i.id()), Some(2));
        assert_eq!(hit_test(Point::new(80.0, 80.0), &items).map(|i| i.id()), Some(1));
    }

    #[test]
    fn touching_left_edge_is_out() {
        let canvas = Size::new(400.0, 400.0);
        assert!(is_out_of_canvas(Rect::new(-48.0, 10.0, 48.0, 48.0), canvas));
        assert!(!is_out_of_canvas(Rect::new(-47.0, 10.0, 48.0, 48.0), canvas));
        assert!(is_out_of_canvas(Rect::new(-60.0, 10.0, 48.0, 48.0), canvas));
    }

    #[test]
    fn far_edges_are_symmetric() {
        let canvas = Size::new(400.0, 300.0);
        assert!(is_out_of_canvas(Rect::new(400.0, 10.0, 48.0, 48.0), canvas));
        assert!(!is_out_of_canvas(Rect::new(399.0, 10.0, 48.0, 48.0), canvas));
        assert!(is_out_of_canvas(Rect::new(10.0, 300.0, 48.0, 48.0), canvas));
        assert!(is_out_of_canvas(Rect::new(10.0, -48.0, 48.0, 48.0), canvas));
    }

    #[test]
    fn clamping_only_touches_lower_bound() {
        assert_eq!(clamp_position(-5.0, 900.0), Point::new(0.0, 900.0));
        assert_eq!(clamp_size(-52.0, 30.0), Size::new(24.0, 30.0));
    }

    #[test]
    fn handle_sits_in_bottom_right_corner() {
        let handle = resize_handle_rect(Rect::new(10.0, 10.0, 48.0, 48.0));
        assert_eq!(handle, Rect::new(50.0, 50.0, 8.0, 8.0));
    }

    #[test]
    fn viewport_maps_cells_to_pixel_centers() {
        let vp = Viewport::new(50, 20, 8.0, 16.0);
        assert_eq!(vp.cell_to_canvas(0, 0), Point::new(4.0, 8.0));
        assert_eq!(vp.cell_to_canvas(-1, 2), Point::new(-4.0, 40.0));
        assert_eq!(vp.canvas_to_cell(Point::new(17.0, 33.0)), Some((2, 2)));
        assert_eq!(vp.canvas_to_cell(Point::new(-1.0, 0.0)), None);
        assert_eq!(vp.canvas_size(), Size::new(400.0, 320.0));
    }

    fn overlap_area(rect: Rect, canvas: Size) -> f64 {
        let w = (rect.right().min(canvas.width) - rect.x.max(0.0)).max(0.0);
        let h = (rect.bottom().min(canvas.height) - rect.y.max(0.0)).max(0.0);
        w * h
    }

    proptest! {
        #[test]
        fn out_of_canvas_iff_zero_overlap(
            x in -600i32..600,
            y in -600i32..600,
            w in 24i32..200,
            h in 24i32..200,
        ) {
            let rect = Rect::new(x as f64, y as f64, w as f64, h as f64);
            let canvas = Size::new(400.0, 400.0);
            prop_assert_eq!(is_out_of_canvas(rect, canvas), overlap_area(rect, canvas) == 0.0);
        }

        #[test]
        fn clamped_position_is_never_negative(x in -1e6f64..1e6, y in -1e6f64..1e6) {
            let p = clamp_position(x, y);
            prop_assert!(p.x >= 0.0 && p.y >= 0.0);
        }

        #[test]
        fn clamped_size_respects_floor(w in -1e6f64..1e6, h in -1e6f64..1e6) {
            let s = clamp_size(w, h);
            prop_assert!(s.width >= MIN_ELEMENT_SIZE && s.height >= MIN_ELEMENT_SIZE);
        }
    }
}

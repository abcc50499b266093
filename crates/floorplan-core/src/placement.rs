//! Default resolution for new elements.
//!
//! The ghost preview and the committed element both come from
//! [`resolve_placement`], so what the user sees before clicking is exactly
//! what lands on the canvas.

use floorplan_geometry::{Point, Rect};

use crate::catalog::Catalog;
use crate::element::{
    AREA_PRESET_SIZE, BARRIER_COLOR, DEFAULT_TABLE_COLOR, ElementId, ElementKind,
    FloorplanElement, HexColor, TableShape, ZONE_COLOR,
};
use crate::tool::Tool;

pub const FALLBACK_TABLE_LABEL: &str = "Table";
pub const FALLBACK_TABLE_SEATS: u32 = 2;

/// A would-be element: where it goes and what it looks like
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub rect: Rect,
    pub color: HexColor,
    pub kind: ElementKind,
}

impl Placement {
    pub fn label(&self) -> &str {
        self.kind.display_name()
    }

    pub fn into_element(self, id: ElementId) -> FloorplanElement {
        FloorplanElement::new(id, self.rect, self.color, self.kind)
    }
}

/// Resolve what `tool` would create when committed at `at`.
///
/// Tables take their attributes from the armed catalog entry, else the first
/// entry, else the built-in default. The element is centered on `at`.
pub fn resolve_placement(tool: &Tool, catalog: &Catalog, at: Point) -> Placement {
    let (size, color, kind) = match tool {
        Tool::Zone => (AREA_PRESET_SIZE, HexColor::new(ZONE_COLOR), ElementKind::zone()),
        Tool::Barrier => (
            AREA_PRESET_SIZE,
            HexColor::new(BARRIER_COLOR),
            ElementKind::barrier(),
        ),
        Tool::Table | Tool::TableType(_) => {
            let template = match tool {
                Tool::TableType(id) => catalog.get(id).or_else(|| catalog.first()),
                _ => catalog.first(),
            };
            let (label, seats, shape, color) = match template {
                Some(t) => (t.label.clone(), t.seats, t.shape, t.color.clone()),
                None => (
                    FALLBACK_TABLE_LABEL.to_string(),
                    FALLBACK_TABLE_SEATS,
                    TableShape::Square,
                    HexColor::new(DEFAULT_TABLE_COLOR),
                ),
            };
            (
                shape.preset_size(),
                color,
                ElementKind::Table {
                    label,
                    seats,
                    shape,
                },
            )
        }
    };

    Placement {
        rect: Rect::centered_on(at, size),
        color,
        kind,
    }
}

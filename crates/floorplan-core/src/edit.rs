//! Property-panel edits.
//!
//! Panel input is free text. Values are coerced rather than rejected: a
//! field that does not parse falls back to its floor or default.

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use floorplan_geometry::MIN_ELEMENT_SIZE;
use tracing::trace;

use crate::element::{ElementKind, FloorplanElement, HexColor, TableShape};

/// Fields the property panel can change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementField {
    Label,
    Seats,
    Shape,
    Name,
    Color,
    X,
    Y,
    Width,
    Height,
}

impl ElementField {
    pub fn name(self) -> &'static str {
        match self {
            ElementField::Label => "label",
            ElementField::Seats => "seats",
            ElementField::Shape => "shape",
            ElementField::Name => "name",
            ElementField::Color => "color",
            ElementField::X => "x",
            ElementField::Y => "y",
            ElementField::Width => "width",
            ElementField::Height => "height",
        }
    }

    /// Fields shown in the panel for this element, in display order
    pub fn for_kind(kind: &ElementKind) -> &'static [ElementField] {
        match kind {
            ElementKind::Table { .. } => &[
                ElementField::Label,
                ElementField::Seats,
                ElementField::Shape,
                ElementField::Color,
                ElementField::X,
                ElementField::Y,
                ElementField::Width,
                ElementField::Height,
            ],
            ElementKind::Zone { .. } | ElementKind::Barrier { .. } => &[
                ElementField::Name,
                ElementField::Color,
                ElementField::X,
                ElementField::Y,
                ElementField::Width,
                ElementField::Height,
            ],
        }
    }

    /// Current value of this field as panel text
    pub fn read(self, element: &FloorplanElement) -> Option<String> {
        match (self, &element.kind) {
            (ElementField::Label, ElementKind::Table { label, .. }) => Some(label.clone()),
            (ElementField::Seats, ElementKind::Table { seats, .. }) => Some(seats.to_string()),
            (ElementField::Shape, ElementKind::Table { shape, .. }) => Some(shape.to_string()),
            (ElementField::Name, ElementKind::Zone { name } | ElementKind::Barrier { name }) => {
                Some(name.clone())
            }
            (ElementField::Color, _) => Some(element.color.to_string()),
            (ElementField::X, _) => Some(element.x.to_string()),
            (ElementField::Y, _) => Some(element.y.to_string()),
            (ElementField::Width, _) => Some(element.width.to_string()),
            (ElementField::Height, _) => Some(element.height.to_string()),
            _ => None,
        }
    }
}

impl FromStr for ElementField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "label" => ElementField::Label,
            "seats" => ElementField::Seats,
            "shape" => ElementField::Shape,
            "name" => ElementField::Name,
            "color" => ElementField::Color,
            "x" => ElementField::X,
            "y" => ElementField::Y,
            "width" => ElementField::Width,
            "height" => ElementField::Height,
            other => bail!("unknown element field: {other:?}"),
        })
    }
}

impl fmt::Display for ElementField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Seat count from panel text; anything unusable becomes 1
pub fn coerce_seats(value: &str) -> u32 {
    parse_number(value)
        .map(|v| v.trunc().clamp(1.0, u32::MAX as f64) as u32)
        .unwrap_or(1)
}

/// Apply one field change. Returns false when the field does not exist on
/// this element's variant, in which case nothing changes.
pub fn apply_edit(element: &mut FloorplanElement, field: ElementField, value: &str) -> bool {
    match field {
        ElementField::Color => {
            let value = value.trim();
            element.color = if HexColor::is_valid(value) {
                HexColor::new(value)
            } else {
                element.kind.default_color()
            };
            return true;
        }
        ElementField::X => {
            let x = parse_number(value).unwrap_or(0.0);
            element.move_to(x, element.y);
            return true;
        }
        ElementField::Y => {
            let y = parse_number(value).unwrap_or(0.0);
            element.move_to(element.x, y);
            return true;
        }
        ElementField::Width => {
            let w = parse_number(value).unwrap_or(MIN_ELEMENT_SIZE);
            element.resize_to(w, element.height);
            return true;
        }
        ElementField::Height => {
            let h = parse_number(value).unwrap_or(MIN_ELEMENT_SIZE);
            element.resize_to(element.width, h);
            return true;
        }
        ElementField::Label | ElementField::Seats | ElementField::Shape | ElementField::Name => {}
    }

    match (field, &mut element.kind) {
        (ElementField::Label, ElementKind::Table { label, .. }) => *label = value.to_string(),
        (ElementField::Seats, ElementKind::Table { seats, .. }) => *seats = coerce_seats(value),
        (ElementField::Shape, ElementKind::Table { shape, .. }) => {
            *shape = value.parse().unwrap_or(TableShape::Square);
        }
        (ElementField::Name, ElementKind::Zone { name } | ElementKind::Barrier { name }) => {
            *name = value.to_string();
        }
        (field, kind) => {
            trace!(%field, kind = kind.type_name(), "Field not present on element");
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use floorplan_geometry::Rect;

    use super::*;
    use crate::element::ElementId;

    fn table() -> FloorplanElement {
        FloorplanElement::new(
            ElementId(1),
            Rect::new(10.0, 10.0, 48.0, 48.0),
            HexColor::new("#93c5fd"),
            ElementKind::Table {
                label: "T1".into(),
                seats: 4,
                shape: TableShape::Square,
            },
        )
    }

    #[test]
    fn garbage_seats_become_one() {
        let mut t = table();
        assert!(apply_edit(&mut t, ElementField::Seats, "abc"));
        assert_eq!(ElementField::Seats.read(&t).as_deref(), Some("1"));

        apply_edit(&mut t, ElementField::Seats, "0");
        assert_eq!(ElementField::Seats.read(&t).as_deref(), Some("1"));

        apply_edit(&mut t, ElementField::Seats, " 6 ");
        assert_eq!(ElementField::Seats.read(&t).as_deref(), Some("6"));

        apply_edit(&mut t, ElementField::Seats, "4.7");
        assert_eq!(ElementField::Seats.read(&t).as_deref(), Some("4"));
    }

    #[test]
    fn geometry_fields_keep_floors() {
        let mut t = table();
        apply_edit(&mut t, ElementField::Width, "3");
        apply_edit(&mut t, ElementField::Height, "nope");
        apply_edit(&mut t, ElementField::X, "-20");
        assert_eq!(t.rect(), Rect::new(0.0, 10.0, 24.0, 24.0));
    }

    #[test]
    fn shape_edit_keeps_size() {
        let mut t = table();
        apply_edit(&mut t, ElementField::Shape, "rectangle");
        assert_eq!((t.width, t.height), (48.0, 48.0));
        apply_edit(&mut t, ElementField::Shape, "blob");
        assert_eq!(ElementField::Shape.read(&t).as_deref(), Some("square"));
    }

    #[test]
    fn invalid_color_falls_back_to_variant_default() {
        let mut zone = FloorplanElement::new(
            ElementId(2),
            Rect::new(0.0, 0.0, 50.0, 50.0),
            HexColor::new("#000000"),
            ElementKind::zone(),
        );
        apply_edit(&mut zone, ElementField::Color, "not a color");
        assert_eq!(zone.color.as_str(), "#fef08a");
        apply_edit(&mut zone, ElementField::Color, "#123456");
        assert_eq!(zone.color.as_str(), "#123456");
    }

    #[test]
    fn fields_of_other_variants_are_ignored() {
        let mut zone = FloorplanElement::new(
            ElementId(2),
            Rect::new(0.0, 0.0, 50.0, 50.0),
            HexColor::new("#fef08a"),
            ElementKind::zone(),
        );
        let before = zone.clone();
        assert!(!apply_edit(&mut zone, ElementField::Seats, "4"));
        assert!(!apply_edit(&mut zone, ElementField::Label, "Patio"));
        assert_eq!(zone, before);

        assert!(apply_edit(&mut zone, ElementField::Name, "Patio"));
        assert_eq!(zone.display_name(), "Patio");
    }

    #[test]
    fn field_names_parse() {
        for field in ElementField::for_kind(&table().kind) {
            assert_eq!(field.name().parse::<ElementField>().unwrap(), *field);
        }
        assert!("z".parse::<ElementField>().is_err());
    }
}

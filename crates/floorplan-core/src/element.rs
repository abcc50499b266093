//! Placed floor-plan elements.
//!
//! `ElementKind` defines the three variants (table, zone, barrier).
//! `FloorplanElement` carries the fields every variant shares.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Result, bail};
use floorplan_geometry::{Bounded, Point, Rect, Size, clamp_position, clamp_size};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TABLE_COLOR: &str = "#93c5fd";
pub const ZONE_COLOR: &str = "#fef08a";
pub const BARRIER_COLOR: &str = "#9ca3af";

pub const DEFAULT_ZONE_NAME: &str = "Zone";
pub const DEFAULT_BARRIER_NAME: &str = "Barrier";

/// Zones and barriers are placed at this size
pub const AREA_PRESET_SIZE: Size = Size {
    width: 50.0,
    height: 50.0,
};

/// Element identifier, unique within the active element list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out ids from wall-clock millis plus a random offset.
///
/// Ids only need to be distinct within one editing session. The generator
/// never goes backwards, so an id is never handed out twice even if the
/// clock does.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure future ids are greater than `id` (used after loading)
    pub fn observe(&mut self, id: ElementId) {
        self.last = self.last.max(id.0);
    }

    pub fn next_id(&mut self) -> ElementId {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        let candidate = millis
            .saturating_mul(1000)
            .saturating_add(rand::thread_rng().gen_range(0..1000));
        let id = candidate.max(self.last.saturating_add(1));
        self.last = id;
        ElementId(id)
    }
}

/// CSS-style hex color, `#rgb` or `#rrggbb`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HexColor(String);

impl HexColor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(value: &str) -> bool {
        let Some(digits) = value.strip_prefix('#') else {
            return false;
        };
        matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// RGB components, if the color is well formed
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        if !Self::is_valid(&self.0) {
            return None;
        }
        let digits = &self.0[1..];
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        if digits.len() == 3 {
            let expand = |i: usize| channel(&digits[i..i + 1].repeat(2));
            Some((expand(0)?, expand(1)?, expand(2)?))
        } else {
            Some((channel(&digits[0..2])?, channel(&digits[2..4])?, channel(&digits[4..6])?))
        }
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Table outline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableShape {
    #[default]
    Square,
    Rectangle,
    Circle,
}

impl TableShape {
    pub const ALL: [TableShape; 3] = [TableShape::Square, TableShape::Rectangle, TableShape::Circle];

    /// Size a new table of this shape is placed at
    pub fn preset_size(self) -> Size {
        match self {
            TableShape::Square => Size::new(48.0, 48.0),
            TableShape::Rectangle => Size::new(72.0, 40.0),
            TableShape::Circle => Size::new(48.0, 48.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TableShape::Square => "square",
            TableShape::Rectangle => "rectangle",
            TableShape::Circle => "circle",
        }
    }

    pub fn next(self) -> Self {
        match self {
            TableShape::Square => TableShape::Rectangle,
            TableShape::Rectangle => TableShape::Circle,
            TableShape::Circle => TableShape::Square,
        }
    }
}

impl FromStr for TableShape {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "square" => Ok(TableShape::Square),
            "rectangle" => Ok(TableShape::Rectangle),
            "circle" => Ok(TableShape::Circle),
            other => bail!("unknown table shape: {other:?}"),
        }
    }
}

impl fmt::Display for TableShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn default_zone_name() -> String {
    DEFAULT_ZONE_NAME.to_string()
}

fn default_barrier_name() -> String {
    DEFAULT_BARRIER_NAME.to_string()
}

/// Variant-specific element data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    /// A seating table, copied from a catalog entry when placed
    Table {
        label: String,
        seats: u32,
        shape: TableShape,
    },
    /// A named floor area (terrace, bar, dining room)
    Zone {
        #[serde(default = "default_zone_name")]
        name: String,
    },
    /// A wall or partition
    Barrier {
        #[serde(default = "default_barrier_name")]
        name: String,
    },
}

impl ElementKind {
    pub fn zone() -> Self {
        ElementKind::Zone {
            name: default_zone_name(),
        }
    }

    pub fn barrier() -> Self {
        ElementKind::Barrier {
            name: default_barrier_name(),
        }
    }

    /// Label for tables, name for zones and barriers
    pub fn display_name(&self) -> &str {
        match self {
            ElementKind::Table { label, .. } => label,
            ElementKind::Zone { name } | ElementKind::Barrier { name } => name,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ElementKind::Table { .. } => "Table",
            ElementKind::Zone { .. } => "Zone",
            ElementKind::Barrier { .. } => "Barrier",
        }
    }

    pub fn default_color(&self) -> HexColor {
        match self {
            ElementKind::Table { .. } => HexColor::new(DEFAULT_TABLE_COLOR),
            ElementKind::Zone { .. } => HexColor::new(ZONE_COLOR),
            ElementKind::Barrier { .. } => HexColor::new(BARRIER_COLOR),
        }
    }
}

/// A table, zone or barrier placed on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorplanElement {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: HexColor,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl FloorplanElement {
    pub fn new(id: ElementId, rect: Rect, color: HexColor, kind: ElementKind) -> Self {
        Self {
            id,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            color,
            kind,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Move the top-left corner, clamped to `x, y ≥ 0`
    pub fn move_to(&mut self, x: f64, y: f64) {
        let p = clamp_position(x, y);
        self.x = p.x;
        self.y = p.y;
    }

    /// Resize, floored at the minimum element size
    pub fn resize_to(&mut self, width: f64, height: f64) {
        let s = clamp_size(width, height);
        self.width = s.width;
        self.height = s.height;
    }

    pub fn display_name(&self) -> &str {
        self.kind.display_name()
    }
}

impl Bounded for FloorplanElement {
    type Id = ElementId;

    fn id(&self) -> ElementId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.rect()
    }
}

//! Core types for the floor-plan editor: placed elements, the table-type
//! catalog, placement tools and their default resolution, and panel edits.

pub mod catalog;
pub mod edit;
pub mod element;
pub mod placement;
pub mod tool;

pub use catalog::{Catalog, TableType, TableTypeId};
pub use edit::{ElementField, apply_edit, coerce_seats};
pub use element::{ElementId, ElementKind, FloorplanElement, HexColor, IdGenerator, TableShape};
pub use placement::{Placement, resolve_placement};
pub use tool::Tool;

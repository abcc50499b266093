//! Table-type catalog.
//!
//! Entries are templates: placing a table copies the entry's attributes onto
//! the new element, so editing or removing an entry never touches tables that
//! are already on the floor.

use std::fmt;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::element::{HexColor, TableShape};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableTypeId(pub String);

impl TableTypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A reusable table template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableType {
    pub id: TableTypeId,
    pub label: String,
    pub seats: u32,
    pub shape: TableShape,
    pub color: HexColor,
    /// Unused. Kept so stored catalogs keep their shape on re-save.
    #[serde(default)]
    pub count: u32,
}

impl TableType {
    pub fn new(
        id: TableTypeId,
        label: impl Into<String>,
        seats: u32,
        shape: TableShape,
        color: HexColor,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            seats: seats.max(1),
            shape,
            color,
            count: 0,
        }
    }
}

/// Ordered id → entry mapping. Order matters: the first entry is the
/// default template for the plain table tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    types: Vec<TableType>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_types(types: Vec<TableType>) -> Self {
        Self { types }
    }

    pub fn get(&self, id: &TableTypeId) -> Option<&TableType> {
        self.types.iter().find(|t| &t.id == id)
    }

    pub fn first(&self) -> Option<&TableType> {
        self.types.first()
    }

    /// Append a new entry; ids must be unique
    pub fn add(&mut self, table_type: TableType) -> Result<()> {
        if self.get(&table_type.id).is_some() {
            bail!("table type {} already exists", table_type.id);
        }
        debug!(id = %table_type.id, label = %table_type.label, "Added table type");
        self.types.push(table_type);
        Ok(())
    }

    /// Replace an existing entry in place, keeping its position
    pub fn update(&mut self, table_type: TableType) -> Result<()> {
        match self.types.iter_mut().find(|t| t.id == table_type.id) {
            Some(slot) => {
                *slot = table_type;
                Ok(())
            }
            None => bail!("no table type with id {}", table_type.id),
        }
    }

    pub fn remove(&mut self, id: &TableTypeId) -> Option<TableType> {
        let index = self.types.iter().position(|t| &t.id == id)?;
        debug!(%id, "Removed table type");
        Some(self.types.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableType> {
        self.types.iter()
    }

    pub fn as_slice(&self) -> &[TableType] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

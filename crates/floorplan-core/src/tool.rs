use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};

use crate::catalog::TableTypeId;

/// Placement tools the toolbar can arm
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tool {
    /// A table from the first catalog entry (or the built-in default)
    Table,
    /// A table from a specific catalog entry
    TableType(TableTypeId),
    Zone,
    Barrier,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Table | Tool::TableType(_) => "Table",
            Tool::Zone => "Zone",
            Tool::Barrier => "Barrier",
        }
    }
}

impl FromStr for Tool {
    type Err = anyhow::Error;

    /// Parses the toolbar command names: `table`, `zone`, `barrier`, `tableType:<id>`
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "table" => Ok(Tool::Table),
            "zone" => Ok(Tool::Zone),
            "barrier" => Ok(Tool::Barrier),
            other => match other.strip_prefix("tableType:") {
                Some(id) if !id.is_empty() => Ok(Tool::TableType(TableTypeId::new(id))),
                _ => bail!("unknown tool: {other:?}"),
            },
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tool::Table => f.write_str("table"),
            Tool::TableType(id) => write!(f, "tableType:{id}"),
            Tool::Zone => f.write_str("zone"),
            Tool::Barrier => f.write_str("barrier"),
        }
    }
}

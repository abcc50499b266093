//! Load/save of the element list and the table-type catalog.
//!
//! Reads never fail from the caller's point of view: missing, unreadable or
//! corrupt data degrades to an empty list. Writes report errors so the host
//! can log them; nothing waits on them.

use anyhow::{Context, Result};
use floorplan_core::{Catalog, FloorplanElement};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::store::KeyValueStore;

pub const ELEMENTS_KEY: &str = "floorplan-elements";
pub const CATALOG_KEY: &str = "table-types";

/// The editor's persistence boundary over any key-value store
#[derive(Debug)]
pub struct FloorplanStore<S> {
    store: S,
}

impl<S: KeyValueStore> FloorplanStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn load_list<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(e) => {
                warn!(key, error = %e, "Failed to read stored list, starting empty");
                return T::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Stored list is corrupt, starting empty");
                T::default()
            }
        }
    }

    pub fn load_elements(&self) -> Vec<FloorplanElement> {
        let elements: Vec<FloorplanElement> = self.load_list(ELEMENTS_KEY);
        debug!(count = elements.len(), "Loaded elements");
        elements
    }

    pub fn save_elements(&mut self, elements: &[FloorplanElement]) -> Result<()> {
        let json = serde_json::to_string(elements).context("Failed to encode elements")?;
        self.store.set(ELEMENTS_KEY, &json)
    }

    pub fn load_catalog(&self) -> Catalog {
        let catalog: Catalog = self.load_list(CATALOG_KEY);
        debug!(count = catalog.len(), "Loaded catalog");
        catalog
    }

    pub fn save_catalog(&mut self, catalog: &Catalog) -> Result<()> {
        let json = serde_json::to_string(catalog).context("Failed to encode catalog")?;
        self.store.set(CATALOG_KEY, &json)
    }

    /// Clear both lists and their backing storage
    pub fn reset(&mut self) -> Result<()> {
        self.store.remove(ELEMENTS_KEY)?;
        self.store.remove(CATALOG_KEY)?;
        info!("Floor plan storage reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use floorplan_core::{
        ElementId, ElementKind, HexColor, TableShape, TableType, TableTypeId,
    };
    use floorplan_geometry::Rect;
    use proptest::prelude::*;

    use super::*;
    use crate::store::{FileStore, MemoryStore};

    fn sample_elements() -> Vec<FloorplanElement> {
        vec![
            FloorplanElement::new(
                ElementId(1),
                Rect::new(75.0, 75.0, 50.0, 50.0),
                HexColor::new("#fef08a"),
                ElementKind::zone(),
            ),
            FloorplanElement::new(
                ElementId(2),
                Rect::new(10.5, 12.25, 72.0, 40.0),
                HexColor::new("#f87171"),
                ElementKind::Table {
                    label: "Booth".into(),
                    seats: 6,
                    shape: TableShape::Rectangle,
                },
            ),
        ]
    }

    #[test]
    fn missing_keys_load_empty() {
        let store = FloorplanStore::new(MemoryStore::new());
        assert!(store.load_elements().is_empty());
        assert!(store.load_catalog().is_empty());
    }

    #[test]
    fn corrupt_data_loads_empty() {
        let mut raw = MemoryStore::new();
        raw.set(ELEMENTS_KEY, "{not json").unwrap();
        raw.set(CATALOG_KEY, "42").unwrap();
        let store = FloorplanStore::new(raw);
        assert!(store.load_elements().is_empty());
        assert!(store.load_catalog().is_empty());
    }

    #[test]
    fn reset_clears_both_lists() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FloorplanStore::new(FileStore::new(dir.path()));
        store.save_elements(&sample_elements()).unwrap();
        let mut catalog = Catalog::new();
        catalog
            .add(TableType::new(
                TableTypeId::new("booth"),
                "Booth",
                6,
                TableShape::Rectangle,
                HexColor::new("#f87171"),
            ))
            .unwrap();
        store.save_catalog(&catalog).unwrap();
        assert_eq!(store.load_catalog(), catalog);

        store.reset().unwrap();
        assert!(store.load_elements().is_empty());
        assert!(store.load_catalog().is_empty());
        assert!(!dir.path().join("floorplan-elements.json").exists());
    }

    #[test]
    fn file_backed_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FloorplanStore::new(FileStore::new(dir.path()));
        let elements = sample_elements();
        store.save_elements(&elements).unwrap();

        let reopened = FloorplanStore::new(FileStore::new(dir.path()));
        assert_eq!(reopened.load_elements(), elements);
    }

    fn arb_kind() -> impl Strategy<Value = ElementKind> {
        prop_oneof![
            ("[A-Za-z0-9 ]{0,12}", 1u32..40, 0usize..3).prop_map(|(label, seats, shape)| {
                ElementKind::Table {
                    label,
                    seats,
                    shape: TableShape::ALL[shape],
                }
            }),
            "[A-Za-z ]{0,12}".prop_map(|name| ElementKind::Zone { name }),
            "[A-Za-z ]{0,12}".prop_map(|name| ElementKind::Barrier { name }),
        ]
    }

    // Quarter-pixel steps, like pointer coordinates on a scaled display
    fn arb_px(min: u32, max: u32) -> impl Strategy<Value = f64> {
        (min * 4..max * 4).prop_map(|v| v as f64 / 4.0)
    }

    fn arb_element() -> impl Strategy<Value = FloorplanElement> {
        (
            any::<u64>(),
            arb_px(0, 5000),
            arb_px(0, 5000),
            arb_px(24, 500),
            arb_px(24, 500),
            "#[0-9a-f]{6}",
            arb_kind(),
        )
            .prop_map(|(id, x, y, w, h, color, kind)| {
                FloorplanElement::new(ElementId(id), Rect::new(x, y, w, h), HexColor::new(color), kind)
            })
    }

    proptest! {
        #[test]
        fn save_then_load_is_lossless(elements in prop::collection::vec(arb_element(), 0..8)) {
            let mut store = FloorplanStore::new(MemoryStore::new());
            store.save_elements(&elements).unwrap();
            let loaded = store.load_elements();
            store.save_elements(&loaded).unwrap();
            prop_assert_eq!(store.load_elements(), elements);
        }
    }
}

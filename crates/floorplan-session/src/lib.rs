//! Persistence for the floor-plan editor: a key-value store contract, file
//! and in-memory backends, the element/catalog store, and settings.

pub mod floorplan_store;
pub mod settings;
pub mod store;

pub use floorplan_store::{CATALOG_KEY, ELEMENTS_KEY, FloorplanStore};
pub use settings::{Settings, default_data_dir};
pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Persistence adapters implementing the ScanStore port
mod json_file_store;
mod memory_store;
mod store_state;

pub use json_file_store::JsonFileScanStore;
pub use memory_store::InMemoryScanStore;

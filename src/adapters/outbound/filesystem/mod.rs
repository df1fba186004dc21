/// Filesystem adapters
mod disk_cache;

pub use disk_cache::{DiskCache, DEFAULT_CACHE_DIR};

//! Pick the storage backend.
//!
//! Priority: localStorage → Memory (fallback)

use std::rc::Rc;
use chat_core::ports::StoragePort;
use chat_types::{Result, config::StorageBackendType};
use super::{LocalStorage, MemoryStorage};

/// Open the best available backend.
/// Returns a trait object so callers are backend-agnostic.
pub fn auto_detect_storage() -> Rc<dyn StoragePort> {
    match LocalStorage::open() {
        Ok(local) => {
            log::info!("Storage backend: localStorage");
            Rc::new(local)
        }
        Err(e) => {
            log::warn!("localStorage unavailable ({}), falling back to memory", e);
            Rc::new(MemoryStorage::new())
        }
    }
}

/// Open the backend named in the configuration. Only an explicit
/// `LocalStorage` choice can fail.
pub fn open_storage(kind: &StorageBackendType) -> Result<Rc<dyn StoragePort>> {
    match kind {
        StorageBackendType::Auto => Ok(auto_detect_storage()),
        StorageBackendType::Memory => {
            log::info!("Storage backend: memory");
            Ok(Rc::new(MemoryStorage::new()))
        }
        StorageBackendType::LocalStorage => Ok(Rc::new(LocalStorage::open()?)),
    }
}

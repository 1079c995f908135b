//! `localStorage` backend.
//! Persistent across page reloads; values are stored as UTF-8 strings,
//! which is what the identity JSON already is.

use async_trait::async_trait;
use web_sys::Storage;

use chat_core::ports::StoragePort;
use chat_types::{ChatError, Result};

pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// Open the window's `localStorage`. Fails outside a browser window or
    /// when the user has disabled site storage.
    pub fn open() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| ChatError::Storage("No window object".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| ChatError::Storage(format!("{:?}", e)))?
            .ok_or_else(|| ChatError::Storage("localStorage not available".to_string()))?;
        Ok(Self { storage })
    }
}

#[async_trait(?Send)]
impl StoragePort for LocalStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self
            .storage
            .get_item(key)
            .map_err(|e| ChatError::Storage(format!("{:?}", e)))?;
        Ok(value.map(String::into_bytes))
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let text = std::str::from_utf8(value)
            .map_err(|_| ChatError::Storage(format!("value for {} is not UTF-8", key)))?;
        self.storage
            .set_item(key, text)
            .map_err(|e| ChatError::Storage(format!("{:?}", e)))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| ChatError::Storage(format!("{:?}", e)))
    }

    fn backend_name(&self) -> &str {
        "localstorage"
    }
}

//! WASM-target tests for chat-platform (Node.js runtime).
//!
//! Tests MemoryStorage, backend selection and the wire helpers under
//! wasm32-unknown-unknown via `wasm-pack test --node`. There is no window
//! under Node, so localStorage is expected to be unavailable.

use wasm_bindgen_test::*;

use chat_core::ports::StoragePort;
use chat_platform::http::{error_from_response, parse_auth_envelope};
use chat_platform::storage::{auto_detect_storage, open_storage, LocalStorage, MemoryStorage};
use chat_types::config::StorageBackendType;
use chat_types::ChatError;

// ─── MemoryStorage Tests ─────────────────────────────────

#[wasm_bindgen_test]
fn memory_storage_backend_name() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.backend_name(), "memory");
}

#[wasm_bindgen_test]
async fn memory_storage_get_missing() {
    let storage = MemoryStorage::new();
    let result = storage.get("nonexistent").await.unwrap();
    assert!(result.is_none());
}

#[wasm_bindgen_test]
async fn memory_storage_set_and_get() {
    let storage = MemoryStorage::new();
    storage.set("authUser", br#"{"id":1}"#).await.unwrap();
    let result = storage.get("authUser").await.unwrap();
    assert_eq!(result, Some(br#"{"id":1}"#.to_vec()));
}

#[wasm_bindgen_test]
async fn memory_storage_overwrite() {
    let storage = MemoryStorage::new();
    storage.set("key", b"v1").await.unwrap();
    storage.set("key", b"v2").await.unwrap();
    let result = storage.get("key").await.unwrap();
    assert_eq!(result, Some(b"v2".to_vec()));
}

#[wasm_bindgen_test]
async fn memory_storage_delete() {
    let storage = MemoryStorage::new();
    storage.set("key", b"val").await.unwrap();
    storage.delete("key").await.unwrap();
    assert!(storage.get("key").await.unwrap().is_none());
    storage.delete("key").await.unwrap();
}

// ─── Backend selection Tests ─────────────────────────────

#[wasm_bindgen_test]
fn local_storage_unavailable_without_window() {
    assert!(matches!(LocalStorage::open(), Err(ChatError::Storage(_))));
}

#[wasm_bindgen_test]
fn auto_detect_falls_back_to_memory() {
    let storage = auto_detect_storage();
    assert_eq!(storage.backend_name(), "memory");
}

#[wasm_bindgen_test]
fn explicit_backend_choice() {
    let memory = open_storage(&StorageBackendType::Memory).unwrap();
    assert_eq!(memory.backend_name(), "memory");
    assert!(open_storage(&StorageBackendType::LocalStorage).is_err());
}

// ─── Wire helper Tests ───────────────────────────────────

#[wasm_bindgen_test]
fn unauthorized_status_maps_to_auth_error() {
    let err = error_from_response(401, "Unauthorized", r#"{"detail":"login required"}"#);
    assert_eq!(err, ChatError::Unauthorized("login required".to_string()));
}

#[wasm_bindgen_test]
fn login_envelope_parses() {
    let reply = parse_auth_envelope(
        r#"{"success":true,"message":"ok","data":{"id":3,"name":"Kim","email":"kim@example.com"}}"#,
    )
    .unwrap();
    assert_eq!(reply.identity.id, 3);
    assert_eq!(reply.message.as_deref(), Some("ok"));
}

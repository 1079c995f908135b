//! Chat App — WASM entry point.
//!
//! This crate is the composition root (DI wiring layer).
//! It assembles the platform adapters, hands them to the stores, and
//! exports the result to JavaScript presentation code as [`ChatClient`].

mod app;

pub use app::ChatClient;

use wasm_bindgen::prelude::*;

/// Runs once when the module is instantiated
#[wasm_bindgen(start)]
pub fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Chat client module loaded");
}

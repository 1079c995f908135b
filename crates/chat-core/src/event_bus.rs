//! Simple event bus for decoupled communication between the stores and UI.
//!
//! The bus is single-threaded (WASM constraint) and uses interior mutability
//! via RefCell. Events are buffered and drained by the presentation layer.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use chat_types::event::{Notice, StoreEvent};

/// Shared event bus — clone-cheap via Rc.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<RefCell<VecDeque<StoreEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    /// Publish an event. Called by the stores.
    pub fn emit(&self, event: StoreEvent) {
        self.inner.borrow_mut().push_back(event);
    }

    pub fn notify(&self, notice: Notice) {
        self.emit(StoreEvent::Notice(notice));
    }

    /// Drain all pending events. Called by the presentation layer.
    pub fn drain(&self) -> Vec<StoreEvent> {
        self.inner.borrow_mut().drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.inner.borrow().is_empty()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

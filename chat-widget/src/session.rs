use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use dioxus_logger::tracing::{info, warn};
use widget_types::SessionId;

/// Per-tab key/value storage holding the session identifier.
pub trait SessionStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}

/// Returns the stored identifier, generating and storing one on first use.
pub fn load_or_create_session_id<S: SessionStore>(
    store: &S,
    key: &str,
    now: DateTime<Utc>,
) -> SessionId {
    if let Some(existing) = store.get_item(key).and_then(SessionId::from_stored) {
        return existing;
    }

    let session_id = SessionId::generate(now);
    store.set_item(key, session_id.as_str());
    info!("Started chat session {}", session_id);
    session_id
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        self.items.borrow_mut().clear();
    }
}

impl SessionStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

/// `window.sessionStorage`, with an in-memory fallback when the browser
/// refuses storage access (privacy modes, sandboxed iframes, quota).
#[derive(Debug, Clone, Default)]
pub struct BrowserSessionStorage {
    fallback: MemoryStore,
}

impl BrowserSessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn session_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|window| window.session_storage().ok().flatten())
}

impl SessionStore for BrowserSessionStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        session_storage()
            .and_then(|storage| storage.get_item(key).ok().flatten())
            .or_else(|| self.fallback.get_item(key))
    }

    fn set_item(&self, key: &str, value: &str) {
        let stored = session_storage()
            .map(|storage| storage.set_item(key, value).is_ok())
            .unwrap_or(false);

        if !stored {
            warn!("sessionStorage unavailable, keeping {} in memory", key);
            self.fallback.set_item(key, value);
        }
    }

    fn remove_item(&self, key: &str) {
        if let Some(storage) = session_storage() {
            let _ = storage.remove_item(key);
        }
        self.fallback.remove_item(key);
    }
}

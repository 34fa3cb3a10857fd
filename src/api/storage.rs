//! Persistence for the current session so it survives a reload

use std::cell::RefCell;

use crate::models::Session;

#[cfg(target_arch = "wasm32")]
pub const SESSION_STORAGE_KEY: &str = "enterprise-portal.auth.session";

pub trait SessionStorage {
    fn load(&self) -> Option<Session>;
    fn save(&self, session: &Session);
    fn clear(&self);
}

/// Keeps the session for the lifetime of the process only
#[derive(Default)]
pub struct MemorySessionStorage {
    session: RefCell<Option<Session>>,
}

#[cfg(test)]
impl MemorySessionStorage {
    pub fn with_session(session: Session) -> Self {
        MemorySessionStorage { session: RefCell::new(Some(session)) }
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    fn save(&self, session: &Session) {
        *self.session.borrow_mut() = Some(session.clone());
    }

    fn clear(&self) {
        self.session.borrow_mut().take();
    }
}

/// Browser `localStorage`, JSON encoded
#[cfg(target_arch = "wasm32")]
#[derive(Default)]
pub struct BrowserSessionStorage;

#[cfg(target_arch = "wasm32")]
impl BrowserSessionStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

#[cfg(target_arch = "wasm32")]
impl SessionStorage for BrowserSessionStorage {
    fn load(&self) -> Option<Session> {
        let raw = Self::storage()?.get_item(SESSION_STORAGE_KEY).ok()??;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!("Discarding unreadable stored session: {}", e);
                self.clear();
                None
            }
        }
    }

    fn save(&self, session: &Session) {
        let Some(storage) = Self::storage() else { return };
        match serde_json::to_string(session) {
            Ok(raw) => {
                if storage.set_item(SESSION_STORAGE_KEY, &raw).is_err() {
                    tracing::warn!("Failed to persist session");
                }
            }
            Err(e) => tracing::warn!("Failed to encode session: {}", e),
        }
    }

    fn clear(&self) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(SESSION_STORAGE_KEY);
        }
    }
}

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use uuid::Uuid;

use crate::models::{Profile, Session, User};

/// Process-wide authentication state
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    user: Option<User>,
    session: Option<Session>,
    profile: Option<Profile>,
    loading: bool,
}

/// Starts out loading, before the first restore or notification resolves
impl Default for AuthState {
    fn default() -> Self {
        AuthState {
            user: None,
            session: None,
            profile: None,
            loading: true,
        }
    }
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[allow(dead_code)]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some() && self.user.is_some()
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.id)
    }

    /// Replace session and user together. The profile is kept only while the
    /// user stays the same.
    pub(crate) fn set_session(&mut self, session: Option<Session>) {
        let user = session.as_ref().map(|s| s.user.clone());
        if user.as_ref().map(|u| u.id) != self.user_id() {
            self.profile = None;
        }
        self.user = user;
        self.session = session;
    }

    pub(crate) fn set_profile(&mut self, profile: Profile) {
        self.profile = Some(profile);
    }

    pub(crate) fn clear_session(&mut self) {
        self.user = None;
        self.session = None;
        self.profile = None;
    }

    pub(crate) fn finish_loading(&mut self) {
        self.loading = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Rc<dyn Fn(&AuthState)>;

/// Owned container for [`AuthState`] with subscribe/notify.
///
/// Clones share the same state. Only the session manager writes to it.
#[derive(Clone, Default)]
pub struct AuthStore {
    inner: Rc<AuthStoreInner>,
}

#[derive(Default)]
struct AuthStoreInner {
    state: RefCell<AuthState>,
    observers: RefCell<Vec<(ObserverId, Observer)>>,
    next_id: Cell<u64>,
}

impl AuthStore {
    pub fn current_state(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&AuthState) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    pub fn subscribe(&self, observer: impl Fn(&AuthState) + 'static) -> ObserverId {
        let id = ObserverId(self.inner.next_id.get());
        self.inner.next_id.set(self.inner.next_id.get() + 1);
        self.inner.observers.borrow_mut().push((id, Rc::new(observer)));
        id
    }

    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.inner.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(observer, _)| *observer != id);
        observers.len() != before
    }

    #[cfg(test)]
    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    /// Apply a transition and notify every observer with the new state.
    /// Observers run after the borrow is released, so they may read the store.
    pub(crate) fn update(&self, transition: impl FnOnce(&mut AuthState)) {
        let snapshot = {
            let mut state = self.inner.state.borrow_mut();
            transition(&mut state);
            state.clone()
        };

        let observers: Vec<Observer> = self
            .inner
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();

        for observer in observers {
            observer(&snapshot);
        }
    }
}

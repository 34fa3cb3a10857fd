//! Bridge between the session manager and the component tree

use dioxus::core::spawn_forever;
use dioxus::prelude::*;

use crate::state::{AuthHandle, AuthState, ObserverId, SessionManager};

/// Provided once at the app root. Components read the state through it and
/// re-render on every transition; they never write it.
#[derive(Clone)]
pub struct AuthContext {
    state: Signal<AuthState>,
    handle: AuthHandle,
    observer: ObserverId,
}

impl AuthContext {
    /// Current state; subscribes the calling component to changes
    pub fn state(&self) -> AuthState {
        self.state.read().clone()
    }

    pub fn handle(&self) -> &AuthHandle {
        &self.handle
    }
}

/// Build the session manager once for the calling scope, mirror its state
/// into a signal and start its run loop. Dropping the scope asks the loop to
/// stop, and the loop releases the backend listener on its way out.
pub fn use_auth_provider(build: impl FnOnce() -> (SessionManager, AuthHandle)) -> AuthContext {
    let context = use_hook(move || {
        let (manager, handle) = build();
        let mirror = Signal::new(handle.current_state());

        let observer = handle.subscribe(move |state| {
            let mut mirror = mirror;
            mirror.set(state.clone());
        });
        // Outlives the scope so a shutdown still reaches the listener release
        let _ = spawn_forever(manager.run());

        AuthContext {
            state: mirror,
            handle,
            observer,
        }
    });

    let teardown = context.clone();
    use_drop(move || {
        teardown.handle.unsubscribe(teardown.observer);
        teardown.handle.shutdown();
    });

    use_context_provider(move || context)
}

//! Session state manager
//!
//! A single run loop owns every write to the [`AuthStore`]. It multiplexes
//! the identity backend's notification feed, the one-off session restore,
//! in-flight profile lookups and commands from [`AuthHandle`]s.

use std::rc::Rc;

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::{ApiError, AuthError, IdentityBackend, ProfileStore};
use crate::models::{Profile, Session};
use crate::state::{AuthState, AuthStore, ObserverId};

enum Command {
    SignOut { done: oneshot::Sender<()> },
    Shutdown,
}

struct ProfileLookup {
    user_id: Uuid,
    result: Result<Option<Profile>, ApiError>,
}

pub struct SessionManager {
    store: AuthStore,
    backend: Rc<dyn IdentityBackend>,
    profiles: Rc<dyn ProfileStore>,
    commands: UnboundedReceiver<Command>,
}

/// Read access to the auth state plus the session operations components need.
#[derive(Clone)]
pub struct AuthHandle {
    store: AuthStore,
    backend: Rc<dyn IdentityBackend>,
    commands: UnboundedSender<Command>,
}

impl SessionManager {
    pub fn new(backend: Rc<dyn IdentityBackend>, profiles: Rc<dyn ProfileStore>) -> (Self, AuthHandle) {
        let store = AuthStore::default();
        let (tx, rx) = unbounded();

        let handle = AuthHandle {
            store: store.clone(),
            backend: Rc::clone(&backend),
            commands: tx,
        };

        let manager = SessionManager {
            store,
            backend,
            profiles,
            commands: rx,
        };

        (manager, handle)
    }

    /// Drive the state machine until shutdown, then release the backend
    /// listener.
    pub async fn run(self) {
        let SessionManager {
            store,
            backend,
            profiles,
            mut commands,
        } = self;

        // Listen first so a change between the restore and the subscription
        // cannot be lost.
        let subscription = backend.on_auth_state_change();
        let subscription_id = subscription.id;
        let mut events = subscription.events;

        let mut restore = backend.get_session().fuse();
        let mut lookups: FuturesUnordered<LocalBoxFuture<'static, ProfileLookup>> = FuturesUnordered::new();

        // Set once a notification or sign-out has been applied; a restore
        // that resolves afterwards is older news.
        let mut superseded = false;

        loop {
            futures::select! {
                restored = restore => {
                    let session = restored.unwrap_or_else(|e| {
                        warn!("Session restore failed, continuing signed out: {}", e);
                        None
                    });

                    if superseded {
                        debug!("Discarding restored session, a newer notification was applied");
                        if store.read(|s| s.is_loading()) {
                            store.update(|s| s.finish_loading());
                        }
                    } else {
                        info!("Initial session check: {:?}", session.as_ref().map(|s| s.user.id));
                        if let Some(lookup) = apply_session(&store, &profiles, session) {
                            lookups.push(lookup);
                        }
                    }
                }
                event = events.next() => match event {
                    Some(event) => {
                        debug!("Auth state change: {} {:?}", event.kind, event.session.as_ref().map(|s| s.user.id));
                        superseded = true;
                        if let Some(lookup) = apply_session(&store, &profiles, event.session) {
                            lookups.push(lookup);
                        }
                    }
                    None => {
                        info!("Identity backend closed its notification feed");
                        break;
                    }
                },
                command = commands.next() => match command {
                    Some(Command::SignOut { done }) => {
                        // Notifications already queued predate the sign-out
                        while let Ok(Some(event)) = events.try_next() {
                            debug!("Discarding {} notification queued before sign-out", event.kind);
                        }
                        superseded = true;
                        store.update(|s| s.clear_session());
                        let _ = done.send(());
                    }
                    Some(Command::Shutdown) | None => break,
                },
                lookup = lookups.select_next_some() => apply_profile(&store, lookup),
            }
        }

        backend.unsubscribe(subscription_id);
        debug!("Session manager stopped");
    }
}

/// Publish the new session, then hand back the profile lookup it needs.
/// The lookup is only polled after observers have seen the transition.
fn apply_session(
    store: &AuthStore,
    profiles: &Rc<dyn ProfileStore>,
    session: Option<Session>,
) -> Option<LocalBoxFuture<'static, ProfileLookup>> {
    let user_id = session.as_ref().map(|s| s.user.id);

    store.update(|state| {
        match session {
            Some(session) => state.set_session(Some(session)),
            None => state.clear_session(),
        }
        state.finish_loading();
    });

    user_id.map(|id| resolve_profile(Rc::clone(profiles), id).boxed_local())
}

async fn resolve_profile(profiles: Rc<dyn ProfileStore>, user_id: Uuid) -> ProfileLookup {
    let result = fetch_profile(profiles.as_ref(), user_id).await;
    ProfileLookup { user_id, result }
}

/// Profile row merged with the display name; a failed name lookup falls
/// back to the placeholder name instead of failing the profile.
async fn fetch_profile(profiles: &dyn ProfileStore, user_id: Uuid) -> Result<Option<Profile>, ApiError> {
    let Some(record) = profiles.get_by_user_id(user_id).await? else {
        return Ok(None);
    };

    let credentials = match profiles.get_name_by_employee_id(&record.employee_id).await {
        Ok(credentials) => credentials,
        Err(e) => {
            warn!("Name lookup for employee {} failed: {}", record.employee_id, e);
            None
        }
    };

    Ok(Some(Profile::from_records(record, credentials)))
}

fn apply_profile(store: &AuthStore, lookup: ProfileLookup) {
    if store.read(|s| s.user_id()) != Some(lookup.user_id) {
        debug!("Discarding stale profile lookup for user {}", lookup.user_id);
        return;
    }

    match lookup.result {
        Ok(Some(profile)) => {
            info!("Loaded profile {} for user {}", profile.employee_id, lookup.user_id);
            store.update(|s| s.set_profile(profile));
        }
        Ok(None) => warn!("No profile record for user {}", lookup.user_id),
        Err(e) => warn!("Profile lookup for user {} failed: {}", lookup.user_id, e),
    }
}

impl AuthHandle {
    pub fn current_state(&self) -> AuthState {
        self.store.current_state()
    }

    pub fn subscribe(&self, observer: impl Fn(&AuthState) + 'static) -> ObserverId {
        self.store.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Credential check only; the state changes when the backend's
    /// notification reaches the run loop.
    pub async fn sign_in_with_password(&self, identifier: &str, secret: &str) -> Result<Session, AuthError> {
        let result = self.backend.sign_in_with_password(identifier, secret).await;
        match &result {
            Ok(session) => info!("Signed in as {}", session.user.id),
            Err(e) => info!("Sign-in rejected for {}: {}", identifier, e),
        }
        result
    }

    /// End the session. Local state is cleared even if the backend call fails,
    /// and is already cleared when this returns.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let result = self.backend.sign_out().await;
        if let Err(e) = &result {
            warn!("Backend sign-out failed, clearing local session anyway: {}", e);
        }

        let (done, cleared) = oneshot::channel();
        let applied = self.commands.unbounded_send(Command::SignOut { done }).is_ok() && cleared.await.is_ok();
        if !applied {
            // Run loop is gone, nothing else writes the store
            self.store.update(|s| s.clear_session());
        }

        info!("Signed out");
        result
    }

    pub fn shutdown(&self) {
        let _ = self.commands.unbounded_send(Command::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::auth::{AuthEventHub, AuthSubscription, SubscriptionId};
    use crate::models::{AuthEventKind, CredentialRecord, ProfileRecord, User};
    use async_trait::async_trait;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use tokio::task::LocalSet;

    fn session_for(id: u128) -> Session {
        Session {
            access_token: format!("token-{}", id),
            refresh_token: format!("refresh-{}", id),
            token_type: "bearer".to_string(),
            expires_at: i64::MAX,
            user: User {
                id: Uuid::from_u128(id),
                email: Some(format!("EMP{}@company.com", id)),
                user_metadata: serde_json::Value::Null,
            },
        }
    }

    #[derive(Default)]
    struct FakeIdentity {
        hub: AuthEventHub,
        restorable: RefCell<Option<Session>>,
        restore_gate: RefCell<Option<oneshot::Receiver<()>>>,
        restore_fails: Cell<bool>,
        sign_out_fails: Cell<bool>,
        calls: RefCell<Vec<&'static str>>,
    }

    #[async_trait(?Send)]
    impl IdentityBackend for FakeIdentity {
        async fn sign_in_with_password(&self, identifier: &str, secret: &str) -> Result<Session, AuthError> {
            if secret != "secret" {
                return Err(AuthError::InvalidCredentials);
            }
            let id = identifier.trim_start_matches("EMP").split('@').next().unwrap().parse().unwrap();
            let session = session_for(id);
            self.hub.emit(AuthEventKind::SignedIn, Some(session.clone()));
            Ok(session)
        }

        async fn sign_out(&self) -> Result<(), AuthError> {
            self.calls.borrow_mut().push("sign_out");
            if self.sign_out_fails.get() {
                return Err(AuthError::Api(ApiError::Network("connection reset".to_string())));
            }
            self.hub.emit(AuthEventKind::SignedOut, None);
            Ok(())
        }

        async fn get_session(&self) -> Result<Option<Session>, AuthError> {
            self.calls.borrow_mut().push("get_session");
            let gate = self.restore_gate.borrow_mut().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            if self.restore_fails.get() {
                return Err(AuthError::Api(ApiError::Network("offline".to_string())));
            }
            Ok(self.restorable.borrow().clone())
        }

        fn on_auth_state_change(&self) -> AuthSubscription {
            self.calls.borrow_mut().push("subscribe");
            self.hub.subscribe()
        }

        fn unsubscribe(&self, id: SubscriptionId) -> bool {
            self.hub.unsubscribe(id)
        }
    }

    #[derive(Default)]
    struct FakeProfiles {
        records: RefCell<HashMap<Uuid, ProfileRecord>>,
        names: RefCell<HashMap<String, String>>,
        gates: RefCell<HashMap<Uuid, oneshot::Receiver<()>>>,
        failing: RefCell<Vec<Uuid>>,
        name_lookup_fails: Cell<bool>,
    }

    impl FakeProfiles {
        fn insert(&self, id: u128, employee_id: &str, role: &str, name: Option<&str>) {
            self.records.borrow_mut().insert(
                Uuid::from_u128(id),
                ProfileRecord {
                    employee_id: employee_id.to_string(),
                    role: role.to_string(),
                    created_at: None,
                },
            );
            if let Some(name) = name {
                self.names.borrow_mut().insert(employee_id.to_string(), name.to_string());
            }
        }

        /// Hold the lookup for `id` until the returned sender fires
        fn hold(&self, id: u128) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.borrow_mut().insert(Uuid::from_u128(id), rx);
            tx
        }
    }

    #[async_trait(?Send)]
    impl ProfileStore for FakeProfiles {
        async fn get_by_user_id(&self, user_id: Uuid) -> Result<Option<ProfileRecord>, ApiError> {
            let gate = self.gates.borrow_mut().remove(&user_id);
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            if self.failing.borrow().contains(&user_id) {
                return Err(ApiError::Server("500: boom".to_string()));
            }
            Ok(self.records.borrow().get(&user_id).cloned())
        }

        async fn get_name_by_employee_id(&self, employee_id: &str) -> Result<Option<CredentialRecord>, ApiError> {
            if self.name_lookup_fails.get() {
                return Err(ApiError::Network("timeout".to_string()));
            }
            Ok(self
                .names
                .borrow()
                .get(employee_id)
                .map(|name| CredentialRecord { name: Some(name.clone()) }))
        }
    }

    struct Harness {
        identity: Rc<FakeIdentity>,
        profiles: Rc<FakeProfiles>,
        handle: AuthHandle,
        task: tokio::task::JoinHandle<()>,
    }

    fn start(identity: FakeIdentity, profiles: FakeProfiles) -> Harness {
        let identity = Rc::new(identity);
        let profiles = Rc::new(profiles);
        let (manager, handle) = SessionManager::new(identity.clone(), profiles.clone());
        let task = tokio::task::spawn_local(manager.run());
        Harness {
            identity,
            profiles,
            handle,
            task,
        }
    }

    /// Yield to the run loop until `check` holds
    async fn wait_for(handle: &AuthHandle, what: &str, check: impl Fn(&AuthState) -> bool) {
        for _ in 0..200 {
            if check(&handle.current_state()) {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("timed out waiting for {}: {:?}", what, handle.current_state());
    }

    async fn settle() {
        for _ in 0..50 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_restored_session_loads_profile() {
        LocalSet::new()
            .run_until(async {
                let identity = FakeIdentity::default();
                *identity.restorable.borrow_mut() = Some(session_for(1));
                let profiles = FakeProfiles::default();
                profiles.insert(1, "EMP1", "employee", Some("A. Smith"));

                let h = start(identity, profiles);
                wait_for(&h.handle, "profile", |s| s.profile().is_some()).await;

                let state = h.handle.current_state();
                assert_eq!(state.user_id(), Some(Uuid::from_u128(1)));
                assert!(state.session().is_some());
                assert!(!state.is_loading());
                let profile = state.profile().unwrap();
                assert_eq!(profile.employee_id, "EMP1");
                assert_eq!(profile.role, "employee");
                assert_eq!(profile.name, "A. Smith");
            })
            .await;
    }

    #[tokio::test]
    async fn test_no_restorable_session() {
        LocalSet::new()
            .run_until(async {
                let h = start(FakeIdentity::default(), FakeProfiles::default());
                wait_for(&h.handle, "bootstrap", |s| !s.is_loading()).await;

                let state = h.handle.current_state();
                assert!(state.user().is_none());
                assert!(state.session().is_none());
                assert!(state.profile().is_none());
            })
            .await;
    }

    #[tokio::test]
    async fn test_failed_restore_is_signed_out_not_loading() {
        LocalSet::new()
            .run_until(async {
                let identity = FakeIdentity::default();
                identity.restore_fails.set(true);

                let h = start(identity, FakeProfiles::default());
                wait_for(&h.handle, "bootstrap", |s| !s.is_loading()).await;
                assert!(h.handle.current_state().user().is_none());
            })
            .await;
    }

    #[tokio::test]
    async fn test_listener_registered_before_restore() {
        LocalSet::new()
            .run_until(async {
                let h = start(FakeIdentity::default(), FakeProfiles::default());
                wait_for(&h.handle, "bootstrap", |s| !s.is_loading()).await;

                assert_eq!(h.identity.calls.borrow()[..2], ["subscribe", "get_session"]);
            })
            .await;
    }

    #[tokio::test]
    async fn test_loading_clears_exactly_once() {
        LocalSet::new()
            .run_until(async {
                let identity = FakeIdentity::default();
                let (release_restore, gate) = oneshot::channel();
                *identity.restore_gate.borrow_mut() = Some(gate);

                let h = start(identity, FakeProfiles::default());
                let transitions = Rc::new(RefCell::new(Vec::new()));
                let sink = Rc::clone(&transitions);
                h.handle.subscribe(move |s| sink.borrow_mut().push(s.is_loading()));

                settle().await;
                assert!(h.handle.current_state().is_loading());

                // A notification arriving before the restore ends loading
                h.identity.hub.emit(AuthEventKind::SignedIn, Some(session_for(4)));
                wait_for(&h.handle, "sign-in", |s| !s.is_loading()).await;

                release_restore.send(()).unwrap();
                settle().await;
                h.identity.hub.emit(AuthEventKind::TokenRefreshed, Some(session_for(4)));
                h.identity.hub.emit(AuthEventKind::SignedOut, None);
                settle().await;

                let seen = transitions.borrow();
                assert!(!seen.is_empty());
                assert!(seen.iter().all(|loading| !loading));
                assert!(!h.handle.current_state().is_loading());
            })
            .await;
    }

    #[tokio::test]
    async fn test_late_restore_does_not_override_notification() {
        LocalSet::new()
            .run_until(async {
                let identity = FakeIdentity::default();
                let (release_restore, gate) = oneshot::channel();
                *identity.restore_gate.borrow_mut() = Some(gate);

                let h = start(identity, FakeProfiles::default());
                settle().await;

                h.identity.hub.emit(AuthEventKind::SignedIn, Some(session_for(5)));
                wait_for(&h.handle, "sign-in", |s| s.user_id().is_some()).await;

                // Restore resolves with the stale "no session" snapshot
                release_restore.send(()).unwrap();
                settle().await;

                assert_eq!(h.handle.current_state().user_id(), Some(Uuid::from_u128(5)));
            })
            .await;
    }

    #[tokio::test]
    async fn test_user_and_session_move_together() {
        LocalSet::new()
            .run_until(async {
                let h = start(FakeIdentity::default(), FakeProfiles::default());
                let consistent = Rc::new(Cell::new(true));
                let flag = Rc::clone(&consistent);
                h.handle.subscribe(move |s| {
                    if s.user().is_some() != s.session().is_some() {
                        flag.set(false);
                    }
                });

                wait_for(&h.handle, "bootstrap", |s| !s.is_loading()).await;
                for event in [
                    (AuthEventKind::SignedIn, Some(session_for(1))),
                    (AuthEventKind::TokenRefreshed, Some(session_for(1))),
                    (AuthEventKind::SignedOut, None),
                    (AuthEventKind::SignedIn, Some(session_for(2))),
                    (AuthEventKind::UserUpdated, Some(session_for(2))),
                ] {
                    h.identity.hub.emit(event.0, event.1);
                    settle().await;
                }

                assert!(consistent.get());
                assert_eq!(h.handle.current_state().user_id(), Some(Uuid::from_u128(2)));
            })
            .await;
    }

    #[tokio::test]
    async fn test_profile_pending_is_observed_before_profile() {
        LocalSet::new()
            .run_until(async {
                let profiles = FakeProfiles::default();
                profiles.insert(1, "EMP1", "employee", Some("A. Smith"));
                let release = profiles.hold(1);

                let h = start(FakeIdentity::default(), profiles);
                wait_for(&h.handle, "bootstrap", |s| !s.is_loading()).await;

                h.identity.hub.emit(AuthEventKind::SignedIn, Some(session_for(1)));
                wait_for(&h.handle, "sign-in", |s| s.user_id().is_some()).await;
                settle().await;
                assert!(h.handle.current_state().profile().is_none());

                release.send(()).unwrap();
                wait_for(&h.handle, "profile", |s| s.profile().is_some()).await;
            })
            .await;
    }

    #[tokio::test]
    async fn test_stale_profile_discarded_after_user_switch() {
        LocalSet::new()
            .run_until(async {
                let profiles = FakeProfiles::default();
                profiles.insert(1, "EMP1", "employee", Some("A. Smith"));
                profiles.insert(2, "EMP2", "admin", Some("B. Jones"));
                let release_u1 = profiles.hold(1);

                let h = start(FakeIdentity::default(), profiles);
                wait_for(&h.handle, "bootstrap", |s| !s.is_loading()).await;

                h.identity.hub.emit(AuthEventKind::SignedIn, Some(session_for(1)));
                settle().await;
                h.identity.hub.emit(AuthEventKind::SignedIn, Some(session_for(2)));
                wait_for(&h.handle, "U2 profile", |s| s.profile().is_some()).await;
                assert_eq!(h.handle.current_state().profile().unwrap().employee_id, "EMP2");

                release_u1.send(()).unwrap();
                settle().await;

                let state = h.handle.current_state();
                assert_eq!(state.user_id(), Some(Uuid::from_u128(2)));
                assert_eq!(state.profile().unwrap().employee_id, "EMP2");
            })
            .await;
    }

    #[tokio::test]
    async fn test_stale_profile_discarded_after_sign_out() {
        LocalSet::new()
            .run_until(async {
                let identity = FakeIdentity::default();
                *identity.restorable.borrow_mut() = Some(session_for(1));
                let profiles = FakeProfiles::default();
                profiles.insert(1, "EMP1", "employee", None);
                let release = profiles.hold(1);

                let h = start(identity, profiles);
                wait_for(&h.handle, "restore", |s| s.user_id().is_some()).await;

                h.handle.sign_out().await.unwrap();
                release.send(()).unwrap();
                settle().await;

                let state = h.handle.current_state();
                assert!(state.user().is_none());
                assert!(state.profile().is_none());
            })
            .await;
    }

    #[tokio::test]
    async fn test_profile_failure_leaves_profile_empty() {
        LocalSet::new()
            .run_until(async {
                let identity = FakeIdentity::default();
                *identity.restorable.borrow_mut() = Some(session_for(3));
                let profiles = FakeProfiles::default();
                profiles.insert(3, "EMP3", "employee", None);
                profiles.failing.borrow_mut().push(Uuid::from_u128(3));

                let h = start(identity, profiles);
                wait_for(&h.handle, "restore", |s| s.user_id().is_some()).await;
                settle().await;

                let state = h.handle.current_state();
                assert!(state.is_authenticated());
                assert!(state.profile().is_none());
                assert!(!state.is_loading());
            })
            .await;
    }

    #[tokio::test]
    async fn test_missing_profile_record_leaves_profile_empty() {
        LocalSet::new()
            .run_until(async {
                let identity = FakeIdentity::default();
                *identity.restorable.borrow_mut() = Some(session_for(8));

                let h = start(identity, FakeProfiles::default());
                wait_for(&h.handle, "restore", |s| s.user_id().is_some()).await;
                settle().await;
                assert!(h.handle.current_state().profile().is_none());
            })
            .await;
    }

    #[tokio::test]
    async fn test_name_lookup_failure_defaults_to_unknown() {
        LocalSet::new()
            .run_until(async {
                let identity = FakeIdentity::default();
                *identity.restorable.borrow_mut() = Some(session_for(1));
                let profiles = FakeProfiles::default();
                profiles.insert(1, "EMP1", "superadmin", Some("A. Smith"));
                profiles.name_lookup_fails.set(true);

                let h = start(identity, profiles);
                wait_for(&h.handle, "profile", |s| s.profile().is_some()).await;

                let state = h.handle.current_state();
                let profile = state.profile().unwrap();
                assert_eq!(profile.name, "Unknown");
                assert_eq!(profile.role, "superadmin");
            })
            .await;
    }

    #[tokio::test]
    async fn test_sign_out_clears_even_when_backend_fails() {
        LocalSet::new()
            .run_until(async {
                let identity = FakeIdentity::default();
                *identity.restorable.borrow_mut() = Some(session_for(1));
                identity.sign_out_fails.set(true);
                let profiles = FakeProfiles::default();
                profiles.insert(1, "EMP1", "employee", Some("A. Smith"));

                let h = start(identity, profiles);
                wait_for(&h.handle, "profile", |s| s.profile().is_some()).await;

                let result = h.handle.sign_out().await;
                assert!(matches!(result, Err(AuthError::Api(ApiError::Network(_)))));

                let state = h.handle.current_state();
                assert!(state.user().is_none());
                assert!(state.session().is_none());
                assert!(state.profile().is_none());
                assert_eq!(h.identity.calls.borrow().last(), Some(&"sign_out"));
            })
            .await;
    }

    #[tokio::test]
    async fn test_queued_sign_in_does_not_undo_sign_out() {
        LocalSet::new()
            .run_until(async {
                let identity = FakeIdentity::default();
                identity.sign_out_fails.set(true);
                let h = start(identity, FakeProfiles::default());
                wait_for(&h.handle, "bootstrap", |s| !s.is_loading()).await;

                let mut restored_after_sign_out = 0;
                for round in 0..40u128 {
                    // Still queued when the sign-out command lands
                    h.identity.hub.emit(AuthEventKind::SignedIn, Some(session_for(round + 1)));
                    assert!(h.handle.sign_out().await.is_err());
                    settle().await;

                    let state = h.handle.current_state();
                    if state.user().is_some() || state.session().is_some() {
                        restored_after_sign_out += 1;
                    }
                }

                assert_eq!(restored_after_sign_out, 0);
            })
            .await;
    }

    #[tokio::test]
    async fn test_sign_out_after_shutdown_still_clears() {
        LocalSet::new()
            .run_until(async {
                let identity = FakeIdentity::default();
                *identity.restorable.borrow_mut() = Some(session_for(1));

                let h = start(identity, FakeProfiles::default());
                wait_for(&h.handle, "restore", |s| s.user_id().is_some()).await;

                h.handle.shutdown();
                h.task.await.unwrap();

                h.handle.sign_out().await.unwrap();
                assert!(h.handle.current_state().user().is_none());
            })
            .await;
    }

    #[tokio::test]
    async fn test_sign_in_goes_through_notification() {
        LocalSet::new()
            .run_until(async {
                let profiles = FakeProfiles::default();
                profiles.insert(6, "EMP6", "employee", Some("C. Doe"));
                let h = start(FakeIdentity::default(), profiles);
                wait_for(&h.handle, "bootstrap", |s| !s.is_loading()).await;

                let rejected = h.handle.sign_in_with_password("EMP6@company.com", "wrong").await;
                assert_eq!(rejected, Err(AuthError::InvalidCredentials));
                settle().await;
                assert!(h.handle.current_state().user().is_none());

                h.handle.sign_in_with_password("EMP6@company.com", "secret").await.unwrap();
                wait_for(&h.handle, "profile", |s| s.profile().is_some()).await;
                assert_eq!(h.handle.current_state().profile().unwrap().name, "C. Doe");
            })
            .await;
    }

    #[tokio::test]
    async fn test_shutdown_releases_backend_listener() {
        LocalSet::new()
            .run_until(async {
                let h = start(FakeIdentity::default(), FakeProfiles::default());
                wait_for(&h.handle, "bootstrap", |s| !s.is_loading()).await;
                assert_eq!(h.identity.hub.listener_count(), 1);

                h.handle.shutdown();
                h.task.await.unwrap();
                assert_eq!(h.identity.hub.listener_count(), 0);
            })
            .await;
    }

    #[tokio::test]
    async fn test_shutdown_then_drop_releases_backend_listener() {
        LocalSet::new()
            .run_until(async {
                let h = start(FakeIdentity::default(), FakeProfiles::default());
                let Harness { identity, handle, task, .. } = h;
                wait_for(&handle, "bootstrap", |s| !s.is_loading()).await;

                // Owner goes away right after asking the loop to stop
                handle.shutdown();
                drop(handle);
                task.await.unwrap();

                assert_eq!(identity.hub.listener_count(), 0);
            })
            .await;
    }

    #[tokio::test]
    async fn test_dropping_all_handles_stops_manager() {
        LocalSet::new()
            .run_until(async {
                let h = start(FakeIdentity::default(), FakeProfiles::default());
                let Harness { identity, handle, task, .. } = h;

                drop(handle);
                task.await.unwrap();
                assert_eq!(identity.hub.listener_count(), 0);
            })
            .await;
    }
}

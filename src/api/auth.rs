//! Identity backend: password sign-in, sign-out, session restore and the
//! change-notification feed.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use thiserror::Error;

use crate::api::storage::SessionStorage;
use crate::api::{ApiClient, ApiError};
use crate::models::{AuthEvent, AuthEventKind, RefreshRequest, Session, SignInRequest, TokenResponse};

/// Sessions this close to expiry are refreshed before being restored
const REFRESH_MARGIN_SECS: i64 = 30;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AuthError {
    /// Message shown on the login form
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Invalid credentials. Please try again.",
            _ => "An unexpected error occurred. Please try again.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Registered listener: its id and the feed of change notifications
pub struct AuthSubscription {
    pub id: SubscriptionId,
    pub events: UnboundedReceiver<AuthEvent>,
}

#[async_trait(?Send)]
pub trait IdentityBackend {
    async fn sign_in_with_password(&self, identifier: &str, secret: &str) -> Result<Session, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// The restorable session, if any
    async fn get_session(&self) -> Result<Option<Session>, AuthError>;

    fn on_auth_state_change(&self) -> AuthSubscription;

    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// Fan-out of auth events to registered listeners
#[derive(Default)]
pub struct AuthEventHub {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(SubscriptionId, UnboundedSender<AuthEvent>)>>,
}

impl AuthEventHub {
    pub fn subscribe(&self) -> AuthSubscription {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);

        let (tx, rx) = unbounded();
        self.listeners.borrow_mut().push((id, tx));
        AuthSubscription { id, events: rx }
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener, _)| *listener != id);
        listeners.len() != before
    }

    /// Deliver to every listener, dropping those whose receiver is gone.
    pub fn emit(&self, kind: AuthEventKind, session: Option<Session>) {
        tracing::debug!("Auth event {} for {:?}", kind, session.as_ref().map(|s| s.user.id));
        self.listeners.borrow_mut().retain(|(_, tx)| {
            tx.unbounded_send(AuthEvent { kind, session: session.clone() }).is_ok()
        });
    }

    #[cfg(test)]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

/// GoTrue-compatible identity API
pub struct GoTrueBackend {
    client: ApiClient,
    storage: Rc<dyn SessionStorage>,
    hub: AuthEventHub,
}

impl GoTrueBackend {
    pub fn new(client: ApiClient, storage: Rc<dyn SessionStorage>) -> Self {
        GoTrueBackend { client, storage, hub: AuthEventHub::default() }
    }

    fn store(&self, session: &Session) {
        self.storage.save(session);
        self.client.set_token(Some(session.access_token.clone()));
    }

    fn forget(&self) {
        self.storage.clear();
        self.client.set_token(None);
    }

    async fn refresh(&self, session: &Session) -> Result<Option<Session>, AuthError> {
        let request = RefreshRequest { refresh_token: session.refresh_token.clone() };
        let result: Result<TokenResponse, ApiError> = self
            .client
            .post("/auth/v1/token?grant_type=refresh_token", &request)
            .await;

        match result {
            Ok(response) => {
                let refreshed = response.into_session(chrono::Utc::now().timestamp());
                self.store(&refreshed);
                self.hub.emit(AuthEventKind::TokenRefreshed, Some(refreshed.clone()));
                Ok(Some(refreshed))
            }
            Err(ApiError::BadRequest(_)) | Err(ApiError::Unauthorized) => {
                tracing::info!("Stored session for {} could not be refreshed", session.user.id);
                self.forget();
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait(?Send)]
impl IdentityBackend for GoTrueBackend {
    async fn sign_in_with_password(&self, identifier: &str, secret: &str) -> Result<Session, AuthError> {
        let request = SignInRequest {
            email: identifier.to_string(),
            password: secret.to_string(),
        };

        let response: TokenResponse = self
            .client
            .post("/auth/v1/token?grant_type=password", &request)
            .await
            .map_err(|e| match e {
                ApiError::BadRequest(_) | ApiError::Unauthorized => AuthError::InvalidCredentials,
                other => AuthError::Api(other),
            })?;

        let session = response.into_session(chrono::Utc::now().timestamp());
        self.store(&session);
        self.hub.emit(AuthEventKind::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let result = if self.client.get_token().is_some() {
            self.client.post_no_response("/auth/v1/logout").await
        } else {
            Ok(())
        };

        // Local credentials go regardless of what the backend said
        self.forget();
        self.hub.emit(AuthEventKind::SignedOut, None);
        result.map_err(AuthError::from)
    }

    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        let Some(session) = self.storage.load() else {
            return Ok(None);
        };

        if session.expires_within(chrono::Utc::now().timestamp(), REFRESH_MARGIN_SECS) {
            return self.refresh(&session).await;
        }

        self.client.set_token(Some(session.access_token.clone()));
        Ok(Some(session))
    }

    fn on_auth_state_change(&self) -> AuthSubscription {
        self.hub.subscribe()
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.hub.unsubscribe(id)
    }
}

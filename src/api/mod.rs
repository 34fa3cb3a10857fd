pub mod client;
pub mod auth;
pub mod profiles;
pub mod storage;

pub use client::*;
pub use auth::{AuthError, GoTrueBackend, IdentityBackend};
pub use profiles::{ProfileStore, RestProfileStore};

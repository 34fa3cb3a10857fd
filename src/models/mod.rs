pub mod auth;
pub mod policy;

pub use auth::*;
pub use policy::*;

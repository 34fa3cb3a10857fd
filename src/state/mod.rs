pub mod auth;
pub mod context;
pub mod gate;
pub mod session;

pub use auth::*;
pub use context::*;
pub use gate::*;
pub use session::*;

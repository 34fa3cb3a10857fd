pub mod common;
pub mod dashboard;
pub mod header;
pub mod login;
pub mod protected;

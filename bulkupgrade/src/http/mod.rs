//! Controller HTTP API

pub mod client;
pub mod inventory;
pub mod session;
pub mod software;

//! Authentication state and the operations that change it.
//!
//! `Session` holds the token/user pair and mirrors it to durable storage.
//! `SessionStore` layers the network operations (login, profile refresh,
//! logout) on top of it.

pub mod state;
pub mod store;

pub use state::{SessionPhase, SessionSnapshot, Session, TOKEN_KEY, USER_KEY};
pub use store::SessionStore;

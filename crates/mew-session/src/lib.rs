//! # mew-session
//!
//! The player session behind the operator console. [`Player`] implements
//! the runtime's `Session` interface: it publishes the login hooks, keeps
//! the session ticket, and forwards evolution requests. Remote I/O goes
//! through an [`AuthBackend`]; [`LocalAuthBackend`] serves the credentials
//! stored in the configuration for offline use.

pub mod backend;
pub mod local;
pub mod player;

pub use backend::{AuthBackend, GoogleGrant, SessionTicket};
pub use local::LocalAuthBackend;
pub use player::Player;

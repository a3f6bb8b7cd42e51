//! Calculator form: view, submit, reset, plus per-session result storage

pub mod dto;
pub mod handlers;
pub mod session;

pub use dto::*;
pub use handlers::*;
pub use session::{FormSessions, SessionId, SESSION_COOKIE};

mod inputs;
mod service;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use service::SessionService;

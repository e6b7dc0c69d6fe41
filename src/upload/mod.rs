//! Upload sessions
//!
//! This module provides the selected-file type, the session aggregate and
//! the controller that drives a session from file selection to a
//! broadcast transaction.

pub mod controller;
pub mod file;
pub mod session;

pub use controller::UploadSessionController;
pub use file::{FileRef, DEFAULT_MIME_TYPE};
pub use session::{Phase, SessionState, UploadSession};

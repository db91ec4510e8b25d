//! Durable storage for coursewise.
//!
//! [`TursoStore`] implements the engine's [`PreferenceStore`] and the chat
//! layer's [`SessionStore`] on libSQL. It can connect to:
//! - a remote Turso database
//! - a local embedded SQLite file
//! - an in-memory database (tests)
//!
//! [`PreferenceStore`]: coursewise_core::PreferenceStore
//! [`SessionStore`]: coursewise_core::SessionStore

mod error;
mod turso;

pub use error::{Error, Result};
pub use turso::TursoStore;

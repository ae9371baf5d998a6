//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `CredentialBundle`: access/refresh tokens plus role and subject id
//! - `SessionStore`: login, logout, restore and token refresh
//! - `CredentialStorage`: where the bundle is persisted (file, keychain, memory)
//!
//! The bundle is persisted as JSON under a single key so a restart does not
//! force a new login.

pub mod bundle;
pub mod session;
pub mod storage;

pub use bundle::{CredentialBundle, Role};
pub use session::{SessionStore, REFRESH_TOKEN_PATH, SESSION_KEY};
pub use storage::{CredentialStorage, FileStorage, KeyringStorage, MemoryStorage};

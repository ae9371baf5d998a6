//! Core library for eventdesk.
//!
//! Session lifecycle and authenticated access to the event-management
//! backend: the credential store with transparent token refresh, the
//! gateway that attaches bearer tokens and redirects to login when a
//! session cannot be recovered, and a CRUD client for dashboard content.

pub mod api;
pub mod auth;
pub mod config;
pub mod desk;
pub mod models;
pub mod navigation;

#[cfg(test)]
pub(crate) mod testing;

pub use desk::EventDesk;

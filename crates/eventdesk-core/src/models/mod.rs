//! Data models for eventdesk content.
//!
//! - `ContentKind`: the content types managed through the dashboards
//! - `Event`: participant-facing event fields
//!
//! Admin records of other kinds are passed around as raw JSON objects.

pub mod content;
pub mod event;

pub use content::ContentKind;
pub use event::{sort_by_start, Event};

//! REST client layer for the eventdesk backend.
//!
//! - `Transport`: the network seam (`ReqwestTransport` in production)
//! - `Gateway`: attaches the bearer token and enforces redirect-on-401
//! - `AuthApi`: login/logout against `/api/login/`
//! - `ContentClient`: uniform CRUD over every dashboard content type
//!
//! Successful responses use a `{success, data, message?}` envelope.

pub mod account;
pub mod content;
pub mod envelope;
pub mod error;
pub mod gateway;
pub mod transport;

pub use account::AuthApi;
pub use content::ContentClient;
pub use envelope::Envelope;
pub use error::{ApiError, GatewayError, TransportError};
pub use gateway::Gateway;
pub use transport::{ApiRequest, ApiResponse, FormPart, PreparedRequest, RequestBody, ReqwestTransport, Transport};

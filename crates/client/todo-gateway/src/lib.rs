//! Outbound HTTP for the to-do client.
//!
//! [`Gateway`] is the only type in the workspace that talks to the network.
//! It attaches a bearer token to every request when one can be found and
//! hands error responses back untouched as [`GatewayError::Status`].

mod client;
mod config;
mod credentials;
mod error;

pub use client::Gateway;
pub use config::{ApiConfig, DEFAULT_API_BASE_URL};
pub use credentials::{NoSession, TokenSource};
pub use error::{GatewayError, GatewayResult};

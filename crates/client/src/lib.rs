//! `tiffin-client`
//!
//! **Responsibility:** drive one invoice-creation attempt against the REST
//! backend.
//!
//! This crate provides:
//! - Client configuration (API URL, bearer token, timeout)
//! - Gateway traits for the backend collaborators (tax settings, payment
//!   methods, create-invoice) and a `reqwest` implementation
//! - `InvoiceSession`, which owns the draft and performs the single in-flight
//!   submission
//!
//! The backend remains the authority; nothing is persisted client-side.

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod session;

pub use config::ClientConfig;
pub use error::{ConfigError, GENERIC_NETWORK_ERROR, SessionError, TransportError};
pub use gateway::{CreatedInvoice, InvoiceGateway, SettingsGateway};
pub use http::HttpGateway;
pub use session::InvoiceSession;

//! Synchronous client core for the Mobile Giving Foundation donation service.
//!
//! # Overview
//! Submits donations, polls their status and lists historical transactions.
//! MGF answers in XML, in three different shapes depending on the call; this
//! crate turns all of them into one `Transaction` / `Message` model and turns
//! the numeric result codes into typed `MgfError` variants.
//!
//! # Design
//! - `MobileGivingClient` is stateless; it holds only `ClientConfig`.
//! - Each operation is split into `build_*` (produces an `HttpRequest`) and
//!   `parse_*` (consumes an `HttpResponse`), so the I/O boundary is explicit.
//! - `DonationService` drives one round trip per call through any
//!   `Transport`; `UreqTransport` is the bundled one (feature `ureq`).
//! - Every response is classified before it is normalized, and a call either
//!   returns a complete result or an error. Nothing is retried or cached.

pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod normalize;
pub mod service;
#[cfg(feature = "ureq")]
pub mod transport;
pub mod types;
mod xml;

pub use client::{normalize_phone_number, parse_status_callback, MobileGivingClient};
pub use config::ClientConfig;
pub use error::{MgfError, Result};
pub use http::{HttpRequest, HttpResponse, Transport};
pub use service::DonationService;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{DonationStatus, Message, Transaction};

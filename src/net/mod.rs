//! HTTP transport and typed REST API surface.
//!
//! DESIGN
//! ======
//! `client` owns credential attachment and 401 recovery; the endpoint
//! modules (`auth`, `organizations`, `accounting`, `reports`) are thin typed
//! wrappers that never touch tokens themselves.

pub mod accounting;
pub mod auth;
pub mod client;
pub mod organizations;
pub mod reports;

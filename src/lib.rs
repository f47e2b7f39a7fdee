//! Client core of the Opera accounting application.
//!
//! ARCHITECTURE
//! ============
//! This crate is the state and transport layer a front-end shell drives: it
//! owns the authentication session lifecycle (token storage, proactive
//! refresh scheduling, request-level 401 recovery), the organization and tab
//! context, route guarding, and typed access to the backend REST API. UI
//! rendering lives elsewhere.
//!
//! Components are split by domain so consumers can depend on small focused
//! pieces: `state` for stores, `net` for the HTTP wrapper and endpoint
//! modules, `router` for navigation, `storage` for the persistence seam
//! shared by all of them.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod net;
pub mod router;
pub mod state;
pub mod storage;
pub mod token;

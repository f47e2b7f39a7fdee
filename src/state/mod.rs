//! Client-side state stores.
//!
//! DESIGN
//! ======
//! State is split by domain (`auth`, `organizations`, `tabs`) so consumers
//! can depend on small focused stores. Each store is a cheap `Clone` handle
//! over shared inner state; mutations publish through watch channels where
//! consumers need to observe changes rather than poll.

pub mod auth;
pub mod organizations;
pub mod tabs;

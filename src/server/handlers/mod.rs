//! HTTP handlers for the server.

pub mod cards;
pub mod templates;

//! HTTP handlers.

pub mod attempts;
pub mod invite;

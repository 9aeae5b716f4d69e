//! Configuration: environment helpers and per-call-site photo policies.

pub mod app;
pub mod env;
pub mod photo;

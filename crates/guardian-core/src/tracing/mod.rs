//! Observability for the guardian store.
//! `tracing` crate with `EnvFilter`, per-target log levels, and named spans.

pub mod setup;
pub mod spans;

pub use setup::{init_tracing, init_tracing_with_config, init_tracing_with_filter};

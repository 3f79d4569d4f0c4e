//! Chat backend implementations.
//!
//! `api::build(config)` is the factory — called at startup.
//! Adding a new backend = new module + new match arm there.

pub mod dummy;
pub mod http;

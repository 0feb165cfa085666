//! Application services — use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod cache_writer;
pub mod command_service;
pub mod entity_service;
pub mod sync_driver;

//! # homesync-domain
//!
//! Pure domain model for the homesync hub client.
//!
//! ## Responsibilities
//! - Foundational types: entity identifiers, error conventions, timestamps
//! - Define **Entities** (state snapshots received from the hub: lights, locks, sensors, …)
//!   and the closed set of domain-specific details derived from them
//! - Define the **Transforms** between wire strings and typed values
//! - Define **Events** (`state_changed`, `call_service`, `service_executed`)
//! - Define **Service calls**, **URL commands** and the hub configuration
//! - Contain all invariant enforcement and decoding logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;
pub mod transform;

pub mod entity;
pub mod event;
pub mod hub_config;
pub mod service;
pub mod url_command;

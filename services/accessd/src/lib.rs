//! Lin access-control service library crate.
//!
//! # Purpose
//! Exposes the engine, rule storage backends, configuration, and logging setup
//! for use by the seeding binary, embedding services, and tests.
pub mod config;
pub mod engine;
pub mod observability;
pub mod store;

//! # logvol-common
//!
//! Shared types, error definitions, configuration models, and constants
//! used across the entire logvol workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and provides the request model, driver responses and
//! host layout defaults that the core and CLI crates build upon.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

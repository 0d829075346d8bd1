//! # wapair-core
//!
//! Core types, traits, configuration, and error handling for the pairing service.

pub mod cache;
pub mod calling_codes;
pub mod config;
pub mod error;
pub mod pairing;
pub mod session;
pub mod traits;

//! Core types and trait definitions for the calculation tree.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The store and server crates depend on it; it depends on nothing
//! proprietary.

pub mod calculation;
pub mod error;
pub mod forest;
pub mod json;
pub mod service;
pub mod store;
pub mod user;

pub use error::{Error, Result};

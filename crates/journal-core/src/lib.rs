//! Core types and trait definitions for the journal service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod access;
pub mod bootstrap;
pub mod catalog;
pub mod de;
pub mod entry;
pub mod error;
pub mod query;
pub mod store;
pub mod user;

pub use error::{DomainError, Error, Result};

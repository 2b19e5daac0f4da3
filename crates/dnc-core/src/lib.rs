//! Core types and trait definitions for the DNC training-plan service.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! storage backend, the LLM client, the course-catalog client and the REST
//! layer all depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod course;
pub mod error;
pub mod intake;
pub mod lookup;
pub mod plan;
pub mod report;
pub mod service;
pub mod store;

pub use error::{DomainError, Error, Result};

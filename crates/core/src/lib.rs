//! Aula Core - Shared types library.
//!
//! This crate provides common types used across all Aula components:
//! - `web` - Course enrollment and chat web application
//! - `cli` - Command-line tools for managing the allowlist and courses
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for course IDs, emails and course statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

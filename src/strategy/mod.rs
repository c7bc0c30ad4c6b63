//! Sanitization Strategy Module
//!
//! Single fragments go through `crate::sanitize` directly. This module holds
//! the batch strategy:
//! - Parallel: many fragments against one sanitizer (rayon)

pub mod parallel;

pub use parallel::{sanitize_keyed, sanitize_parallel};

//! Allow-list policy
//!
//! - `config`: what may survive (elements, attributes, protocols, options)
//! - `content_model`: static per-element structure rules
//! - `engine`: applies a `Config` to a token stream
//! - `url`: scheme extraction and protocol checks

pub mod config;
pub mod content_model;
pub mod engine;
pub mod url;

pub use config::{Config, ConfigBuilder};
pub use engine::PolicyEngine;

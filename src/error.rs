//! Configuration errors
//!
//! Untrusted markup never produces an error; only a malformed configuration
//! does, and it is reported before any input is read.

/// Error raised while building a sanitizer configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `tags` or `attributes` was given as something other than a list
    #[error("{0} must be enumerable")]
    NotEnumerable(&'static str),

    /// An element, attribute or protocol name that can never match
    #[error("invalid {kind} name: {name:?}")]
    InvalidName { kind: &'static str, name: String },

    /// Options document could not be decoded
    #[error("invalid sanitizer options: {0}")]
    Options(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

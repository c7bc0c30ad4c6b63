//! Core HTML parsing primitives
//!
//! This module contains the fundamental building blocks for reading untrusted markup:
//! - Scanner: SIMD-accelerated delimiter detection using memchr
//! - Tokenizer: Lenient state machine for HTML token extraction
//! - Entities: character reference decoding (Cow, zero-copy when possible) and output encoding
//! - Attributes: Attribute lexing following the HTML attribute states

pub mod attributes;
pub mod entities;
pub mod named_entities;
pub mod scanner;
pub mod tokenizer;

//! craftc-walk - Character-level source traversal for the CraftLang compiler.
//!
//! CraftLang is parsed straight off the character stream; there is no token
//! stream in between. This crate provides the three pieces that layer makes
//! do with:
//!
//! - [`character`] - Unicode-category predicates for the character classes
//!   the grammar cares about (newline, whitespace, identifier, digit).
//! - [`Walker`] - a cursor over the source string with position, line and
//!   column tracking, bidirectional movement, and pattern matching.
//! - [`Token`] - a half-open `[start, end)` slice into the walker's source,
//!   compared by lexeme.

pub mod character;
mod token;
mod walker;

pub use token::Token;
pub use walker::Walker;

//! Notation parsing
//!
//! Turns the compact announcement notation ("1/2 30s last20 allLast10") into
//! typed interval directives.

pub mod parser;

pub use self::parser::parse;

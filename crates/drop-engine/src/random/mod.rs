//! Randomness for gameplay and identifiers.
//!
//! Everything here is built on [`RandomSource`], which never reduces raw
//! entropy with a bare modulo.

mod selector;
mod shuffle;
mod source;

pub use selector::{CyclingSelector, SelectorError};
pub use source::{RandomError, RandomSource, ALPHANUMERIC};

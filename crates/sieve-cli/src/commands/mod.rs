//! CLI command implementations for sieve.

pub mod check;
pub mod rewrite;

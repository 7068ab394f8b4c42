//! # CLI Command Implementations
//!
//! `modsplit` has a single command, the split itself. It follows the same
//! layout other commands would:
//! - An `Args` struct that defines the command's arguments, derived using `clap`.
//! - An `execute` function that takes the parsed `Args`, calls into the
//!   `modsplit` library and reports the outcome.

pub mod split;

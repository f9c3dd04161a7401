//! vadpcmstats CLI library.
//!
//! This crate provides the command implementations behind the `vadpcmstats`
//! binary: single-file analysis and batch summaries over a corpus.

pub mod commands;
pub mod input;
pub mod logging;

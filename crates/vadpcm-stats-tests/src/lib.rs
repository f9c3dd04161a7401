//! VADPCM fidelity analysis integration tests
//!
//! This crate holds end-to-end tests over synthetic containers and sample
//! streams:
//!
//! - **Pipeline**: container bytes and samples -> error report
//! - **Properties**: chunk reader, extractor, aligner, and analyzer
//!   invariants under `proptest`
//! - **Batch**: corpus directories -> summary CSV
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p vadpcm-stats-tests
//! ```

pub mod fixtures;

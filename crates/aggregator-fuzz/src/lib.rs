//! Fuzzing library for scholar-aggregator.
//!
//! Targets cover the untrusted-input boundary: raw catalog payloads, abstract
//! markup cleaning and the arXiv Atom feed parser.
//!
//! # Usage
//!
//! ```bash
//! cd crates/aggregator-fuzz
//! cargo +nightly fuzz run fuzz_crossref_item -- -max_total_time=60
//! ```

pub use scholar_aggregator::{models, pipeline, sources};

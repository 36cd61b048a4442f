//! Benchmark fixtures for singleton access.
//!
//! ```bash
//! cargo bench -p rusty_singleton_bench
//! cargo bench -p rusty_singleton_bench -- cached
//! ```
//!
//! Results are written to `target/criterion/` with HTML reports.

pub mod components;

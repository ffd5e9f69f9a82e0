//! Territory performance metrics engine and reporting primitives.
//!
//! The binary in `main.rs` drives these modules through a console menu; the
//! library surface exists so the engine stays testable as a pure function of
//! (rows, config, today).

pub mod error;
pub mod fetch;
pub mod loader;
pub mod metrics;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;

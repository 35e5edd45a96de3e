//! # minivm-testkit
//!
//! Test support for the minivm interpreter.
//!
//! This crate provides:
//! - [`MockedHost`]: a map-backed host that records nested calls
//! - JSON fixtures describing a program, its environment and the expected
//!   outcome, and a [`FixtureRunner`] that executes them
//! - [`init_tracing`] for tests that want interpreter logs

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod mocked_host;
mod runner;
mod types;

pub use error::{TestError, TestResult};
pub use mocked_host::{MockedAccount, MockedHost};
pub use runner::{FixtureResults, FixtureRunner};
pub use types::*;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a test-friendly subscriber filtered by `RUST_LOG` (default
/// `minivm_core=debug`). Safe to call from every test.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("minivm_core=debug"));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(filter)
        .try_init();
}

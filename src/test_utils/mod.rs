//! Test utilities for bound
//!
//! Helpers shared by unit tests and the integration suite: sample
//! specifications and contracts, a temporary project directory, and
//! one-time logging setup.
//!
//! # Example
//!
//! ```rust,no_run
//! use bound_cli::test_utils::{SpecFixture, TestProject};
//!
//! let project = TestProject::new().unwrap();
//! let spec = project.write_spec(&SpecFixture::basic()).unwrap();
//! assert!(spec.exists());
//! ```

pub mod environment;
pub mod fixtures;

pub use environment::TestProject;
pub use fixtures::{ContractFixture, SpecFixture};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests, once per process.
///
/// With `Some(level)` that level is used; with `None` logging is enabled only
/// when `RUST_LOG` is set.
///
/// ```bash
/// RUST_LOG=bound_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

//! Fixtures and helpers shared by the tests of the workspace crates.

pub mod database;
pub mod fixtures;

/// Send `tracing` output to the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

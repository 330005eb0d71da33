/*! Integration tests for widelog.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - event: Tests for the Fields/Value tree and its JSON rendering
 * - context: Tests for the LogContext carrier lifecycle and sharing
 * - middleware: End-to-end tests for the HTTP canonical-log layer
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("widelog=trace".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod middleware;

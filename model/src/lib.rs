//! Field types and schema configuration for a GraphQL-backed content management system.

use tracing_subscriber::EnvFilter;

pub mod config;
pub mod context;
pub mod date;
pub mod error;
pub mod fields;
pub mod filter;
pub mod hooks;
pub mod http;
pub mod provider;
pub mod schema;
pub mod store;
pub mod value;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::{config, graphql_schema_extension, list, singleton};

/// Log to stderr, filtered by `RUST_LOG`.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

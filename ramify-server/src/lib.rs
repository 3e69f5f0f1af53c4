//! HTTP relay server: route table, shared state and the error envelope.

pub mod error;
pub mod routes;
pub mod state;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Short git hash baked in by the build script
pub const GIT_HASH: &str = env!("GIT_HASH");
/// Build timestamp baked in by the build script
pub const BUILD_TIME: &str = env!("BUILD_TIME");

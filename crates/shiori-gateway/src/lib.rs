//! Same-origin proxy in front of the catalog API.
//!
//! Every request under `/{prefix}/` is replayed against the upstream base
//! URL with the same method, path and raw query string. Successful
//! responses are relayed untouched; failures become a small JSON error.

pub mod error;
pub mod proxy;
pub mod server;

pub use error::{ErrorBody, GatewayError};
pub use proxy::{forward, router, upstream_url, GatewayState};
pub use server::{serve, serve_on, shutdown_on};

//! Request orchestration.
//!
//! [`NetClient`] ties the crate together: URL validation, per-host rate
//! limiting, the timeout cascade, retry on server errors, and response
//! normalization. One client is cheap to clone and shares its transport
//! session pool and rate limiter state across clones.

mod builder;
mod dispatch;
mod headers;
mod request;

#[cfg(test)]
mod tests;

pub use builder::{NetClient, NetClientBuilder};
pub(crate) use headers::build_headers;

//! World Fetcher: one HTTP request per scene for a generated world.
//!
//! # Invariants
//! - A fetch either yields a validated `WorldGrid` or a typed `FetchError`;
//!   there is no partial result.
//! - No retries and no caching. A fetch runs at most once per handle.
//! - A pending fetch is cancelled when its handle is cancelled or dropped.

mod client;
mod endpoint;
mod error;
mod http;
mod task;

pub use client::{ClientConfig, WorldClient, WorldSource};
pub use endpoint::{Endpoint, EndpointError};
pub use error::FetchError;
pub use task::{FetchHandle, FetchPoll};

pub fn crate_info() -> &'static str {
    "tileworld-fetch v0.1.0"
}

//! World generation service: an axum router answering
//! `GET /generate_world?seed=&size=`.
//!
//! # Invariants
//! - Every answered world is a valid square grid of the requested size.
//! - Bad parameters get a 400 with a JSON `{"error": ...}` body, never a panic.
//! - Cross-origin callers get permissive CORS headers and preflight answers.
//! - Generation runs on the blocking pool, never on the async workers.

mod routes;
mod server;

pub use server::{ServerConfig, ServerError, WorldServer, WorldServerHandle};

/// Address the service binds to when none is given.
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:5000";

pub fn crate_info() -> &'static str {
    "tileworld-server v0.1.0"
}

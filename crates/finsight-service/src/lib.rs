//! # finsight-service
//!
//! HTTP boundary for the finsight gateway: three JSON endpoints backed by
//! the embedding cache, the vector index, and the chat provider.
//!
//! The boundary's contract with the core is thin: validation failures are
//! reported before any external call, and any typed core error maps onto
//! `400`/`500` with an `{"error": ...}` body.

pub mod anomaly;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{router, run_server_with_shutdown};
pub use state::AppState;

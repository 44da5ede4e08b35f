//! Vidsum API server library.
//!
//! Exposes config, state, error handling and the router builder so the
//! binary and the integration tests assemble the exact same app.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod routes;
pub mod state;

//! The `srs-api` HTTP surface (`spec.md` §6) as a library, split from
//! `main.rs` the way the pack's `iqrah-backend-api` separates its
//! `lib.rs` (router, handlers, state) from a thin binary entrypoint —
//! the split is what lets integration tests build the router directly
//! against an in-memory store instead of spawning the real process.

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::ApiState;

//! The durable persistence layer (`spec.md` §4.2, §6): a SQLite-backed
//! implementation of `srs_engine::SrsStore`, plus the connection pool and
//! migration runner the `srs-api` binary wires up at startup.

mod convert;
mod error;
mod pool;
mod sqlite;

pub use pool::{create_pool, run_migrations};
pub use sqlite::SqliteSrsStore;

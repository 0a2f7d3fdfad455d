//! Database connection pool module.
//!
//! Provides async PostgreSQL connection pooling using diesel_async with bb8,
//! plus embedded migrations.

mod pool;

pub use pool::{
    AsyncDbPool, MIGRATIONS, MigrationAction, establish_async_connection_pool, ping, run_migrations,
};

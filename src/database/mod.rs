pub mod connection;
pub mod enums;
pub mod models;
pub mod repositories;
pub mod schema;

pub use connection::{establish_connection_pools, DatabaseError, DatabasePools};

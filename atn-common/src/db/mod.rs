//! Database layer: initialization, schema, row models

pub mod init;
pub mod models;

pub use init::init_database;

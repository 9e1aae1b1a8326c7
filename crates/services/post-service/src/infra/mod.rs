//! Infrastructure layer - database and cache connections.

mod db;
pub mod migrations;

pub use db::{connect_cache, Database};
pub use migrations::Migrator;

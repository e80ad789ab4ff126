//! All job state is stored in a SQLite database

/// Connect to a SQLite database
pub mod open;
/// CRUD over job records
pub mod job;

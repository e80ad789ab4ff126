use std::path::Path;

use log::info;
use rusqlite::Connection;

use crate::error::Result;

/// Embedded table definitions, applied on every open
static SCHEMA: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/db/schema.sql"));

pub fn open_db(path: &Path) -> Result<Connection> {
    if !path.exists() {
        info!("creating new database {}", path.display())
    }
    let conn = Connection::open(path)?;
    initialize(&conn)?;
    Ok(conn)
}

/// Apply the schema; split out so tests can run against an in-memory
/// database
pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

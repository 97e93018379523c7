use rusqlite::{Connection, Result};

/// Initialize the SQLite database with the required schema.
/// This function is idempotent and can be safely called multiple times.
///
/// Each row holds one page document as JSON. `title` and `last_update`
/// (nanoseconds since the Unix epoch) are copies of document fields kept as
/// columns so lookups and ordering can use an index. `seq` records creation
/// order and breaks ties between equal timestamps.
pub fn initialize_database(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS wikipages (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            last_update INTEGER NOT NULL,
            document TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_wikipages_title ON wikipages(title)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_wikipages_last_update ON wikipages(last_update DESC, seq DESC)",
        [],
    )?;

    Ok(())
}

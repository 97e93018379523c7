use super::functions::register_functions;
use super::schema::initialize_database;
use crate::application::repositories::{RepositoryError, RepositoryResult};
use crate::config::{StoreConfig, StoreLocation};
use crate::infrastructure::clock::{Clock, SystemClock};
use rusqlite::{Connection, InterruptHandle};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

/// The single live handle to the document store.
///
/// A rusqlite connection may move between threads but not be used from two at
/// once, so calls are serialized through a mutex. Each call is bounded by the
/// SQLite busy timeout and can be cancelled through [`Database::interrupt_handle`].
///
/// The handle also owns the clock that stamps writes, so every repository
/// built on it sees strictly increasing stamps.
pub struct Database {
    conn: Mutex<Connection>,
    interrupt: Arc<InterruptHandle>,
    clock: Arc<dyn Clock>,
    location: String,
}

impl Database {
    /// Open the store and make sure the schema exists.
    ///
    /// Any failure here is `RepositoryError::Unavailable`; there is no retry.
    pub fn connect(config: &StoreConfig) -> RepositoryResult<Self> {
        let location = config.location.to_string();
        info!("Connecting to document store at {}", location);

        let conn = match &config.location {
            StoreLocation::InMemory => Connection::open_in_memory(),
            StoreLocation::File { data_dir, database } => {
                if !data_dir.is_dir() {
                    return Err(RepositoryError::Unavailable(format!(
                        "Data directory does not exist: {}",
                        data_dir.display()
                    )));
                }
                Connection::open(data_dir.join(format!("{}.db", database)))
            }
        }
        .map_err(|e| unavailable(&location, e))?;

        conn.busy_timeout(config.timeout)
            .map_err(|e| unavailable(&location, e))?;
        initialize_database(&conn).map_err(|e| unavailable(&location, e))?;
        register_functions(&conn).map_err(|e| unavailable(&location, e))?;

        let interrupt = Arc::new(conn.get_interrupt_handle());
        info!("Document store ready at {}", location);

        Ok(Database {
            conn: Mutex::new(conn),
            interrupt,
            clock: Arc::new(SystemClock::new()),
            location,
        })
    }

    /// Open a private in-memory store (useful for testing)
    pub fn open_in_memory() -> RepositoryResult<Self> {
        Self::connect(&StoreConfig::in_memory())
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Handle that aborts whatever statement is running on this store.
    /// The interrupted call fails with `RepositoryError::Failure`.
    pub fn interrupt_handle(&self) -> Arc<InterruptHandle> {
        Arc::clone(&self.interrupt)
    }

    /// Clock shared by every writer on this store
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Run `f` with exclusive use of the connection
    pub(crate) fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> RepositoryResult<T>,
    ) -> RepositoryResult<T> {
        // A panic while holding the lock leaves the connection itself usable
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut conn).inspect_err(|e| debug!("Store call on {} failed: {}", self.location, e))
    }
}

fn unavailable(location: &str, e: rusqlite::Error) -> RepositoryError {
    RepositoryError::Unavailable(format!("{}: {}", location, e))
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(e: rusqlite::Error) -> Self {
        RepositoryError::Failure(format!("Database error: {}", e))
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(e: serde_json::Error) -> Self {
        RepositoryError::Failure(format!("Malformed page document: {}", e))
    }
}

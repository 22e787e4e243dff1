//! Relational store module
//!
//! `Store` describes how to reach the database; it is cheap to clone and
//! shared across requests. Each request opens its own `Session`, which is
//! closed when dropped.

mod errors;
mod schema;
mod session;

use std::path::PathBuf;
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};

use crate::config::DatabaseConfig;
use crate::logger;

pub use errors::{StoreError, StoreResult};
pub use session::{BikeFilter, Session};

/// Process-wide store handle
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    busy_timeout: Duration,
}

impl Store {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            path: PathBuf::from(&config.path),
            busy_timeout: Duration::from_millis(config.busy_timeout_ms),
        }
    }

    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Open a read-only session
    pub fn session(&self) -> StoreResult<Session> {
        let conn = self.open(OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX)?;
        Ok(Session::new(conn))
    }

    /// Create any missing tables
    pub fn bootstrap(&self) -> StoreResult<()> {
        let conn = self.open(
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.execute_batch(schema::CREATE_TABLES)?;
        logger::log_info(&format!("[Store] Schema ready at {}", self.path.display()));
        Ok(())
    }

    /// Run `f` against a fresh session on the blocking pool.
    ///
    /// The session is released when `f` returns, whatever the outcome.
    pub async fn run<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Session) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || {
            let session = store.session()?;
            f(&session)
        })
        .await?
    }

    fn open(&self, flags: OpenFlags) -> StoreResult<Connection> {
        let conn =
            Connection::open_with_flags(&self.path, flags).map_err(|source| StoreError::Open {
                path: self.path.display().to_string(),
                source,
            })?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }
}

#[cfg(test)]
pub mod fixtures {
    //! Temporary databases seeded row by row

    use super::Store;
    use crate::config::DatabaseConfig;
    use rusqlite::{params, Connection};
    use tempfile::TempDir;

    pub struct TestDb {
        _dir: TempDir,
        pub store: Store,
    }

    impl TestDb {
        pub fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("bikes.db");
            let store = Store::new(&DatabaseConfig {
                path: path.to_str().unwrap().to_string(),
                busy_timeout_ms: 1000,
                create_schema: true,
            });
            store.bootstrap().unwrap();
            Self { _dir: dir, store }
        }

        fn conn(&self) -> Connection {
            Connection::open(self.store.path()).unwrap()
        }

        pub fn add_owner(&self, name: &str) -> i64 {
            let conn = self.conn();
            conn.execute(
                "INSERT INTO Owners (Name, Address, Email, Telephone) VALUES (?1, ?2, ?3, ?4)",
                params![
                    name,
                    "12 Spoke St",
                    format!("{}@example.com", name.to_lowercase()),
                    "555-0100"
                ],
            )
            .unwrap();
            conn.last_insert_rowid()
        }

        pub fn add_bike_type(&self, name: &str) -> i64 {
            let conn = self.conn();
            conn.execute("INSERT INTO BikeTypes (Name) VALUES (?1)", params![name])
                .unwrap();
            conn.last_insert_rowid()
        }

        pub fn add_bike(&self, owner_id: i64, bike_type_id: i64) -> i64 {
            let conn = self.conn();
            conn.execute(
                "INSERT INTO Bikes (Brand, Color, OwnerId, BikeTypeId) VALUES (?1, ?2, ?3, ?4)",
                params!["Schwinn", "blue", owner_id, bike_type_id],
            )
            .unwrap();
            conn.last_insert_rowid()
        }

        /// Insert a bike with an explicit id
        pub fn add_bike_with_id(&self, id: i64, owner_id: i64, bike_type_id: i64) -> i64 {
            self.conn()
                .execute(
                    "INSERT INTO Bikes (Id, Brand, Color, OwnerId, BikeTypeId) VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![id, "Trek", "green", owner_id, bike_type_id],
                )
                .unwrap();
            id
        }

        pub fn add_work_order(&self, bike_id: i64, completed: bool) -> i64 {
            let conn = self.conn();
            let completed_at = completed.then_some("2024-03-02T10:00:00+00:00");
            conn.execute(
                "INSERT INTO WorkOrders (BikeId, Description, DateInitiated, DateCompleted, UserProfileId)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    bike_id,
                    "flat tire",
                    "2024-03-01T09:30:00+00:00",
                    completed_at,
                    Option::<i64>::None
                ],
            )
            .unwrap();
            conn.last_insert_rowid()
        }
    }
}

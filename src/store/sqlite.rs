use std::path::Path;
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use rusqlite_migration::{Migrations, M};

use crate::app::{EstrazioniError, Result};
use crate::domain::PublicationState;
use crate::store::Store;

const MIGRATION_INITIAL: &str = "
CREATE TABLE publication_state (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    draw_date TEXT NOT NULL,
    pinned_message_id INTEGER NOT NULL,
    published_at TEXT NOT NULL
);
";

/// Single-row SQLite file holding the last published draw.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(mut conn: Connection) -> Result<Self> {
        let migrations = Migrations::new(vec![M::up(MIGRATION_INITIAL)]);
        migrations
            .to_latest(&mut conn)
            .map_err(|e| EstrazioniError::Other(format!("State migration failed: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| EstrazioniError::Other(format!("State store lock poisoned: {}", e)))
    }
}

impl Store for SqliteStore {
    fn load_state(&self) -> Result<PublicationState> {
        let conn = self.lock()?;

        let row = conn
            .query_row(
                "SELECT draw_date, pinned_message_id FROM publication_state WHERE id = 1",
                [],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        match row {
            None => Ok(PublicationState::new()),
            Some((date, message_id)) => {
                let draw_date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
                    EstrazioniError::Other(format!("Corrupt draw date {:?} in state: {}", date, e))
                })?;
                Ok(PublicationState::published(draw_date, message_id))
            }
        }
    }

    fn save_state(&self, state: &PublicationState) -> Result<()> {
        let conn = self.lock()?;

        match state.marker() {
            None => {
                conn.execute("DELETE FROM publication_state", [])?;
            }
            Some(marker) => {
                conn.execute(
                    "INSERT INTO publication_state (id, draw_date, pinned_message_id, published_at)
                     VALUES (1, ?1, ?2, ?3)
                     ON CONFLICT(id) DO UPDATE SET
                         draw_date = excluded.draw_date,
                         pinned_message_id = excluded.pinned_message_id,
                         published_at = excluded.published_at",
                    params![
                        marker.draw_date.format("%Y-%m-%d").to_string(),
                        marker.pinned_message_id,
                        Utc::now().to_rfc3339()
                    ],
                )?;
            }
        }

        Ok(())
    }
}

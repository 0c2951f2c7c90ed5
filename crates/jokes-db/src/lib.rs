pub mod migrations;
pub mod models;
pub mod queries;
pub mod seed;

use anyhow::{Result, anyhow};
use rusqlite::Connection;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::info;

const READER_POOL_SIZE: usize = 4;

static SHARED: OnceLock<Arc<Database>> = OnceLock::new();
static SHARED_INIT: Mutex<()> = Mutex::new(());

/// SQLite store with one writer connection and a small pool of read-only readers.
pub struct Database {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    reader_idx: AtomicUsize,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let writer = Connection::open(path)?;

        // WAL mode for concurrent reads
        writer.pragma_update(None, "journal_mode", "WAL")?;
        writer.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&writer)?;

        let mut readers = Vec::with_capacity(READER_POOL_SIZE);
        for _ in 0..READER_POOL_SIZE {
            let conn = Connection::open_with_flags(
                path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            readers.push(Mutex::new(conn));
        }

        info!(
            "Database opened at {} (1 writer + {} readers)",
            path.display(),
            READER_POOL_SIZE
        );
        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            reader_idx: AtomicUsize::new(0),
        })
    }

    /// Private in-memory store. Reads go through the writer since separate
    /// in-memory connections never see each other's data.
    pub fn open_in_memory() -> Result<Self> {
        let writer = Connection::open_in_memory()?;
        writer.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&writer)?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers: Vec::new(),
            reader_idx: AtomicUsize::new(0),
        })
    }

    /// Process-wide handle, opened on first use and reused afterwards.
    /// Later calls ignore `path`.
    pub fn shared(path: &Path) -> Result<Arc<Database>> {
        if let Some(db) = SHARED.get() {
            return Ok(db.clone());
        }

        let _guard = SHARED_INIT
            .lock()
            .map_err(|e| anyhow!("DB init lock poisoned: {}", e))?;
        if let Some(db) = SHARED.get() {
            return Ok(db.clone());
        }

        let db = Arc::new(Self::open(path)?);
        let _ = SHARED.set(db.clone());
        Ok(db)
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        if self.readers.is_empty() {
            return self.with_conn_mut(f);
        }

        let idx = self.reader_idx.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = self.readers[idx]
            .lock()
            .map_err(|e| anyhow!("Reader lock poisoned: {}", e))?;
        f(&conn)
    }

    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .writer
            .lock()
            .map_err(|e| anyhow!("Writer lock poisoned: {}", e))?;
        f(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_handle_is_opened_once() {
        let path = std::env::temp_dir().join(format!("jokes-shared-{}.db", uuid::Uuid::new_v4()));

        let first = Database::shared(&path).unwrap();
        let second = Database::shared(Path::new("/nonexistent/ignored.db")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        drop((first, second));
        let _ = std::fs::remove_file(&path);
    }
}

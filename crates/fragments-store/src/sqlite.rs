//! SQLite implementation of the storage gateway.
//!
//! The persistent backend. Uses rusqlite with bundled SQLite; every call runs
//! on `tokio::task::spawn_blocking`.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use fragments_core::{Fragment, FragmentId, OwnerId};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::StorageGateway;

/// SQLite-based store. Thread-safe via an internal Mutex.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path, creating and migrating it
    /// as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        tracing::debug!(path = %path.display(), "opened fragment database");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            f(&mut conn)
        })
        .await?
    }
}

/// Fixed-width RFC 3339 so text order matches time order.
fn encode_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode_time(column: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidData(format!("{column} {value:?}: {e}")))
}

fn encode_size(size: u64) -> Result<i64> {
    i64::try_from(size).map_err(|_| StoreError::InvalidData(format!("size {size} out of range")))
}

/// Raw metadata columns, decoded after the query so decode failures surface
/// as `StoreError::InvalidData`.
struct MetadataRow {
    content_type: String,
    size: i64,
    created: String,
    updated: String,
}

impl MetadataRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            content_type: row.get("content_type")?,
            size: row.get("size")?,
            created: row.get("created")?,
            updated: row.get("updated")?,
        })
    }

    fn into_fragment(self, owner_id: OwnerId, id: FragmentId) -> Result<Fragment> {
        let size = u64::try_from(self.size)
            .map_err(|_| StoreError::InvalidData(format!("negative size {}", self.size)))?;

        Fragment::builder(owner_id, self.content_type)
            .id(id)
            .size(size)
            .created(decode_time("created", &self.created)?)
            .updated(decode_time("updated", &self.updated)?)
            .build()
            .map_err(|e| StoreError::InvalidData(e.to_string()))
    }
}

fn upsert_metadata(conn: &Connection, owner_id: &OwnerId, fragment: &Fragment) -> Result<()> {
    conn.execute(
        "INSERT INTO fragments (owner_id, id, content_type, size, created, updated)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (owner_id, id) DO UPDATE SET
            content_type = excluded.content_type,
            size = excluded.size,
            created = excluded.created,
            updated = excluded.updated",
        params![
            owner_id.as_str(),
            fragment.id().as_str(),
            fragment.content_type().as_str(),
            encode_size(fragment.size())?,
            encode_time(fragment.created()),
            encode_time(fragment.updated()),
        ],
    )?;
    Ok(())
}

fn upsert_content(conn: &Connection, owner_id: &OwnerId, id: &FragmentId, data: &[u8]) -> Result<()> {
    conn.execute(
        "INSERT INTO fragment_data (owner_id, id, data) VALUES (?1, ?2, ?3)
         ON CONFLICT (owner_id, id) DO UPDATE SET data = excluded.data",
        params![owner_id.as_str(), id.as_str(), data],
    )?;
    Ok(())
}

#[async_trait]
impl StorageGateway for SqliteStore {
    async fn put_metadata(&self, owner_id: &OwnerId, fragment: &Fragment) -> Result<()> {
        let owner_id = owner_id.clone();
        let fragment = fragment.clone();
        self.run(move |conn| upsert_metadata(conn, &owner_id, &fragment))
            .await
    }

    async fn get_metadata(&self, owner_id: &OwnerId, id: &FragmentId) -> Result<Option<Fragment>> {
        let owner_id = owner_id.clone();
        let id = id.clone();
        self.run(move |conn| {
            let row = conn
                .query_row(
                    "SELECT content_type, size, created, updated FROM fragments
                     WHERE owner_id = ?1 AND id = ?2",
                    params![owner_id.as_str(), id.as_str()],
                    MetadataRow::from_row,
                )
                .optional()?;

            row.map(|row| row.into_fragment(owner_id, id)).transpose()
        })
        .await
    }

    async fn list_ids(&self, owner_id: &OwnerId) -> Result<Vec<FragmentId>> {
        let owner_id = owner_id.clone();
        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id FROM fragments WHERE owner_id = ?1 ORDER BY created, id",
            )?;
            let ids = stmt
                .query_map(params![owner_id.as_str()], |row| row.get::<_, String>(0))?
                .map(|id| id.map(FragmentId::from))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(ids)
        })
        .await
    }

    async fn put_content(&self, owner_id: &OwnerId, id: &FragmentId, data: Bytes) -> Result<()> {
        let owner_id = owner_id.clone();
        let id = id.clone();
        self.run(move |conn| upsert_content(conn, &owner_id, &id, &data))
            .await
    }

    async fn get_content(&self, owner_id: &OwnerId, id: &FragmentId) -> Result<Option<Bytes>> {
        let owner_id = owner_id.clone();
        let id = id.clone();
        self.run(move |conn| {
            let data: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT data FROM fragment_data WHERE owner_id = ?1 AND id = ?2",
                    params![owner_id.as_str(), id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(data.map(Bytes::from))
        })
        .await
    }

    async fn delete_all(&self, owner_id: &OwnerId, id: &FragmentId) -> Result<()> {
        let owner_id = owner_id.clone();
        let id = id.clone();
        self.run(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM fragments WHERE owner_id = ?1 AND id = ?2",
                params![owner_id.as_str(), id.as_str()],
            )?;
            tx.execute(
                "DELETE FROM fragment_data WHERE owner_id = ?1 AND id = ?2",
                params![owner_id.as_str(), id.as_str()],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn put_fragment(&self, owner_id: &OwnerId, fragment: &Fragment, data: Bytes) -> Result<()> {
        let owner_id = owner_id.clone();
        let fragment = fragment.clone();
        self.run(move |conn| {
            let tx = conn.transaction()?;
            upsert_metadata(&tx, &owner_id, &fragment)?;
            upsert_content(&tx, &owner_id, fragment.id(), &data)?;
            tx.commit()?;
            Ok(())
        })
        .await
    }
}

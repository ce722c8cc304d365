//! openbot-storage: SQLite-based persistence for per-user message statistics.
//!
//! Two tables: `users` (one row per Discord user ever seen posting) and
//! `messages` (one row per observed non-empty message). Users are created
//! lazily on their first message and never deleted; messages are never
//! updated or deleted.

use std::path::Path;
use std::sync::Arc;

use rusqlite::{Connection, OptionalExtension};
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Blocking task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, StorageError>;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY,
        username TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS messages (
        id INTEGER PRIMARY KEY,
        author INTEGER NOT NULL REFERENCES users(id),
        length INTEGER NOT NULL,
        channel INTEGER NOT NULL,
        time INTEGER NOT NULL
    );";

/// A stored Discord user, keyed by snowflake.
///
/// `username` is whatever name the user had when first observed; later name
/// changes are not written back (see [`MessageStore::ensure_user_created`]).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub username: String,
}

/// One observed message, ready for insertion.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MessageRecord {
    /// Message snowflake.
    pub id: u64,
    /// Author snowflake.
    pub author_id: u64,
    /// Author display name at ingestion time.
    pub author_name: String,
    /// Content length in characters.
    pub length: u32,
    /// Channel snowflake.
    pub channel_id: u64,
    /// Ingestion wall-clock time, unix millis.
    pub sent_at_millis: i64,
}

/// SQLite-backed store for message statistics.
///
/// Snowflakes are `u64` at the API boundary and stored as SQLite `INTEGER`
/// via a bit-preserving cast.
pub struct MessageStore {
    conn: Arc<Mutex<Connection>>,
}

impl MessageStore {
    /// Open (or create) the database at the given path and create the
    /// schema if needed. No migration history is kept.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        tracing::info!("Storage opened: {}", path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Whether a user row with this snowflake exists.
    ///
    /// Not used by the bundled stats module (superseded by
    /// [`ensure_user_created`](Self::ensure_user_created)) but part of the
    /// public contract.
    pub async fn user_exists(&self, user_id: u64) -> Result<bool> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM users WHERE id = ?1",
                    rusqlite::params![user_id as i64],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await?
    }

    /// Insert a user row if absent. Idempotent.
    ///
    /// An existing row's username is left untouched, so a returning user's
    /// name change is silently ignored.
    pub async fn ensure_user_created(&self, user_id: u64, username: &str) -> Result<()> {
        let conn = self.conn.clone();
        let username = username.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            ensure_user(&conn, user_id, &username)?;
            Ok(())
        })
        .await?
    }

    /// Record one observed message inside a single transaction: the author
    /// row is ensured first, then the message row is inserted. Commits on
    /// success; any error rolls the whole handler's writes back.
    pub async fn record_message(&self, rec: &MessageRecord) -> Result<()> {
        let conn = self.conn.clone();
        let rec = rec.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.blocking_lock();
            let tx = conn.transaction()?;
            ensure_user(&tx, rec.author_id, &rec.author_name)?;
            tx.execute(
                "INSERT INTO messages (id, author, length, channel, time)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    rec.id as i64,
                    rec.author_id as i64,
                    rec.length,
                    rec.channel_id as i64,
                    rec.sent_at_millis,
                ],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await?
    }

    /// Count messages authored by the given user.
    pub async fn count_messages_by(&self, user_id: u64) -> Result<i64> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let count = conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE author = ?1",
                rusqlite::params![user_id as i64],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await?
    }

    /// Fetch a user row by snowflake.
    pub async fn get_user(&self, user_id: u64) -> Result<Option<UserRecord>> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let result = conn
                .query_row(
                    "SELECT id, username FROM users WHERE id = ?1",
                    rusqlite::params![user_id as i64],
                    |row| {
                        Ok(UserRecord {
                            id: row.get::<_, i64>(0)? as u64,
                            username: row.get(1)?,
                        })
                    },
                )
                .optional()?;
            Ok(result)
        })
        .await?
    }
}

/// Check-then-insert, shared by the standalone op and the transactional
/// message path. Never updates an existing row.
fn ensure_user(conn: &Connection, user_id: u64, username: &str) -> rusqlite::Result<()> {
    let exists: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM users WHERE id = ?1",
            rusqlite::params![user_id as i64],
            |row| row.get(0),
        )
        .optional()?;
    if exists.is_none() {
        conn.execute(
            "INSERT INTO users (id, username) VALUES (?1, ?2)",
            rusqlite::params![user_id as i64, username],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_message(id: u64, author_id: u64, author_name: &str) -> MessageRecord {
        MessageRecord {
            id,
            author_id,
            author_name: author_name.to_string(),
            length: 12,
            channel_id: 500,
            sent_at_millis: 1700000000000,
        }
    }

    #[tokio::test]
    async fn test_user_exists_after_ensure() {
        let store = MessageStore::open_in_memory().unwrap();
        assert!(!store.user_exists(42).await.unwrap());

        store.ensure_user_created(42, "alice").await.unwrap();
        assert!(store.user_exists(42).await.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_user_is_idempotent() {
        let store = MessageStore::open_in_memory().unwrap();
        store.ensure_user_created(42, "alice").await.unwrap();
        store.ensure_user_created(42, "alice").await.unwrap();

        let user = store.get_user(42).await.unwrap().unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_username_change_is_ignored() {
        let store = MessageStore::open_in_memory().unwrap();
        store.ensure_user_created(42, "alice").await.unwrap();
        store.ensure_user_created(42, "renamed").await.unwrap();

        // First-seen name wins; later names are never written back.
        let user = store.get_user(42).await.unwrap().unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_record_message_creates_author_lazily() {
        let store = MessageStore::open_in_memory().unwrap();
        assert!(!store.user_exists(7).await.unwrap());

        store
            .record_message(&sample_message(1, 7, "bob"))
            .await
            .unwrap();

        assert!(store.user_exists(7).await.unwrap());
        assert_eq!(store.count_messages_by(7).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_one_user_row_for_many_messages() {
        let store = MessageStore::open_in_memory().unwrap();
        for i in 0..5 {
            store
                .record_message(&sample_message(100 + i, 7, "bob"))
                .await
                .unwrap();
        }

        assert_eq!(store.count_messages_by(7).await.unwrap(), 5);
        let user = store.get_user(7).await.unwrap().unwrap();
        assert_eq!(user.username, "bob");
    }

    #[tokio::test]
    async fn test_count_is_per_author() {
        let store = MessageStore::open_in_memory().unwrap();
        store
            .record_message(&sample_message(1, 7, "bob"))
            .await
            .unwrap();
        store
            .record_message(&sample_message(2, 8, "carol"))
            .await
            .unwrap();
        store
            .record_message(&sample_message(3, 8, "carol"))
            .await
            .unwrap();

        assert_eq!(store.count_messages_by(7).await.unwrap(), 1);
        assert_eq!(store.count_messages_by(8).await.unwrap(), 2);
        assert_eq!(store.count_messages_by(9).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_message_id_rolls_back() {
        let store = MessageStore::open_in_memory().unwrap();
        store
            .record_message(&sample_message(1, 7, "bob"))
            .await
            .unwrap();

        // Same message snowflake again: primary key violation, transaction
        // rolls back, count unchanged.
        let err = store.record_message(&sample_message(1, 7, "bob")).await;
        assert!(matches!(err, Err(StorageError::Sqlite(_))));
        assert_eq!(store.count_messages_by(7).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_large_snowflakes_round_trip() {
        let store = MessageStore::open_in_memory().unwrap();
        let big = u64::MAX - 3;
        store.ensure_user_created(big, "edge").await.unwrap();

        let user = store.get_user(big).await.unwrap().unwrap();
        assert_eq!(user.id, big);
    }
}

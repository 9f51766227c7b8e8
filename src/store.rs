//! Persistent SQLite store: one versioned JSON record per conversation.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dialogue::{ConversationState, ProfileStore, Session, UserProfile};

/// Current record layout.
pub const RECORD_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("malformed session record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("session record for chat {chat_id} has unsupported version {version}")]
    UnsupportedVersion { chat_id: i64, version: u32 },
    #[error("session store lock poisoned")]
    Poisoned,
}

#[derive(Deserialize)]
struct RecordHeader {
    version: u32,
}

/// On-disk form of a [`Session`].
#[derive(Debug, Serialize, Deserialize)]
struct Record {
    version: u32,
    state: Option<ConversationState>,
    #[serde(default)]
    facts: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    choice: Option<String>,
}

impl Record {
    fn from_session(session: &Session) -> Self {
        let (facts, choice) = session.profile.clone().into_parts();
        Self { version: RECORD_VERSION, state: session.state, facts, choice }
    }

    fn into_session(self) -> Session {
        Session {
            state: self.state,
            profile: UserProfile::from_parts(self.facts, self.choice),
        }
    }
}

/// Parse a stored record, rejecting versions this build doesn't know.
fn decode(chat_id: i64, text: &str) -> Result<Session, StoreError> {
    let header: RecordHeader = serde_json::from_str(text)?;
    if header.version != RECORD_VERSION {
        return Err(StoreError::UnsupportedVersion { chat_id, version: header.version });
    }
    let record: Record = serde_json::from_str(text)?;
    Ok(record.into_session())
}

/// Conversation sessions keyed by chat id.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Create a new in-memory store.
    pub fn new() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    /// Open (or create) the store at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let store = Self::with_connection(Connection::open(path)?)?;
        info!("Loaded session store from {:?} ({} conversations)", path, store.conversation_count()?);
        Ok(store)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                chat_id INTEGER PRIMARY KEY,
                record TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
        "#,
        )?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    pub fn load_session(&self, chat_id: i64) -> Result<Session, StoreError> {
        let conn = self.conn()?;
        let record: Option<String> = conn
            .query_row(
                "SELECT record FROM sessions WHERE chat_id = ?1",
                params![chat_id],
                |row| row.get(0),
            )
            .optional()?;
        match record {
            Some(text) => decode(chat_id, &text),
            None => {
                debug!("No session for chat {chat_id}, starting empty");
                Ok(Session::default())
            }
        }
    }

    pub fn save_session(&self, chat_id: i64, session: &Session) -> Result<(), StoreError> {
        let record = serde_json::to_string(&Record::from_session(session))?;
        let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO sessions (chat_id, record, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(chat_id) DO UPDATE SET record = ?2, updated_at = ?3",
            params![chat_id, record, now],
        )?;
        debug!("Saved session for chat {chat_id}");
        Ok(())
    }

    /// Number of conversations ever seen.
    pub fn conversation_count(&self) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    #[cfg(test)]
    fn put_raw(&self, chat_id: i64, record: &str) {
        let conn = self.conn().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO sessions (chat_id, record, updated_at) VALUES (?1, ?2, 'test')",
            params![chat_id, record],
        )
        .unwrap();
    }
}

impl ProfileStore for Store {
    fn load(&self, chat_id: i64) -> Result<Session, StoreError> {
        self.load_session(chat_id)
    }

    fn save(&self, chat_id: i64, session: &Session) -> Result<(), StoreError> {
        self.save_session(chat_id, session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session() -> Session {
        let mut profile = UserProfile::new();
        profile.set("age", "34");
        profile.set("savings", "5000");
        profile.set_choice("budget");
        Session { state: Some(ConversationState::TypingReply), profile }
    }

    #[test]
    fn test_unknown_chat_loads_empty() {
        let store = Store::new().unwrap();
        assert_eq!(store.load_session(42).unwrap(), Session::default());
    }

    #[test]
    fn test_save_then_load() {
        let store = Store::new().unwrap();
        let session = sample_session();
        store.save_session(7, &session).unwrap();
        assert_eq!(store.load_session(7).unwrap(), session);
        assert_eq!(store.conversation_count().unwrap(), 1);
    }

    #[test]
    fn test_conversations_are_isolated() {
        let store = Store::new().unwrap();
        store.save_session(1, &sample_session()).unwrap();
        assert_eq!(store.load_session(2).unwrap(), Session::default());

        let mut other = Session::default();
        other.profile.set("age", "51");
        store.save_session(2, &other).unwrap();
        assert_eq!(store.load_session(1).unwrap().profile.get("age"), Some("34"));
        assert_eq!(store.load_session(2).unwrap().profile.get("age"), Some("51"));
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.db");
        let session = sample_session();
        {
            let store = Store::open(&path).unwrap();
            store.save_session(-100123, &session).unwrap();
        }
        let store = Store::open(&path).unwrap();
        assert_eq!(store.load_session(-100123).unwrap(), session);
    }

    #[test]
    fn test_record_layout() {
        let store = Store::new().unwrap();
        let mut session = Session::default();
        session.profile.set("age", "34");
        store.save_session(5, &session).unwrap();

        let conn = store.conn().unwrap();
        let text: String = conn
            .query_row("SELECT record FROM sessions WHERE chat_id = 5", [], |row| row.get(0))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["version"], 1);
        assert!(value["state"].is_null());
        assert_eq!(value["facts"]["age"], "34");
        assert!(value.get("choice").is_none());
    }

    #[test]
    fn test_rejects_unknown_version() {
        let store = Store::new().unwrap();
        store.put_raw(9, r#"{"version": 2, "state": null, "facts": {}}"#);
        let err = store.load_session(9).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedVersion { chat_id: 9, version: 2 }));
    }

    #[test]
    fn test_rejects_garbage() {
        let store = Store::new().unwrap();
        store.put_raw(9, "not json");
        assert!(matches!(store.load_session(9), Err(StoreError::Json(_))));
    }
}

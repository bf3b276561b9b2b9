use std::sync::{Mutex, PoisonError};

use rusqlite::Connection;

use super::StoredSession;
use crate::db;

/// Client-side persistence for the credential pair.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> anyhow::Result<Option<StoredSession>>;
    fn save(&self, session: &StoredSession) -> anyhow::Result<()>;
    fn clear(&self) -> anyhow::Result<()>;
}

pub struct SqliteCredentialStore {
    conn: Mutex<Connection>,
}

impl SqliteCredentialStore {
    pub fn open(path: &str) -> anyhow::Result<Self> {
        Ok(Self {
            conn: Mutex::new(db::init_db(path)?),
        })
    }
}

impl CredentialStore for SqliteCredentialStore {
    fn load(&self) -> anyhow::Result<Option<StoredSession>> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        db::queries::load_session(&conn)
    }

    fn save(&self, session: &StoredSession) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        db::queries::save_session(&conn, session)
    }

    fn clear(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        db::queries::clear_session(&conn)
    }
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Option<StoredSession>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: StoredSession) -> Self {
        Self {
            inner: Mutex::new(Some(session)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> anyhow::Result<Option<StoredSession>> {
        Ok(self.inner.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, session: &StoredSession) -> anyhow::Result<()> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

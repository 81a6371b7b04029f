//! SQLite-backed local store adapter.
//!
//! The offline counterpart of the hosted store: one row per habit with the
//! record stored as JSON, republished through a watch channel after every
//! mutation so subscribers see the same push-on-change contract as the
//! remote adapter.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use tokio::sync::watch;
use tracing::debug;

use crate::error::StoreError;
use crate::habit::HabitId;
use crate::record::{HabitDraft, HabitPatch, HabitRecord};
use crate::store::{data_dir, HabitStore, UserId};

pub struct LocalStore {
    conn: Mutex<Connection>,
    publishers: Mutex<HashMap<UserId, watch::Sender<Vec<HabitRecord>>>>,
}

impl LocalStore {
    /// Open the database at `~/.config/habitloop/habits.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self, StoreError> {
        let path = data_dir()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .join("habits.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::from_conn(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StoreError> {
        Self::from_conn(Connection::open_in_memory()?)
    }

    fn from_conn(conn: Connection) -> Result<Self, StoreError> {
        let store = Self {
            conn: Mutex::new(conn),
            publishers: Mutex::new(HashMap::new()),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        let conn = self.lock_conn()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS habits (
                id         TEXT PRIMARY KEY,
                user_id    TEXT NOT NULL,
                data       TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_habits_user ON habits(user_id);",
        )?;
        Ok(())
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("connection lock poisoned".to_string()))
    }

    fn load_all(&self, user: &UserId) -> Result<Vec<HabitRecord>, StoreError> {
        let conn = self.lock_conn()?;
        let mut stmt =
            conn.prepare("SELECT data FROM habits WHERE user_id = ?1 ORDER BY updated_at")?;
        let rows = stmt.query_map(params![user.as_str()], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for row in rows {
            let json = row?;
            let record: HabitRecord = serde_json::from_str(&json)
                .map_err(|e| StoreError::Decode(e.to_string()))?;
            records.push(record);
        }
        Ok(records)
    }

    fn load_one(&self, user: &UserId, id: HabitId) -> Result<HabitRecord, StoreError> {
        let conn = self.lock_conn()?;
        let json: Option<String> = conn
            .query_row(
                "SELECT data FROM habits WHERE user_id = ?1 AND id = ?2",
                params![user.as_str(), id.to_string()],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(StoreError::from(other)),
            })?;

        let json = json.ok_or(StoreError::NotFound(id))?;
        serde_json::from_str(&json).map_err(|e| StoreError::Decode(e.to_string()))
    }

    fn save(&self, user: &UserId, record: &HabitRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string(record).map_err(|e| StoreError::Decode(e.to_string()))?;
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO habits (id, user_id, data, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET data = ?3, updated_at = ?4",
            params![
                record.id.to_string(),
                user.as_str(),
                json,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    /// Push the current collection to the user's subscriber, if any.
    fn publish(&self, user: &UserId) -> Result<(), StoreError> {
        let records = self.load_all(user)?;
        if let Ok(publishers) = self.publishers.lock() {
            if let Some(tx) = publishers.get(user) {
                tx.send_replace(records);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl HabitStore for LocalStore {
    async fn subscribe(
        &self,
        user: &UserId,
    ) -> Result<watch::Receiver<Vec<HabitRecord>>, StoreError> {
        let snapshot = self.load_all(user)?;
        let (tx, rx) = watch::channel(snapshot);
        self.publishers
            .lock()
            .map_err(|_| StoreError::Database("publisher lock poisoned".to_string()))?
            .insert(user.clone(), tx);
        Ok(rx)
    }

    async fn create(&self, user: &UserId, draft: HabitDraft) -> Result<HabitId, StoreError> {
        let id = HabitId::new();
        let record = HabitRecord::from_habit(&draft.into_habit(id));
        self.save(user, &record)?;
        self.publish(user)?;
        debug!(habit = %id, "created habit");
        Ok(id)
    }

    async fn update(
        &self,
        user: &UserId,
        id: HabitId,
        patch: HabitPatch,
    ) -> Result<(), StoreError> {
        let mut record = self.load_one(user, id)?;
        patch.apply_to(&mut record);
        self.save(user, &record)?;
        self.publish(user)?;
        Ok(())
    }

    async fn delete(&self, user: &UserId, id: HabitId) -> Result<(), StoreError> {
        let removed = {
            let conn = self.lock_conn()?;
            conn.execute(
                "DELETE FROM habits WHERE user_id = ?1 AND id = ?2",
                params![user.as_str(), id.to_string()],
            )?
        };
        if removed == 0 {
            return Err(StoreError::NotFound(id));
        }
        self.publish(user)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::{Reminder, Schedule};

    fn draft(title: &str) -> HabitDraft {
        HabitDraft {
            title: title.to_string(),
            description: String::new(),
            schedule: Schedule::Daily,
            reminder: Reminder::off(),
        }
    }

    #[tokio::test]
    async fn create_load_update_delete() {
        let store = LocalStore::open_memory().unwrap();
        let user = UserId::new("u1");

        let id = store.create(&user, draft("Read")).await.unwrap();
        let rx = store.subscribe(&user).await.unwrap();
        assert_eq!(rx.borrow().len(), 1);

        store
            .update(
                &user,
                id,
                HabitPatch {
                    title: Some("Read more".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(rx.borrow().first().unwrap().title, "Read more");

        store.delete(&user, id).await.unwrap();
        assert!(rx.borrow().is_empty());
        assert!(matches!(
            store.delete(&user, id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn subscribers_get_pushes_after_mutations() {
        let store = LocalStore::open_memory().unwrap();
        let user = UserId::new("u1");
        let mut rx = store.subscribe(&user).await.unwrap();
        assert!(rx.borrow().is_empty());

        store.create(&user, draft("Gym")).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);
    }

    #[tokio::test]
    async fn collections_are_per_user() {
        let store = LocalStore::open_memory().unwrap();
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        store.create(&alice, draft("Read")).await.unwrap();
        let rx = store.subscribe(&bob).await.unwrap();
        assert!(rx.borrow().is_empty());
    }

    #[tokio::test]
    async fn update_unknown_habit_is_not_found() {
        let store = LocalStore::open_memory().unwrap();
        let user = UserId::new("u1");
        let result = store
            .update(&user, HabitId::new(), HabitPatch::default())
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("habits.db");
        let user = UserId::new("u1");

        let id = {
            let store = LocalStore::open_at(&path).unwrap();
            store.create(&user, draft("Read")).await.unwrap()
        };

        let store = LocalStore::open_at(&path).unwrap();
        let rx = store.subscribe(&user).await.unwrap();
        assert_eq!(rx.borrow().first().unwrap().id, id);
    }
}

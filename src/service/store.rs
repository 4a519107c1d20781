//! Injected repositories.
//!
//! Packet-handling code never touches a concrete datastore; it consults
//! these traits. The in-memory implementations guard their maps with a
//! `RwLock`; the tables are read-mostly, and nothing in the wire protocol
//! prevents two sessions from resolving the same account concurrently.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::core::status::Difficulty;

/// One task as the registry knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
}

/// Credential registry: userID -> password plus existence queries, and
/// registration of accounts accepted by a signup exchange.
pub trait AccountStore: Send + Sync {
    /// The stored password for `user_id`, if the account exists.
    fn password_for(&self, user_id: &str) -> Option<String>;

    fn exists(&self, user_id: &str) -> bool {
        self.password_for(user_id).is_some()
    }

    /// Persist a new account. Called only after a signup request passed
    /// validation; replaces nothing (the existence check happened first).
    fn register(&self, user_id: &str, password: &str);
}

/// Task registry: task_id -> record plus existence queries.
pub trait TaskStore: Send + Sync {
    fn find(&self, task_id: u64) -> Option<TaskRecord>;

    fn exists(&self, task_id: u64) -> bool {
        self.find(task_id).is_some()
    }
}

/// In-memory account registry.
#[derive(Debug, Default)]
pub struct MemoryAccounts {
    users: RwLock<HashMap<String, String>>,
}

impl MemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-seeded with the demo accounts.
    pub fn demo() -> Self {
        let store = Self::new();
        store.register("admin", "admin123");
        store.register("user1", "password1");
        store.register("user2", "password2");
        store
    }
}

impl AccountStore for MemoryAccounts {
    fn password_for(&self, user_id: &str) -> Option<String> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        users.get(user_id).cloned()
    }

    fn register(&self, user_id: &str, password: &str) {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        users.insert(user_id.to_owned(), password.to_owned());
    }
}

/// In-memory task registry.
#[derive(Debug, Default)]
pub struct MemoryTasks {
    tasks: RwLock<HashMap<u64, TaskRecord>>,
}

impl MemoryTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: TaskRecord) {
        let mut tasks = self.tasks.write().unwrap_or_else(PoisonError::into_inner);
        tasks.insert(record.id, record);
    }

    /// Registry pre-seeded with the demo task board.
    pub fn demo() -> Self {
        let store = Self::new();
        store.insert(TaskRecord {
            id: 1,
            name: "CollectResources".to_owned(),
            description: "Head to the forest and gather 10 wood and 5 stone".to_owned(),
            difficulty: Difficulty::Medium,
        });
        store.insert(TaskRecord {
            id: 2,
            name: "DefeatMonsters".to_owned(),
            description: "Clear the eastern cave of 5 goblins".to_owned(),
            difficulty: Difficulty::Medium,
        });
        store.insert(TaskRecord {
            id: 3,
            name: "EscortMission".to_owned(),
            description: "Escort the merchant safely to the next town".to_owned(),
            difficulty: Difficulty::Medium,
        });
        store
    }
}

impl TaskStore for MemoryTasks {
    fn find(&self, task_id: u64) -> Option<TaskRecord> {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        tasks.get(&task_id).cloned()
    }
}

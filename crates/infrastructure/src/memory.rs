use crate::models::{InsertAck, UpdateAck};
use crate::repositories::{StoreError, TodoRepository};
use async_trait::async_trait;
use domain::{OwnerId, RecordId, StoredTodo, Todo, TodoPatch};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// プロセス内の Todo コレクション（開発/テスト用）
#[derive(Debug, Default)]
pub struct InMemoryTodoRepository {
    documents: Mutex<HashMap<RecordId, StoredTodo>>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存済みのドキュメントを主キー順で返す
    pub fn documents(&self) -> Vec<StoredTodo> {
        let documents = self.documents.lock().unwrap_or_else(PoisonError::into_inner);
        let mut all: Vec<StoredTodo> = documents.values().cloned().collect();
        all.sort_by_key(|stored| stored.id);
        all
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<RecordId, StoredTodo>>, StoreError> {
        self.documents
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }

    fn update(
        &self,
        id: &str,
        owner_id: Option<&OwnerId>,
        patch: &TodoPatch,
    ) -> Result<UpdateAck, StoreError> {
        let record_id = RecordId::parse(id)?;
        let mut documents = self.lock()?;

        let Some(stored) = documents.get_mut(&record_id) else {
            return Ok(UpdateAck::unmatched());
        };
        if owner_id.is_some_and(|owner| stored.todo.owner_id != *owner) {
            return Ok(UpdateAck::unmatched());
        }

        let modified = patch.apply(&mut stored.todo);
        debug!(record_id = %record_id, modified, "Todo updated in memory");
        Ok(UpdateAck::matched(modified))
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn insert_one(&self, todo: &Todo) -> Result<InsertAck, StoreError> {
        let record_id = RecordId::new();
        self.lock()?.insert(
            record_id,
            StoredTodo {
                id: record_id,
                todo: todo.clone(),
            },
        );
        debug!(record_id = %record_id, "Todo inserted in memory");
        Ok(InsertAck::new(record_id))
    }

    async fn find_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<StoredTodo>, StoreError> {
        let documents = self.lock()?;
        Ok(documents
            .values()
            .filter(|stored| stored.todo.owner_id == *owner_id)
            .cloned()
            .collect())
    }

    async fn update_by_id(&self, id: &str, patch: &TodoPatch) -> Result<UpdateAck, StoreError> {
        self.update(id, None, patch)
    }

    async fn update_owned_by_id(
        &self,
        id: &str,
        owner_id: &OwnerId,
        patch: &TodoPatch,
    ) -> Result<UpdateAck, StoreError> {
        self.update(id, Some(owner_id), patch)
    }
}

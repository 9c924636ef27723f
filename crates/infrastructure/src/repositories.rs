use crate::models::{InsertAck, UpdateAck};
use async_trait::async_trait;
use domain::{DomainError, OwnerId, StoredTodo, Todo, TodoPatch};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// 主キーとして解釈できない ID
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Failed to decode stored item: {0}")]
    Decode(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<DomainError> for StoreError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidIdentifier(id) => StoreError::InvalidIdentifier(id),
            other => StoreError::Decode(other.to_string()),
        }
    }
}

/// Todo コレクションへのアクセス
///
/// 検証は呼び出し側の責務。更新で一致するレコードがなくてもエラーにはならず、
/// `UpdateAck::matched_count` が 0 になる。
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// 新しいレコードを保存し、割り当てた主キーを返す
    async fn insert_one(&self, todo: &Todo) -> Result<InsertAck, StoreError>;

    /// 所有者が一致するレコードをすべて返す（順序は保証しない）
    async fn find_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<StoredTodo>, StoreError>;

    /// 主キーで指定したレコードに部分更新を適用する
    async fn update_by_id(&self, id: &str, patch: &TodoPatch) -> Result<UpdateAck, StoreError>;

    /// `update_by_id` に加えて所有者の一致も条件にする
    async fn update_owned_by_id(
        &self,
        id: &str,
        owner_id: &OwnerId,
        patch: &TodoPatch,
    ) -> Result<UpdateAck, StoreError>;
}

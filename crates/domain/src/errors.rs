use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// ストアの主キーとして解釈できない識別子
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid TodoId: {0}")]
    InvalidTodoId(String),

    #[error("Invalid OwnerId: {0}")]
    InvalidOwnerId(String),
}

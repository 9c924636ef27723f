use crate::identifiers::OwnerId;
use thiserror::Error;

/// セッションクッキー名
pub const SESSION_COOKIE: &str = "todox-session";

/// 解決済みのセッション
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: OwnerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Session token missing")]
    Missing,

    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("Session expired")]
    ExpiredSession,
}

/// セッショントークンをユーザーに解決する外部機能
pub trait SessionResolver: Send + Sync {
    fn resolve(&self, token: &str) -> Result<Session, SessionError>;
}

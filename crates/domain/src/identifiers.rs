use crate::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;
use uuid::Uuid;

/// 公開用の Todo 識別子（UUID v4、ハイフン区切りの文字列表現）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(Uuid);

impl TodoId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| DomainError::InvalidTodoId(s.to_string()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

/// ストアが割り当てる主キー（ULID）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Ulid);

impl RecordId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// 外部から渡された文字列を主キーに変換する
    pub fn parse(s: &str) -> DomainResult<Self> {
        Ulid::from_string(s)
            .map(Self)
            .map_err(|_| DomainError::InvalidIdentifier(s.to_string()))
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.0.timestamp_ms()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

/// Todo の所有者（セッションから解決されたユーザー ID）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn from_string(s: String) -> DomainResult<Self> {
        if s.trim().is_empty() {
            return Err(DomainError::InvalidOwnerId(
                "Owner ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_todo_id_uses_hyphenated_uuid_v4() {
        // Act: 新しい TodoId を生成
        let id = TodoId::new();
        let text = id.to_string();

        // Assert: 36 文字の UUID v4 表現であること
        assert_eq!(text.len(), 36);
        assert_eq!(id.as_uuid().get_version_num(), 4);
        assert_eq!(TodoId::parse(&text).unwrap(), id);
    }

    #[test]
    fn test_todo_id_serializes_as_string() {
        let id = TodoId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.to_string()));
    }

    #[test]
    fn test_record_id_rejects_malformed_input() {
        // Arrange: ULID として不正な文字列
        let inputs = ["", "not-an-id", "0123456789", "65f0c0ffee0000000000abcd"];

        for input in inputs {
            // Act & Assert: InvalidIdentifier が返ること
            assert_eq!(
                RecordId::parse(input),
                Err(DomainError::InvalidIdentifier(input.to_string()))
            );
        }
    }

    #[test]
    fn test_record_id_round_trips_through_text() {
        let id = RecordId::new();
        assert_eq!(RecordId::parse(&id.to_string()).unwrap(), id);
        assert!(id.timestamp_ms() > 0);
    }

    #[test]
    fn test_owner_id_cannot_be_blank() {
        assert!(OwnerId::from_string("  ".to_string()).is_err());
        assert_eq!(OwnerId::from_string("U1".to_string()).unwrap().as_str(), "U1");
    }
}

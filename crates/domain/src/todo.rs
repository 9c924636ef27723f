use crate::identifiers::{OwnerId, RecordId, TodoId};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// ドキュメント上のフィールド名
pub mod fields {
    pub const RECORD_ID: &str = "_id";
    pub const TODO_ID: &str = "todoID";
    pub const OWNER_ID: &str = "ownerId";
    pub const NAME: &str = "name";
    pub const IS_COMPLETE: &str = "isComplete";
    pub const CREATED: &str = "created";
}

/// 永続化される Todo ドキュメント（主キーを除く）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    #[serde(rename = "todoID")]
    pub todo_id: TodoId,
    #[serde(rename = "ownerId")]
    pub owner_id: OwnerId,
    pub name: String,
    #[serde(rename = "isComplete")]
    pub is_complete: bool,
    #[serde(with = "iso8601_millis")]
    pub created: DateTime<Utc>,
}

/// ストアから読み出した Todo（主キー付き）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTodo {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(flatten)]
    pub todo: Todo,
}

/// 作成リクエストのフィールドにサーバー側の値を重ねたドキュメントを組み立てる
///
/// サーバー側の値は最後に書き込むため、リクエストに `ownerId` や
/// `isComplete` が含まれていても上書きされる。
pub fn new_todo_document(
    mut body: Map<String, Value>,
    todo_id: TodoId,
    owner_id: &OwnerId,
    created: DateTime<Utc>,
) -> Value {
    body.insert(fields::TODO_ID.to_string(), Value::String(todo_id.to_string()));
    body.insert(
        fields::OWNER_ID.to_string(),
        Value::String(owner_id.as_str().to_string()),
    );
    body.insert(
        fields::CREATED.to_string(),
        Value::String(format_timestamp(&created)),
    );
    body.insert(fields::IS_COMPLETE.to_string(), Value::Bool(false));
    Value::Object(body)
}

/// UTC の ISO-8601 表現（ミリ秒、`Z` 終端）
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 部分更新の内容。`None` のフィールドは変更しない
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub is_complete: Option<bool>,
    pub name: Option<String>,
}

impl TodoPatch {
    /// 空文字の名前は指定なしとして扱う
    pub fn new(is_complete: Option<bool>, name: Option<String>) -> Self {
        Self {
            is_complete,
            name: name.filter(|n| !n.is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.is_complete.is_none() && self.name.is_none()
    }

    /// 適用した場合に値が変わるかどうか
    pub fn modifies(&self, todo: &Todo) -> bool {
        let complete_changes = self
            .is_complete
            .is_some_and(|complete| complete != todo.is_complete);
        let name_changes = self.name.as_deref().is_some_and(|name| name != todo.name);
        complete_changes || name_changes
    }

    /// 指定されたフィールドだけを書き換え、値が変わったかを返す
    pub fn apply(&self, todo: &mut Todo) -> bool {
        let modified = self.modifies(todo);
        if let Some(complete) = self.is_complete {
            todo.is_complete = complete;
        }
        if let Some(name) = &self.name {
            todo.name.clone_from(name);
        }
        modified
    }
}

pub mod iso8601_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

use crate::repositories::StoreError;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use domain::{fields, format_timestamp, OwnerId, RecordId, StoredTodo, Todo, TodoId, TodoPatch};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 所有者検索用のグローバルセカンダリインデックス
pub const OWNER_INDEX: &str = "GSI1";

/// 挿入の確認応答
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    pub inserted_id: RecordId,
}

impl InsertAck {
    pub fn new(inserted_id: RecordId) -> Self {
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

/// 更新の確認応答
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

impl UpdateAck {
    pub fn matched(modified: bool) -> Self {
        Self {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(modified),
        }
    }

    pub fn unmatched() -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
        }
    }
}

/// DynamoDB Single Table Design のキー構造
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamoDbKeys {
    pub pk: String,      // パーティションキー
    pub sk: String,      // ソートキー
    pub gsi1_pk: String, // 所有者パーティション
    pub gsi1_sk: String,
}

impl DynamoDbKeys {
    pub fn for_todo(record_id: &RecordId, owner_id: &OwnerId) -> Self {
        let (pk, sk) = Self::primary(record_id);
        Self {
            pk,
            sk,
            gsi1_pk: Self::owner_partition(owner_id),
            gsi1_sk: format!("TODO#{record_id}"),
        }
    }

    pub fn primary(record_id: &RecordId) -> (String, String) {
        (format!("TODO#{record_id}"), "TODO".to_string())
    }

    pub fn owner_partition(owner_id: &OwnerId) -> String {
        format!("OWNER#{owner_id}")
    }
}

/// Todo を DynamoDB アイテムに変換
pub fn todo_to_item(record_id: &RecordId, todo: &Todo) -> HashMap<String, AttributeValue> {
    let keys = DynamoDbKeys::for_todo(record_id, &todo.owner_id);

    HashMap::from([
        ("PK".to_string(), AttributeValue::S(keys.pk)),
        ("SK".to_string(), AttributeValue::S(keys.sk)),
        ("GSI1PK".to_string(), AttributeValue::S(keys.gsi1_pk)),
        ("GSI1SK".to_string(), AttributeValue::S(keys.gsi1_sk)),
        (
            fields::RECORD_ID.to_string(),
            AttributeValue::S(record_id.to_string()),
        ),
        (
            fields::TODO_ID.to_string(),
            AttributeValue::S(todo.todo_id.to_string()),
        ),
        (
            fields::OWNER_ID.to_string(),
            AttributeValue::S(todo.owner_id.to_string()),
        ),
        (fields::NAME.to_string(), AttributeValue::S(todo.name.clone())),
        (
            fields::IS_COMPLETE.to_string(),
            AttributeValue::Bool(todo.is_complete),
        ),
        (
            fields::CREATED.to_string(),
            AttributeValue::S(format_timestamp(&todo.created)),
        ),
    ])
}

/// DynamoDB アイテムを Todo に復元
pub fn item_to_stored_todo(item: &HashMap<String, AttributeValue>) -> Result<StoredTodo, StoreError> {
    let id = RecordId::parse(string_attr(item, fields::RECORD_ID)?)
        .map_err(|e| StoreError::Decode(e.to_string()))?;
    let todo_id = TodoId::parse(string_attr(item, fields::TODO_ID)?)?;
    let owner_id = OwnerId::from_string(string_attr(item, fields::OWNER_ID)?.to_string())?;
    let name = string_attr(item, fields::NAME)?.to_string();
    let is_complete = item
        .get(fields::IS_COMPLETE)
        .and_then(|v| v.as_bool().ok())
        .copied()
        .ok_or_else(|| malformed(fields::IS_COMPLETE))?;
    let created = DateTime::parse_from_rfc3339(string_attr(item, fields::CREATED)?)
        .map_err(|_| malformed(fields::CREATED))?
        .with_timezone(&Utc);

    Ok(StoredTodo {
        id,
        todo: Todo {
            todo_id,
            owner_id,
            name,
            is_complete,
            created,
        },
    })
}

fn string_attr<'a>(
    item: &'a HashMap<String, AttributeValue>,
    name: &str,
) -> Result<&'a str, StoreError> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .map(String::as_str)
        .ok_or_else(|| malformed(name))
}

fn malformed(name: &str) -> StoreError {
    StoreError::Decode(format!("missing or malformed attribute `{name}`"))
}

/// 部分更新を UpdateItem の式に変換したもの
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePlan {
    pub update_expression: String,
    pub condition_expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

impl UpdatePlan {
    /// 指定されたフィールドだけを SET する。空のパッチでは `None`
    pub fn for_patch(patch: &TodoPatch, owner_id: Option<&OwnerId>) -> Option<Self> {
        if patch.is_empty() {
            return None;
        }

        let mut assignments = Vec::new();
        let mut names = HashMap::new();
        let mut values = HashMap::new();

        if let Some(complete) = patch.is_complete {
            assignments.push("#isComplete = :isComplete");
            names.insert("#isComplete".to_string(), fields::IS_COMPLETE.to_string());
            values.insert(":isComplete".to_string(), AttributeValue::Bool(complete));
        }

        // name は DynamoDB の予約語
        if let Some(name) = &patch.name {
            assignments.push("#name = :name");
            names.insert("#name".to_string(), fields::NAME.to_string());
            values.insert(":name".to_string(), AttributeValue::S(name.clone()));
        }

        let mut condition_expression = "attribute_exists(PK)".to_string();
        if let Some(owner_id) = owner_id {
            condition_expression.push_str(" AND #ownerId = :ownerId");
            names.insert("#ownerId".to_string(), fields::OWNER_ID.to_string());
            values.insert(
                ":ownerId".to_string(),
                AttributeValue::S(owner_id.to_string()),
            );
        }

        Some(Self {
            update_expression: format!("SET {}", assignments.join(", ")),
            condition_expression,
            names,
            values,
        })
    }
}

use domain::{StoredTodo, TodoPatch};
use serde::{Deserialize, Serialize};

/// GET /todo レスポンス
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoListResponse {
    pub todos_list: Vec<StoredTodo>,
}

/// PATCH /todo/:id リクエスト（未知のフィールドは無視）
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchTodoRequest {
    pub is_complete: Option<bool>,
    pub name: Option<String>,
}

impl From<PatchTodoRequest> for TodoPatch {
    fn from(request: PatchTodoRequest) -> Self {
        TodoPatch::new(request.is_complete, request.name)
    }
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    /// サービスの簡易ステータス
    pub status: &'static str,
}

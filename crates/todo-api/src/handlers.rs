use crate::error::ApiError;
use crate::models::{HealthBody, PatchTodoRequest, TodoListResponse};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use domain::{new_todo_document, validate_todo, Session, Todo, TodoId, TodoPatch};
use infrastructure::{InsertAck, StoreError, UpdateAck};
use serde_json::Value;
use tracing::{info, warn};

pub const CREATE_FAILED: &str = "Todo creation failed.";
pub const LIST_FAILED: &str = "Retrieving list of Todos failed.";
pub const UPDATE_FAILED: &str = "Updating status of Todo failed.";

/// ヘルスチェック用ハンドラ
pub async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

/// POST /todo
///
/// リクエストのフィールドにサーバー側の値（todoID / ownerId / created /
/// isComplete=false）を重ね、検証を通ったものだけを保存する。
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    body: Bytes,
) -> Result<(StatusCode, Json<InsertAck>), ApiError> {
    let Value::Object(fields) = serde_json::from_slice::<Value>(&body)? else {
        return Err(ApiError::BadRequest(
            "Request body must be a JSON object".to_string(),
        ));
    };

    let document = new_todo_document(fields, TodoId::new(), &session.user_id, Utc::now());
    if let Err(errors) = validate_todo(&document) {
        warn!(
            owner_id = %session.user_id,
            violations = ?errors.violations(),
            "Rejected invalid todo"
        );
        return Err(errors.into());
    }

    let todo: Todo =
        serde_json::from_value(document).map_err(|e| ApiError::internal(CREATE_FAILED, e))?;
    let ack = state
        .repository
        .insert_one(&todo)
        .await
        .map_err(|e| ApiError::internal(CREATE_FAILED, e))?;

    info!(
        owner_id = %todo.owner_id,
        todo_id = %todo.todo_id,
        record_id = %ack.inserted_id,
        "Todo created"
    );
    Ok((StatusCode::CREATED, Json(ack)))
}

/// GET /todo
pub async fn list_todos(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<TodoListResponse>, ApiError> {
    let todos_list = state
        .repository
        .find_by_owner(&session.user_id)
        .await
        .map_err(|e| ApiError::internal(LIST_FAILED, e))?;

    Ok(Json(TodoListResponse { todos_list }))
}

/// PATCH /todo/:id
///
/// `isComplete` と `name` のうち、送られてきたものだけを更新する。
pub async fn patch_todo(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<UpdateAck>, ApiError> {
    let request: PatchTodoRequest = serde_json::from_slice(&body)?;
    let patch = TodoPatch::from(request);

    let result = if state.enforce_ownership {
        state
            .repository
            .update_owned_by_id(&id, &session.user_id, &patch)
            .await
    } else {
        state.repository.update_by_id(&id, &patch).await
    };

    let ack = result.map_err(|e| {
        if let StoreError::InvalidIdentifier(_) = &e {
            warn!(id = %id, "Malformed todo id in update");
        }
        ApiError::internal(UPDATE_FAILED, e)
    })?;

    if ack.matched_count == 0 {
        info!(id = %id, owner_id = %session.user_id, "Update matched no todo");
    }
    Ok(Json(ack))
}

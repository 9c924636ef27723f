//! todox の HTTP API（axum）
//!
//! `/todo` 配下はすべてセッションクッキー必須。ストアとセッション解決は
//! `AppState` から注入する。

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, patch},
    Router,
};
use domain::SessionResolver;
use infrastructure::TodoRepository;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// アプリケーションの共有状態
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn TodoRepository>,
    pub sessions: Arc<dyn SessionResolver>,
    /// 更新時に所有者を確認するか
    pub enforce_ownership: bool,
}

impl AppState {
    pub fn new(repository: Arc<dyn TodoRepository>, sessions: Arc<dyn SessionResolver>) -> Self {
        Self {
            repository,
            sessions,
            enforce_ownership: false,
        }
    }

    pub fn with_ownership_check(mut self, enabled: bool) -> Self {
        self.enforce_ownership = enabled;
        self
    }
}

/// ルータを構築して返します。
pub fn app_with_state(state: AppState) -> Router {
    let todo_routes = Router::new()
        .route(
            "/todo",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route("/todo/:id", patch(handlers::patch_todo))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::require_session,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(todo_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// フロントエンドのオリジンからクッキー付きで呼べるようにする
pub fn cors_layer(origin: &str) -> Result<CorsLayer, header::InvalidHeaderValue> {
    Ok(CorsLayer::new()
        .allow_origin(HeaderValue::from_str(origin)?)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}

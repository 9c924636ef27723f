use crate::{error::ApiError, AppState};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use domain::{SessionError, SESSION_COOKIE};
use tracing::warn;

/// セッションクッキーを解決し、`Session` をリクエスト拡張に入れる
///
/// 解決できなければハンドラーを呼ばずに 401 を返す。
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let resolved = match session_cookie(request.headers()) {
        Some(token) => state.sessions.resolve(token),
        None => Err(SessionError::Missing),
    };

    let session = resolved.map_err(|e| {
        warn!(
            error = %e,
            method = %request.method(),
            path = %request.uri().path(),
            "Rejected unauthenticated request"
        );
        ApiError::Unauthorized
    })?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// `Cookie` ヘッダーからセッショントークンを取り出す
pub fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim_matches('"'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(cookies: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for cookie in cookies {
            headers.append(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        headers
    }

    #[test]
    fn test_finds_session_among_other_cookies() {
        let headers = headers_with(&["theme=dark; todox-session=abc.def.ghi; lang=ja"]);
        assert_eq!(session_cookie(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_finds_session_in_second_cookie_header() {
        let headers = headers_with(&["theme=dark", "todox-session=\"quoted\""]);
        assert_eq!(session_cookie(&headers), Some("quoted"));
    }

    #[test]
    fn test_missing_session_cookie() {
        assert_eq!(session_cookie(&headers_with(&["theme=dark"])), None);
        assert_eq!(session_cookie(&HeaderMap::new()), None);
        assert_eq!(
            session_cookie(&headers_with(&["todox-session-old=abc"])),
            None
        );
    }
}

//! # 保存済み画像の配信
//!
//! GET /static/uploads/{file}
//!
//! 送信メール中の署名画像は、このパスの絶対URLで参照される。

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;

use crate::config::AppState;
use crate::error::AppError;

/// 拡張子からContent-Typeを決める。
fn content_type(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        _ => "application/octet-stream",
    }
}

/// GET /static/uploads/{file} ハンドラ
pub async fn handle_upload_file(
    State(state): State<Arc<AppState>>,
    Path(file): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bytes = state.images.read(&file).await.map_err(|e| {
        tracing::debug!(file = %file, error = %e, "画像が見つかりません");
        AppError::NotFound(file.clone())
    })?;

    Ok(([(header::CONTENT_TYPE, content_type(&file))], bytes))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::endpoints::test_helpers::*;

    #[test]
    fn test_content_type() {
        assert_eq!(content_type("logo.PNG"), "image/png");
        assert_eq!(content_type("photo.jpeg"), "image/jpeg");
        assert_eq!(content_type("icon.svg"), "image/svg+xml");
        assert_eq!(content_type("README"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_serves_stored_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("banner.gif"), b"GIF89a").unwrap();
        let state = default_state(&dir);

        let response = handle_upload_file(State(state), Path("banner.gif".to_string()))
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/gif");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = default_state(&dir);

        let err = handle_upload_file(State(state), Path("absent.png".to_string()))
            .await
            .err()
            .unwrap();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rejects_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let state = default_state(&dir);

        let err = handle_upload_file(State(state), Path("..".to_string()))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}

//! # 画像アップロード
//!
//! POST /api/upload-image
//!
//! マルチパートの `image` フィールドをクライアント指定のファイル名で保存し、
//! 公開パスを返す。同名ファイルは上書きする。

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use sigman_core::html::ImageError;
use sigman_types::UploadResponse;

use crate::config::AppState;
use crate::error::AppError;

/// 画像を受け取るフィールド名
const IMAGE_FIELD: &str = "image";

/// POST /api/upload-image ハンドラ
pub async fn handle_upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("マルチパートの解析に失敗: {e}")))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(AppError::BadRequest("ファイルが選択されていません".to_string()));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("アップロードの読み込みに失敗: {e}")))?;

        let url = state
            .images
            .save_upload(&filename, &bytes)
            .await
            .map_err(|e| match e {
                ImageError::InvalidName(_) => AppError::BadRequest(e.to_string()),
                other => AppError::Storage(other.to_string()),
            })?;

        tracing::info!(url = %url, size = bytes.len(), "画像をアップロードしました");
        return Ok(Json(UploadResponse { url }));
    }

    Err(AppError::BadRequest("画像ファイルがありません".to_string()))
}

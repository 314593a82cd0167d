//! # HTTPエラー型
//!
//! ハンドラがエラーとして返すのは不正なリクエストとストレージ障害のみ。
//! プロバイダー呼び出しの失敗は画面の通知（notices）として返す。

use axum::http::StatusCode;
use axum::Json;
use sigman_types::ErrorBody;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 不正なリクエスト
    #[error("{0}")]
    BadRequest(String),
    /// 保存済み画像が見つからない
    #[error("ファイルが見つかりません: {0}")]
    NotFound(String),
    /// ストレージ操作に失敗
    #[error("ストレージ操作に失敗: {0}")]
    Storage(String),
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

//! # HTTPエンドポイント
//!
//! | メソッド | パス | ハンドラ |
//! |----------|------|----------|
//! | GET | `/` | `users::handle_index` |
//! | GET/POST | `/signature/{user_email}` | `signature` |
//! | GET/POST | `/user-info/{user_email}` | `user_info` |
//! | POST | `/api/user-info` | `user_info::handle_api_update` |
//! | POST | `/api/upload-image` | `upload::handle_upload_image` |
//! | POST | `/bulk-apply` | `bulk::handle_bulk_apply` |
//! | GET/POST | `/bulk-update-users` | `users` |
//! | GET | `/static/uploads/{file}` | `static_files::handle_upload_file` |

pub mod bulk;
pub mod signature;
pub mod static_files;
pub mod upload;
pub mod user_info;
pub mod users;

#[cfg(test)]
pub(crate) mod test_helpers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use sigman_google::GoogleError;

use crate::config::{AppConfig, AppState};

/// リクエストボディの上限（署名中のインライン画像・アップロード画像を含む）
const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// 全エンドポイントを登録したルーターを構築する。
pub fn router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .route("/", get(users::handle_index))
        .route(
            "/signature/{user_email}",
            get(signature::handle_signature_page).post(signature::handle_signature_update),
        )
        .route(
            "/user-info/{user_email}",
            get(user_info::handle_user_info_page).post(user_info::handle_user_info_update),
        )
        .route("/api/user-info", post(user_info::handle_api_update))
        .route("/api/upload-image", post(upload::handle_upload_image))
        .route("/bulk-apply", post(bulk::handle_bulk_apply))
        .route(
            "/bulk-update-users",
            get(users::handle_bulk_update_page).post(users::handle_bulk_update),
        )
        .route("/static/uploads/{file}", get(static_files::handle_upload_file))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}

/// 署名中のローカル画像を絶対URLにする際のベースURL。
///
/// `EXTERNAL_URL` が設定されていればそれを使い、なければリクエストの
/// `X-Forwarded-Proto` と `Host` から組み立てる。
pub(crate) fn base_url(config: &AppConfig, headers: &HeaderMap) -> String {
    if let Some(url) = &config.external_url {
        return url.clone();
    }
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
    };
    let scheme = header("x-forwarded-proto").unwrap_or("http");
    let host = header("host").unwrap_or("localhost");
    format!("{scheme}://{host}")
}

/// 認証情報が使えない場合の通知
pub(crate) fn credential_notice(e: &GoogleError) -> String {
    format!("認証に失敗しました。サービスアカウントの設定を確認してください: {e}")
}

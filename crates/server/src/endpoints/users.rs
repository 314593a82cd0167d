//! # ユーザー一覧・プロフィール一括更新
//!
//! `GET /` と `GET /bulk-update-users` は同じユーザー一覧を返す。
//! `POST /bulk-update-users` は選択されたユーザーに同じプロフィール値を書き込む。

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use sigman_types::{BulkResult, BulkUpdateRequest, UserListPage};

use crate::config::AppState;

use super::credential_notice;

/// GET / ハンドラ
pub async fn handle_index(State(state): State<Arc<AppState>>) -> Json<UserListPage> {
    Json(user_list_page(&state).await)
}

/// GET /bulk-update-users ハンドラ
pub async fn handle_bulk_update_page(State(state): State<Arc<AppState>>) -> Json<UserListPage> {
    Json(user_list_page(&state).await)
}

/// POST /bulk-update-users ハンドラ
///
/// 対象を1件ずつ順番に更新し、成功/失敗に分けて返す。
pub async fn handle_bulk_update(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BulkUpdateRequest>,
) -> Json<BulkResult> {
    let mut result = BulkResult::default();

    for email in &request.users {
        let message = state.workspace.update_user_info(email, &request.data).await;
        if message.success {
            result.record_success(email);
        } else {
            result.record_failure(email, message.message);
        }
    }

    tracing::info!(
        success = result.success.len(),
        failed = result.failed.len(),
        "プロフィール一括更新が完了しました"
    );
    Json(result)
}

async fn user_list_page(state: &AppState) -> UserListPage {
    let mut page = UserListPage::default();

    if let Err(e) = state.workspace.check_credentials().await {
        tracing::warn!(error = %e, "認証情報が使えません");
        page.notices.push(credential_notice(&e));
        return page;
    }

    match state.workspace.list_users(&state.config.domain).await {
        Ok(users) => page.users = users,
        Err(e) => {
            tracing::error!(domain = %state.config.domain, error = %e, "ユーザー一覧の取得に失敗");
            page.notices.push(format!("ユーザー一覧の取得に失敗しました: {e}"));
        }
    }
    page
}

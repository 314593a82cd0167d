//! # ユーザー情報編集
//!
//! 氏名・電話番号・役職・部署をDirectory APIに部分更新する。
//! 画面フォームは空欄を未指定として扱い、JSON APIは受け取った値をそのまま使う。

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Form, Json};
use sigman_types::{ActionResult, ApiMessage, ProfileFields, UserInfoPage, UserInfoRequest};

use crate::config::AppState;

use super::credential_notice;

/// GET /user-info/{user_email} ハンドラ
pub async fn handle_user_info_page(
    State(state): State<Arc<AppState>>,
    Path(user_email): Path<String>,
) -> Json<UserInfoPage> {
    let mut page = UserInfoPage {
        user_email: user_email.clone(),
        ..Default::default()
    };

    if let Err(e) = state.workspace.check_credentials().await {
        tracing::warn!(user = %user_email, error = %e, "認証情報が使えません");
        page.notices.push(credential_notice(&e));
        return Json(page);
    }

    match state.workspace.get_user(&user_email).await {
        Ok(user) => {
            page.first_name = user.given_name().to_string();
            page.last_name = user.family_name().to_string();
            page.job_title = user.job_title().to_string();
            page.department = user.department().to_string();
            page.phone_number = user.phone().to_string();
            page.user_info = user;
        }
        Err(e) => {
            tracing::error!(user = %user_email, error = %e, "ユーザー情報の取得に失敗");
            page.notices.push(format!("ユーザー情報の取得に失敗しました: {e}"));
        }
    }

    Json(page)
}

/// POST /user-info/{user_email} ハンドラ
pub async fn handle_user_info_update(
    State(state): State<Arc<AppState>>,
    Path(user_email): Path<String>,
    Form(fields): Form<ProfileFields>,
) -> Json<ActionResult> {
    let message = state
        .workspace
        .update_user_info(&user_email, &fields.without_blanks())
        .await;

    let notice = if message.success {
        message.message
    } else {
        format!("エラー: {}", message.message)
    };
    Json(ActionResult {
        success: message.success,
        notices: vec![notice],
        selected_email: None,
    })
}

/// POST /api/user-info ハンドラ
///
/// `email` がない、または空の場合は400を返す。
pub async fn handle_api_update(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UserInfoRequest>,
) -> (StatusCode, Json<ApiMessage>) {
    let Some(email) = request.email.filter(|e| !e.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiMessage::failed("メールアドレスが指定されていません")),
        );
    };

    let message = state.workspace.update_user_info(&email, &request.data).await;
    (StatusCode::OK, Json(message))
}

//! # 署名編集
//!
//! ## GET /signature/{user_email}
//! 送信元アドレス一覧・選択中アドレスの現在の署名・テンプレートを返す。
//! 表示する署名は画像をローカルに保存した状態に正規化する。
//!
//! ## POST /signature/{user_email}
//! 1. 編集前の署名から既存画像の参照を引き継ぐ
//! 2. 画像を含む場合はローカルに保存する
//! 3. 対象アドレスがユーザーの送信元アドレスか検証する
//! 4. 3方式を順に試して署名を更新する

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::{Form, Json};
use serde::Deserialize;
use sigman_core::html::has_image;
use sigman_core::templates::{self, Branding};
use sigman_core::{preserve_existing, UpdateOutcome};
use sigman_types::{ActionResult, SendAs, SignaturePage};

use crate::config::AppState;

use super::{base_url, credential_notice};

#[derive(Debug, Default, Deserialize)]
pub struct SignatureQuery {
    pub selected_email: Option<String>,
}

impl SignatureQuery {
    /// 選択中のアドレス。未指定ならパスのユーザー。
    fn selected_or(&self, user_email: &str) -> String {
        self.selected_email
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(user_email)
            .to_string()
    }
}

/// 署名更新フォーム
#[derive(Debug, Default, Deserialize)]
pub struct SignatureForm {
    #[serde(default)]
    pub signature: String,
    pub target_email: Option<String>,
}

fn find<'a>(send_as_list: &'a [SendAs], address: &str) -> Option<&'a SendAs> {
    send_as_list.iter().find(|s| s.send_as_email == address)
}

/// GET /signature/{user_email} ハンドラ
pub async fn handle_signature_page(
    State(state): State<Arc<AppState>>,
    Path(user_email): Path<String>,
    Query(query): Query<SignatureQuery>,
) -> Json<SignaturePage> {
    let mut page = SignaturePage {
        user_email: user_email.clone(),
        ..Default::default()
    };

    if let Err(e) = state.workspace.check_credentials().await {
        tracing::warn!(user = %user_email, error = %e, "認証情報が使えません");
        page.notices.push(credential_notice(&e));
        return Json(page);
    }

    match state.workspace.get_user(&user_email).await {
        Ok(user) => page.user_info = user,
        Err(e) => {
            tracing::error!(user = %user_email, error = %e, "ユーザー情報の取得に失敗");
            page.notices.push(format!("ユーザー情報の取得に失敗しました: {e}"));
        }
    }

    page.send_as_list = state.workspace.list_send_as(&user_email).await;
    page.selected_email = query.selected_or(&user_email);
    page.primary_email = page.user_info.primary_email.clone();

    if let Some(entry) = find(&page.send_as_list, &page.selected_email) {
        page.is_valid_send_as = true;
        page.current_signature = entry.signature.clone();
    }
    if has_image(&page.current_signature) {
        page.current_signature = state.images.extract_and_store(&page.current_signature).await;
    }

    if state.config.enable_groups {
        page.user_groups = state
            .workspace
            .list_groups(&user_email)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(user = %user_email, error = %e, "グループ一覧の取得に失敗");
                Vec::new()
            });
    }

    page.signature_templates = templates::builtin(
        &page.user_info,
        &page.selected_email,
        Branding {
            domain: &state.config.domain,
            logo_url: state.config.logo_url.as_deref(),
        },
    );

    Json(page)
}

/// POST /signature/{user_email} ハンドラ
pub async fn handle_signature_update(
    State(state): State<Arc<AppState>>,
    Path(user_email): Path<String>,
    Query(query): Query<SignatureQuery>,
    headers: HeaderMap,
    Form(form): Form<SignatureForm>,
) -> Json<ActionResult> {
    let selected = query.selected_or(&user_email);

    if let Err(e) = state.workspace.check_credentials().await {
        tracing::warn!(user = %user_email, error = %e, "認証情報が使えません");
        return Json(ActionResult {
            success: false,
            notices: vec![credential_notice(&e)],
            selected_email: Some(selected),
        });
    }

    let send_as_list = state.workspace.list_send_as(&user_email).await;
    let current = find(&send_as_list, &selected)
        .map(|s| s.signature.as_str())
        .unwrap_or_default();

    let target = form
        .target_email
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| selected.clone());

    let mut html = preserve_existing(current, &form.signature);
    if has_image(&html) {
        html = state.images.extract_and_store(&html).await;
    }

    if find(&send_as_list, &target).is_none() {
        tracing::warn!(user = %user_email, send_as = %target, "送信元アドレスではありません");
        return Json(ActionResult {
            success: false,
            notices: vec![format!("{target} はこのユーザーの送信元アドレスではありません")],
            selected_email: Some(selected),
        });
    }

    let base_url = base_url(&state.config, &headers);
    let outcome = state
        .workspace
        .apply_signature(&user_email, &target, &html, &base_url)
        .await;

    let notices = outcome.notices();
    Json(match outcome {
        UpdateOutcome::Applied { .. } => ActionResult {
            success: true,
            notices,
            selected_email: Some(target),
        },
        UpdateOutcome::Failed { .. } => ActionResult {
            success: false,
            notices,
            selected_email: Some(selected),
        },
    })
}

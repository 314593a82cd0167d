//! # 署名の一括適用
//!
//! POST /bulk-apply
//!
//! 各ユーザーの主アドレスの署名を、同じテンプレートで更新する。

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use sigman_types::{BulkApplyRequest, BulkResult};

use crate::config::AppState;
use crate::workspace::BulkContext;

use super::base_url;

/// POST /bulk-apply ハンドラ
pub async fn handle_bulk_apply(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<BulkApplyRequest>,
) -> Json<BulkResult> {
    let base_url = base_url(&state.config, &headers);
    let backend = BulkContext {
        workspace: &state.workspace,
        base_url: &base_url,
    };

    Json(sigman_core::bulk_apply(&backend, &state.images, &request).await)
}

//! # 署名の一括適用
//!
//! 1つのテンプレート署名を複数ユーザーに適用する。
//! 対象は1件ずつ順番に処理し、あるユーザーの失敗で残りの処理を止めない。
//!
//! ## ユーザーごとの処理
//! 1. （置換有効時）ディレクトリ情報を取得し、プレースホルダーを置換する
//! 2. 画像を含む場合は画像を抽出・保存する
//! 3. 本人のメールボックスの、本人のアドレスの署名を更新する

use sigman_types::{BulkApplyRequest, BulkResult, DirectoryUser};

use crate::html::{has_image, ImageStore};
use crate::placeholders;
use crate::update::UpdateOutcome;

/// 一括適用が必要とするプロバイダー操作。
#[async_trait::async_trait]
pub trait BulkBackend: Send + Sync {
    /// ユーザーのディレクトリ情報を取得する。
    async fn fetch_profile(&self, email: &str) -> Result<DirectoryUser, String>;

    /// `email` のメールボックスの `email` アドレスの署名を更新する。
    async fn apply_signature(&self, email: &str, html: &str) -> UpdateOutcome;
}

/// テンプレート署名を各ユーザーに適用し、成功/失敗に分割した結果を返す。
pub async fn bulk_apply(
    backend: &dyn BulkBackend,
    images: &ImageStore,
    request: &BulkApplyRequest,
) -> BulkResult {
    let mut result = BulkResult::default();

    for email in &request.users {
        match apply_one(backend, images, request, email).await {
            Ok(()) => result.record_success(email),
            Err(error) => {
                tracing::error!(user = %email, error = %error, "一括適用に失敗");
                result.record_failure(email, error);
            }
        }
    }

    tracing::info!(
        succeeded = result.success.len(),
        failed = result.failed.len(),
        "一括適用が完了しました"
    );
    result
}

async fn apply_one(
    backend: &dyn BulkBackend,
    images: &ImageStore,
    request: &BulkApplyRequest,
    email: &str,
) -> Result<(), String> {
    let mut signature = if request.replace_variables {
        let profile = backend.fetch_profile(email).await?;
        placeholders::substitute(&request.signature, email, &profile)
    } else {
        request.signature.clone()
    };

    if has_image(&signature) {
        signature = images.extract_and_store(&signature).await;
    }

    match backend.apply_signature(email, &signature).await {
        UpdateOutcome::Applied { .. } => Ok(()),
        UpdateOutcome::Failed { errors } => Err(errors.join("; ")),
    }
}

//! # 署名更新のフォールバック制御
//!
//! ドメイン全体の委任では、どのIDとして振る舞えば更新できるかがアカウントごとに
//! 異なる（停止中アカウント、外部委任されたドメイン等）。
//! 認可方式をストラテジーとして順に試し、最初に成功した方式で確定する。
//!
//! ## 保証
//! - ストラテジーは指定順に1つずつ実行する
//! - 成功したストラテジー以降は実行しない（1回の呼び出しで更新は高々1回）
//! - 失敗は記録して次に進む。全て失敗した場合は試行順のエラー一覧を返す

use crate::html::make_absolute;

/// 署名を更新する1つの認可方式。
#[async_trait::async_trait]
pub trait UpdateStrategy: Send + Sync {
    /// 方式の説明（成功メッセージ・エラーメッセージに使う）
    fn description(&self) -> &str;

    /// `acting_identity` のメールボックスにある送信元アドレス `target_address` の
    /// 署名を `html` で更新する。
    async fn patch(
        &self,
        acting_identity: &str,
        target_address: &str,
        html: &str,
    ) -> Result<(), String>;
}

/// 署名更新の入力。
#[derive(Debug, Clone, Copy)]
pub struct SignatureUpdate<'a> {
    /// メールボックスの所有者
    pub acting_identity: &'a str,
    /// 署名を更新する送信元アドレス
    pub target_address: &'a str,
    /// 正規化済みの署名HTML（ローカルパスを含みうる）
    pub html: &'a str,
    /// ローカルパスを絶対URLにするためのベースURL
    pub base_url: &'a str,
}

/// 署名更新の結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// いずれかの方式で更新できた
    Applied {
        /// 成功した方式の説明
        method: String,
        /// 画面に表示するメッセージ
        message: String,
    },
    /// 全ての方式が失敗した。試行順に1方式1件。
    Failed { errors: Vec<String> },
}

impl UpdateOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, UpdateOutcome::Applied { .. })
    }

    /// 画面に表示する通知の一覧。
    pub fn notices(&self) -> Vec<String> {
        match self {
            UpdateOutcome::Applied { message, .. } => vec![message.clone()],
            UpdateOutcome::Failed { errors } => errors.clone(),
        }
    }
}

/// 署名HTMLを絶対URL化し、ストラテジーを順に試す。
pub async fn apply(
    strategies: &[Box<dyn UpdateStrategy>],
    update: SignatureUpdate<'_>,
) -> UpdateOutcome {
    let html_for_provider = make_absolute(update.html, update.base_url);

    let mut errors = Vec::with_capacity(strategies.len());
    for strategy in strategies {
        match strategy
            .patch(update.acting_identity, update.target_address, &html_for_provider)
            .await
        {
            Ok(()) => {
                tracing::info!(
                    user = %update.acting_identity,
                    send_as = %update.target_address,
                    method = strategy.description(),
                    "署名を更新しました"
                );
                return UpdateOutcome::Applied {
                    method: strategy.description().to_string(),
                    message: format!(
                        "{} の署名を更新しました（{}）",
                        update.target_address,
                        strategy.description()
                    ),
                };
            }
            Err(e) => {
                let message = format!("{}で失敗: {e}", strategy.description());
                tracing::warn!(
                    user = %update.acting_identity,
                    send_as = %update.target_address,
                    "{message}"
                );
                errors.push(message);
            }
        }
    }

    UpdateOutcome::Failed { errors }
}

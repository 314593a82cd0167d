//! # Google Workspace 操作
//!
//! 認証情報・Directory API・Gmail API をまとめ、ハンドラが使う単位の操作を提供する。
//! ディレクトリ操作は管理者として、send-asの参照はユーザー本人として行う。

use std::sync::Arc;

use sigman_core::profile::build_update;
use sigman_core::{apply, BulkBackend, SignatureUpdate, UpdateOutcome, UpdateStrategy};
use sigman_google::gmail::ME;
use sigman_google::{AccessToken, CredentialSource, DirectoryApi, GoogleError, MailApi};
use sigman_types::{ApiMessage, DirectoryUser, Group, ProfileFields, SendAs};

use crate::strategies;

pub struct Workspace {
    credentials: Arc<dyn CredentialSource>,
    directory: Arc<dyn DirectoryApi>,
    mail: Arc<dyn MailApi>,
    strategies: Vec<Box<dyn UpdateStrategy>>,
}

impl Workspace {
    pub fn new(
        credentials: Arc<dyn CredentialSource>,
        directory: Arc<dyn DirectoryApi>,
        mail: Arc<dyn MailApi>,
    ) -> Self {
        let strategies = strategies::default_chain(credentials.clone(), mail.clone());
        Self {
            credentials,
            directory,
            mail,
            strategies,
        }
    }

    /// 鍵ファイルが使えるかを確認する。
    pub async fn check_credentials(&self) -> Result<(), GoogleError> {
        self.credentials.check().await
    }

    async fn admin_token(&self) -> Result<AccessToken, GoogleError> {
        self.credentials.delegated(self.credentials.admin_email()).await
    }

    // -----------------------------------------------------------------------
    // Directory
    // -----------------------------------------------------------------------

    pub async fn list_users(&self, domain: &str) -> Result<Vec<DirectoryUser>, GoogleError> {
        let token = self.admin_token().await?;
        self.directory.list_users(&token, domain).await
    }

    pub async fn get_user(&self, email: &str) -> Result<DirectoryUser, GoogleError> {
        let token = self.admin_token().await?;
        self.directory.get_user(&token, email).await
    }

    pub async fn list_groups(&self, email: &str) -> Result<Vec<Group>, GoogleError> {
        let token = self.admin_token().await?;
        self.directory.list_groups(&token, email).await
    }

    /// プロフィールを部分更新する。
    ///
    /// 現在のレコードを取得してフィールドをマージし、変更がある場合のみ `PUT` する。
    pub async fn update_user_info(&self, email: &str, fields: &ProfileFields) -> ApiMessage {
        match self.try_update_user_info(email, fields).await {
            Ok(true) => {
                tracing::info!(user = %email, "ユーザー情報を更新しました");
                ApiMessage::ok("ユーザー情報を更新しました")
            }
            Ok(false) => ApiMessage::failed("更新する情報がありません"),
            Err(e) => {
                tracing::error!(user = %email, error = %e, "ユーザー情報の更新に失敗");
                ApiMessage::failed(format!("更新に失敗しました: {e}"))
            }
        }
    }

    async fn try_update_user_info(
        &self,
        email: &str,
        fields: &ProfileFields,
    ) -> Result<bool, GoogleError> {
        let token = self.admin_token().await?;
        let current = self.directory.get_user(&token, email).await?;
        let update = build_update(&current, fields);
        if update.is_empty() {
            return Ok(false);
        }
        self.directory.update_user(&token, email, &update).await?;
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Gmail
    // -----------------------------------------------------------------------

    /// ユーザー本人として送信元アドレス一覧を取得する。失敗時は空。
    pub async fn list_send_as(&self, email: &str) -> Vec<SendAs> {
        let token = match self.credentials.delegated(email).await {
            Ok(token) => token,
            Err(e) => {
                tracing::error!(user = %email, error = %e, "送信元アドレスの取得に失敗");
                return Vec::new();
            }
        };
        self.mail.list_send_as(&token, ME).await.unwrap_or_else(|e| {
            tracing::error!(user = %email, error = %e, "送信元アドレスの取得に失敗");
            Vec::new()
        })
    }

    /// ユーザー本人として送信元アドレスの署名を取得する。失敗時は空文字列。
    pub async fn get_signature(&self, email: &str, send_as_email: &str) -> String {
        let result = match self.credentials.delegated(email).await {
            Ok(token) => self.mail.get_send_as(&token, ME, send_as_email).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(send_as) => send_as.signature,
            Err(e) => {
                tracing::error!(
                    user = %email,
                    send_as = %send_as_email,
                    error = %e,
                    "署名の取得に失敗"
                );
                String::new()
            }
        }
    }

    /// 署名を更新する（3方式を順に試す）。
    pub async fn apply_signature(
        &self,
        acting_identity: &str,
        target_address: &str,
        html: &str,
        base_url: &str,
    ) -> UpdateOutcome {
        apply(
            &self.strategies,
            SignatureUpdate {
                acting_identity,
                target_address,
                html,
                base_url,
            },
        )
        .await
    }
}

/// 一括適用で使う、リクエスト単位の `BulkBackend`。
pub struct BulkContext<'a> {
    pub workspace: &'a Workspace,
    pub base_url: &'a str,
}

#[async_trait::async_trait]
impl<'a> BulkBackend for BulkContext<'a> {
    async fn fetch_profile(&self, email: &str) -> Result<DirectoryUser, String> {
        self.workspace.get_user(email).await.map_err(|e| e.to_string())
    }

    async fn apply_signature(&self, email: &str, html: &str) -> UpdateOutcome {
        self.workspace
            .apply_signature(email, email, html, self.base_url)
            .await
    }
}

//! # 署名更新ストラテジー
//!
//! どのIDとして振る舞うかだけが異なる3つの更新方式。
//! `sigman_core::apply` はこの順に試す。
//!
//! | 順 | 委任先 | userId |
//! |----|--------|--------|
//! | 1 | 対象ユーザー本人 | `me` |
//! | 2 | 管理者 | 対象ユーザー |
//! | 3 | 鍵ファイルから新たに作った基本認証情報 | 対象ユーザー |

use std::sync::Arc;

use sigman_core::UpdateStrategy;
use sigman_google::gmail::ME;
use sigman_google::{CredentialSource, MailApi};

/// 署名更新時に振る舞うID。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActingAs {
    User,
    Admin,
    BaseCredentials,
}

impl ActingAs {
    fn description(self) -> &'static str {
        match self {
            ActingAs::User => "ユーザー本人の権限",
            ActingAs::Admin => "管理者の権限",
            ActingAs::BaseCredentials => "基本認証情報",
        }
    }
}

/// send-as署名をGmail APIで更新するストラテジー。
pub struct MailboxStrategy {
    acting_as: ActingAs,
    credentials: Arc<dyn CredentialSource>,
    mail: Arc<dyn MailApi>,
}

impl MailboxStrategy {
    pub fn new(
        acting_as: ActingAs,
        credentials: Arc<dyn CredentialSource>,
        mail: Arc<dyn MailApi>,
    ) -> Self {
        Self {
            acting_as,
            credentials,
            mail,
        }
    }
}

#[async_trait::async_trait]
impl UpdateStrategy for MailboxStrategy {
    fn description(&self) -> &str {
        self.acting_as.description()
    }

    async fn patch(
        &self,
        acting_identity: &str,
        target_address: &str,
        html: &str,
    ) -> Result<(), String> {
        let (token, user_id) = match self.acting_as {
            ActingAs::User => (self.credentials.delegated(acting_identity).await, ME),
            ActingAs::Admin => (
                self.credentials.delegated(self.credentials.admin_email()).await,
                acting_identity,
            ),
            ActingAs::BaseCredentials => (self.credentials.base().await, acting_identity),
        };
        let token = token.map_err(|e| e.to_string())?;

        self.mail
            .patch_signature(&token, user_id, target_address, html)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// 既定の試行順で3つのストラテジーを構築する。
pub fn default_chain(
    credentials: Arc<dyn CredentialSource>,
    mail: Arc<dyn MailApi>,
) -> Vec<Box<dyn UpdateStrategy>> {
    [ActingAs::User, ActingAs::Admin, ActingAs::BaseCredentials]
        .into_iter()
        .map(|acting_as| {
            Box::new(MailboxStrategy::new(acting_as, credentials.clone(), mail.clone()))
                as Box<dyn UpdateStrategy>
        })
        .collect()
}

//! # Gmail API クライアント
//!
//! 送信元アドレス（send-as）の一覧・取得と署名の更新。
//! `user_id` には `"me"`（トークンの委任先ユーザー自身）か、メールアドレスを指定する。

use sigman_types::{SendAs, SendAsList, SignaturePatch};

use crate::credentials::AccessToken;
use crate::error::GoogleError;
use crate::{endpoint, send_json};

/// 本番のベースURL
pub const GMAIL_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

/// トークンの委任先ユーザー自身を表す `userId`
pub const ME: &str = "me";

/// Gmail API（send-as設定）の操作。
#[async_trait::async_trait]
pub trait MailApi: Send + Sync {
    /// `GET users/{userId}/settings/sendAs`
    async fn list_send_as(
        &self,
        token: &AccessToken,
        user_id: &str,
    ) -> Result<Vec<SendAs>, GoogleError>;

    /// `GET users/{userId}/settings/sendAs/{sendAsEmail}`
    async fn get_send_as(
        &self,
        token: &AccessToken,
        user_id: &str,
        send_as_email: &str,
    ) -> Result<SendAs, GoogleError>;

    /// `PATCH users/{userId}/settings/sendAs/{sendAsEmail}` で署名を更新する。
    async fn patch_signature(
        &self,
        token: &AccessToken,
        user_id: &str,
        send_as_email: &str,
        html: &str,
    ) -> Result<SendAs, GoogleError>;
}

/// REST実装。
pub struct GmailClient {
    base_url: String,
    http: reqwest::Client,
}

impl GmailClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(GMAIL_BASE_URL, http)
    }

    pub fn with_base_url(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }
}

#[async_trait::async_trait]
impl MailApi for GmailClient {
    async fn list_send_as(
        &self,
        token: &AccessToken,
        user_id: &str,
    ) -> Result<Vec<SendAs>, GoogleError> {
        let url = endpoint(&self.base_url, &["users", user_id, "settings", "sendAs"])?;
        let list: SendAsList = send_json(self.http.get(url).bearer_auth(token.as_str())).await?;
        Ok(list.send_as)
    }

    async fn get_send_as(
        &self,
        token: &AccessToken,
        user_id: &str,
        send_as_email: &str,
    ) -> Result<SendAs, GoogleError> {
        let url = endpoint(
            &self.base_url,
            &["users", user_id, "settings", "sendAs", send_as_email],
        )?;
        send_json(self.http.get(url).bearer_auth(token.as_str())).await
    }

    async fn patch_signature(
        &self,
        token: &AccessToken,
        user_id: &str,
        send_as_email: &str,
        html: &str,
    ) -> Result<SendAs, GoogleError> {
        let url = endpoint(
            &self.base_url,
            &["users", user_id, "settings", "sendAs", send_as_email],
        )?;
        let body = SignaturePatch {
            signature: html.to_string(),
        };
        send_json(self.http.patch(url).bearer_auth(token.as_str()).json(&body)).await
    }
}

//! # Directory API クライアント
//!
//! `admin/directory/v1` のユーザー取得・部分更新・一覧、グループ一覧。

use sigman_types::{DirectoryUser, Group, GroupList, UserList, UserUpdate};

use crate::credentials::AccessToken;
use crate::error::GoogleError;
use crate::{endpoint, send_json};

/// 本番のベースURL
pub const DIRECTORY_BASE_URL: &str = "https://admin.googleapis.com/admin/directory/v1";

/// ドメイン一覧取得の上限件数
pub const MAX_RESULTS: u32 = 100;

/// Directory APIの操作。
#[async_trait::async_trait]
pub trait DirectoryApi: Send + Sync {
    /// `GET users/{userKey}`
    async fn get_user(
        &self,
        token: &AccessToken,
        user_key: &str,
    ) -> Result<DirectoryUser, GoogleError>;

    /// `PUT users/{userKey}`。ボディのフィールドのみがマージされる。
    async fn update_user(
        &self,
        token: &AccessToken,
        user_key: &str,
        update: &UserUpdate,
    ) -> Result<DirectoryUser, GoogleError>;

    /// `GET users?domain=&maxResults=100`
    async fn list_users(
        &self,
        token: &AccessToken,
        domain: &str,
    ) -> Result<Vec<DirectoryUser>, GoogleError>;

    /// `GET groups?userKey=`
    async fn list_groups(
        &self,
        token: &AccessToken,
        user_key: &str,
    ) -> Result<Vec<Group>, GoogleError>;
}

/// REST実装。
pub struct DirectoryClient {
    base_url: String,
    http: reqwest::Client,
}

impl DirectoryClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(DIRECTORY_BASE_URL, http)
    }

    pub fn with_base_url(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }
}

#[async_trait::async_trait]
impl DirectoryApi for DirectoryClient {
    async fn get_user(
        &self,
        token: &AccessToken,
        user_key: &str,
    ) -> Result<DirectoryUser, GoogleError> {
        let url = endpoint(&self.base_url, &["users", user_key])?;
        send_json(self.http.get(url).bearer_auth(token.as_str())).await
    }

    async fn update_user(
        &self,
        token: &AccessToken,
        user_key: &str,
        update: &UserUpdate,
    ) -> Result<DirectoryUser, GoogleError> {
        let url = endpoint(&self.base_url, &["users", user_key])?;
        send_json(self.http.put(url).bearer_auth(token.as_str()).json(update)).await
    }

    async fn list_users(
        &self,
        token: &AccessToken,
        domain: &str,
    ) -> Result<Vec<DirectoryUser>, GoogleError> {
        let mut url = endpoint(&self.base_url, &["users"])?;
        url.query_pairs_mut()
            .append_pair("domain", domain)
            .append_pair("maxResults", &MAX_RESULTS.to_string());
        let list: UserList = send_json(self.http.get(url).bearer_auth(token.as_str())).await?;
        Ok(list.users)
    }

    async fn list_groups(
        &self,
        token: &AccessToken,
        user_key: &str,
    ) -> Result<Vec<Group>, GoogleError> {
        let mut url = endpoint(&self.base_url, &["groups"])?;
        url.query_pairs_mut().append_pair("userKey", user_key);
        let list: GroupList = send_json(self.http.get(url).bearer_auth(token.as_str())).await?;
        Ok(list.groups)
    }
}

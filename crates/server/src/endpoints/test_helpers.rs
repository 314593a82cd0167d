//! # エンドポイントテスト用共通ヘルパー
//!
//! 認証情報・Directory API・Gmail APIのモックと、テスト用の共有状態。
//! モックのトークンは `token-for-{subject}` 形式で、委任先をテストから確認できる。

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use sigman_core::ImageStore;
use sigman_google::{AccessToken, CredentialSource, DirectoryApi, GoogleError, MailApi};
use sigman_types::{DirectoryUser, Group, SendAs, UserUpdate};

use crate::config::{AppConfig, AppState};
use crate::workspace::Workspace;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const EXTERNAL_URL: &str = "https://sig.example.com";

/// テスト用ユーザー
pub fn alice() -> DirectoryUser {
    serde_json::from_value(serde_json::json!({
        "id": "1001",
        "primaryEmail": "alice@example.com",
        "name": {
            "givenName": "Alice",
            "familyName": "Martin",
            "fullName": "Alice Martin"
        },
        "phones": [{"value": "0102030405", "type": "work"}],
        "organizations": [{"title": "Agent", "department": "Ventes", "primary": true}]
    }))
    .unwrap()
}

pub fn send_as(email: &str, signature: &str, primary: bool) -> SendAs {
    SendAs {
        send_as_email: email.to_string(),
        signature: signature.to_string(),
        is_primary: primary.then_some(true),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// 認証情報
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockCredentials {
    denied: HashSet<String>,
    broken: bool,
}

impl MockCredentials {
    /// 指定ユーザーへの委任を拒否する
    pub fn deny_subject(mut self, subject: &str) -> Self {
        self.denied.insert(subject.to_string());
        self
    }

    /// 鍵ファイルが存在しない状態
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Default::default()
        }
    }
}

#[async_trait::async_trait]
impl CredentialSource for MockCredentials {
    fn admin_email(&self) -> &str {
        ADMIN_EMAIL
    }

    async fn check(&self) -> Result<(), GoogleError> {
        if self.broken {
            return Err(GoogleError::Credential("鍵ファイルがありません".into()));
        }
        Ok(())
    }

    async fn delegated(&self, subject: &str) -> Result<AccessToken, GoogleError> {
        self.check().await?;
        if self.denied.contains(subject) {
            return Err(GoogleError::Credential(format!(
                "トークン交換に失敗: HTTP 401 - unauthorized_client ({subject})"
            )));
        }
        Ok(AccessToken::new(format!("token-for-{subject}")))
    }

    async fn base(&self) -> Result<AccessToken, GoogleError> {
        self.check().await?;
        Ok(AccessToken::new("base-token"))
    }
}

// ---------------------------------------------------------------------------
// Directory API
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockDirectory {
    users: Vec<DirectoryUser>,
    groups: HashMap<String, Vec<Group>>,
    fail_groups: bool,
    updates: Mutex<Vec<(String, UserUpdate)>>,
}

impl MockDirectory {
    pub fn with_users(users: Vec<DirectoryUser>) -> Self {
        Self {
            users,
            ..Default::default()
        }
    }

    pub fn with_group(mut self, user: &str, email: &str, name: &str) -> Self {
        self.groups.entry(user.to_string()).or_default().push(Group {
            email: email.to_string(),
            name: name.to_string(),
            ..Default::default()
        });
        self
    }

    /// グループ一覧の取得を403で失敗させる
    pub fn failing_groups(mut self) -> Self {
        self.fail_groups = true;
        self
    }

    /// 受け取った更新要求
    pub fn updates(&self) -> Vec<(String, UserUpdate)> {
        self.updates.lock().unwrap().clone()
    }

    fn find(&self, user_key: &str) -> Result<DirectoryUser, GoogleError> {
        self.users
            .iter()
            .find(|u| u.primary_email == user_key)
            .cloned()
            .ok_or_else(|| GoogleError::Api {
                status: 404,
                body: "Resource Not Found: userKey".into(),
            })
    }
}

#[async_trait::async_trait]
impl DirectoryApi for MockDirectory {
    async fn get_user(
        &self,
        _token: &AccessToken,
        user_key: &str,
    ) -> Result<DirectoryUser, GoogleError> {
        self.find(user_key)
    }

    async fn update_user(
        &self,
        _token: &AccessToken,
        user_key: &str,
        update: &UserUpdate,
    ) -> Result<DirectoryUser, GoogleError> {
        let user = self.find(user_key)?;
        self.updates
            .lock()
            .unwrap()
            .push((user_key.to_string(), update.clone()));
        Ok(user)
    }

    async fn list_users(
        &self,
        _token: &AccessToken,
        domain: &str,
    ) -> Result<Vec<DirectoryUser>, GoogleError> {
        Ok(self
            .users
            .iter()
            .filter(|u| u.primary_email.ends_with(&format!("@{domain}")))
            .cloned()
            .collect())
    }

    async fn list_groups(
        &self,
        _token: &AccessToken,
        user_key: &str,
    ) -> Result<Vec<Group>, GoogleError> {
        if self.fail_groups {
            return Err(GoogleError::Api {
                status: 403,
                body: "Not Authorized to access this resource/api".into(),
            });
        }
        Ok(self.groups.get(user_key).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Gmail API
// ---------------------------------------------------------------------------

/// `patch_signature` の呼び出し記録
#[derive(Debug, Clone)]
pub struct PatchCall {
    pub token: String,
    pub user_id: String,
    pub send_as: String,
    pub html: String,
}

pub struct MockMail {
    mailboxes: HashMap<String, Vec<SendAs>>,
    reject_all: bool,
    patches: Mutex<Vec<PatchCall>>,
}

impl Default for MockMail {
    /// aliceが主アドレスと `contact@example.com` の2つを持つ状態
    fn default() -> Self {
        let mut mailboxes = HashMap::new();
        mailboxes.insert(
            "alice@example.com".to_string(),
            vec![
                send_as("alice@example.com", "<p>Alice</p>", true),
                send_as("contact@example.com", "", false),
            ],
        );
        Self {
            mailboxes,
            reject_all: false,
            patches: Mutex::new(Vec::new()),
        }
    }
}

impl MockMail {
    /// 全ての署名更新を403で拒否する
    pub fn reject_all(mut self) -> Self {
        self.reject_all = true;
        self
    }

    /// 指定アドレスの現在の署名を差し替える
    pub fn with_signature(mut self, user: &str, address: &str, html: &str) -> Self {
        let mailbox = self.mailboxes.entry(user.to_string()).or_default();
        match mailbox.iter_mut().find(|s| s.send_as_email == address) {
            Some(entry) => entry.signature = html.to_string(),
            None => mailbox.push(send_as(address, html, mailbox.is_empty())),
        }
        self
    }

    pub fn patches(&self) -> Vec<PatchCall> {
        self.patches.lock().unwrap().clone()
    }

    /// トークンとuserIdから対象メールボックスを決める
    fn mailbox(&self, token: &AccessToken, user_id: &str) -> Vec<SendAs> {
        let owner = if user_id == sigman_google::gmail::ME {
            token.as_str().trim_start_matches("token-for-")
        } else {
            user_id
        };
        self.mailboxes.get(owner).cloned().unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl MailApi for MockMail {
    async fn list_send_as(
        &self,
        token: &AccessToken,
        user_id: &str,
    ) -> Result<Vec<SendAs>, GoogleError> {
        Ok(self.mailbox(token, user_id))
    }

    async fn get_send_as(
        &self,
        token: &AccessToken,
        user_id: &str,
        send_as_email: &str,
    ) -> Result<SendAs, GoogleError> {
        self.mailbox(token, user_id)
            .into_iter()
            .find(|s| s.send_as_email == send_as_email)
            .ok_or_else(|| GoogleError::Api {
                status: 404,
                body: "Requested entity was not found.".into(),
            })
    }

    async fn patch_signature(
        &self,
        token: &AccessToken,
        user_id: &str,
        send_as_email: &str,
        html: &str,
    ) -> Result<SendAs, GoogleError> {
        self.patches.lock().unwrap().push(PatchCall {
            token: token.as_str().to_string(),
            user_id: user_id.to_string(),
            send_as: send_as_email.to_string(),
            html: html.to_string(),
        });
        if self.reject_all {
            return Err(GoogleError::Api {
                status: 403,
                body: "Delegation denied".into(),
            });
        }
        Ok(send_as(send_as_email, html, false))
    }
}

// ---------------------------------------------------------------------------
// 共有状態・サーバー
// ---------------------------------------------------------------------------

pub fn test_config(storage_root: &Path) -> AppConfig {
    AppConfig {
        service_account_file: storage_root.join("client_secret.json"),
        admin_email: ADMIN_EMAIL.to_string(),
        domain: "example.com".to_string(),
        external_url: Some(EXTERNAL_URL.to_string()),
        enable_groups: true,
        storage_root: storage_root.to_path_buf(),
        listen_addr: "127.0.0.1:0".to_string(),
        logo_url: None,
    }
}

/// モックで組み立てた共有状態。画像は `dir` に保存される。
pub fn test_state(
    dir: &tempfile::TempDir,
    credentials: MockCredentials,
    directory: Arc<MockDirectory>,
    mail: Arc<MockMail>,
) -> Arc<AppState> {
    let config = test_config(dir.path());
    Arc::new(AppState {
        workspace: Workspace::new(Arc::new(credentials), directory, mail),
        images: ImageStore::new(config.storage_root.clone(), reqwest::Client::new()),
        config,
    })
}

/// 既定のモック（aliceのみ）で組み立てた共有状態
pub fn default_state(dir: &tempfile::TempDir) -> Arc<AppState> {
    test_state(
        dir,
        MockCredentials::default(),
        Arc::new(MockDirectory::with_users(vec![alice()])),
        Arc::new(MockMail::default()),
    )
}

/// ルーター全体を起動し、ポート番号を返す。
pub async fn start_app(state: Arc<AppState>) -> u16 {
    let app = super::router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    port
}

//! # サービスアカウント認証
//!
//! サービスアカウント鍵でRS256のJWTアサーションを作り、
//! `urn:ietf:params:oauth:grant-type:jwt-bearer` グラントでアクセストークンと交換する。
//! `sub` クレームに指定したユーザーとして振る舞う（ドメイン全体の委任）。
//!
//! トークンはリクエストごとに取得し、キャッシュしない。
//! 鍵ファイルも取得のたびに読み直すため、起動後に配置・差し替えた鍵がそのまま使われる。

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::error::GoogleError;

/// 鍵ファイルに `token_uri` がない場合のトークンエンドポイント
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// アサーションの有効期間（秒）
const ASSERTION_LIFETIME_SECS: u64 = 3600;

/// サービスアカウント鍵ファイル（JSON）のうち使用するフィールド。
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    /// 鍵ファイルを読み込む。
    pub async fn load(path: &Path) -> Result<Self, GoogleError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            GoogleError::Credential(format!(
                "サービスアカウント鍵の読み込みに失敗 ({}): {e}",
                path.display()
            ))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            GoogleError::Credential(format!("サービスアカウント鍵のパースに失敗: {e}"))
        })
    }
}

/// JWTアサーションのクレーム。
#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    sub: &'a str,
    scope: String,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Bearerアクセストークン。
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// 委任されたアクセストークンの取得元。
#[async_trait::async_trait]
pub trait CredentialSource: Send + Sync {
    /// 管理者のメールアドレス
    fn admin_email(&self) -> &str;

    /// 鍵が読み込めて署名に使えるかを、通信せずに確認する。
    async fn check(&self) -> Result<(), GoogleError>;

    /// `subject` として振る舞うトークンを取得する。
    async fn delegated(&self, subject: &str) -> Result<AccessToken, GoogleError>;

    /// 鍵ファイルから新たに作った、管理者委任のみのトークンを取得する。
    async fn base(&self) -> Result<AccessToken, GoogleError>;
}

/// サービスアカウント鍵ファイルによる `CredentialSource` 実装。
pub struct ServiceAccountAuth {
    key_path: PathBuf,
    admin_email: String,
    scopes: Vec<String>,
    http: reqwest::Client,
}

impl ServiceAccountAuth {
    pub fn new(
        key_path: impl Into<PathBuf>,
        admin_email: impl Into<String>,
        scopes: Vec<String>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            key_path: key_path.into(),
            admin_email: admin_email.into(),
            scopes,
            http,
        }
    }

    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// 鍵から `subject` 委任のトークンを発行する。
    async fn mint(
        &self,
        key: &ServiceAccountKey,
        subject: &str,
    ) -> Result<AccessToken, GoogleError> {
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| GoogleError::Credential(format!("時刻取得失敗: {e}")))?
            .as_secs();

        let claims = Claims {
            iss: &key.client_email,
            sub: subject,
            scope: self.scopes.join(" "),
            aud: &key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        let assertion = jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &encoding_key(key)?,
        )
        .map_err(|e| GoogleError::Credential(format!("JWTの生成に失敗: {e}")))?;

        let request = self
            .http
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())]);

        let token: TokenResponse = crate::send_json(request).await.map_err(|e| match e {
            GoogleError::Api { status, body } => {
                GoogleError::Credential(format!("トークン交換に失敗: HTTP {status} - {body}"))
            }
            other => other,
        })?;

        tracing::debug!(subject, "アクセストークンを取得しました");
        Ok(AccessToken(token.access_token))
    }
}

fn encoding_key(key: &ServiceAccountKey) -> Result<EncodingKey, GoogleError> {
    EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| GoogleError::Credential(format!("秘密鍵が不正です: {e}")))
}

#[async_trait::async_trait]
impl CredentialSource for ServiceAccountAuth {
    fn admin_email(&self) -> &str {
        &self.admin_email
    }

    async fn check(&self) -> Result<(), GoogleError> {
        let key = ServiceAccountKey::load(&self.key_path).await?;
        encoding_key(&key).map(|_| ())
    }

    async fn delegated(&self, subject: &str) -> Result<AccessToken, GoogleError> {
        let key = ServiceAccountKey::load(&self.key_path).await?;
        self.mint(&key, subject).await
    }

    async fn base(&self) -> Result<AccessToken, GoogleError> {
        let key = ServiceAccountKey::load(&self.key_path).await?;
        self.mint(&key, &self.admin_email).await
    }
}

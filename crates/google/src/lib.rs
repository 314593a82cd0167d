//! # Sigman Google
//!
//! Google Workspaceとの境界。サービスアカウントのドメイン全体の委任で
//! アクセストークンを取得し、Directory API / Gmail API をREST経由で呼び出す。
//!
//! ## モジュール構成
//! - `credentials`: サービスアカウント鍵とJWTベアラーグラントによるトークン取得
//! - `directory`: ユーザー・グループの取得と更新
//! - `gmail`: 送信元アドレス（send-as）と署名の取得・更新
//!
//! 各クライアントはトレイトで抽象化されており、サーバー側のテストでは
//! モック実装に差し替える。

pub mod credentials;
pub mod directory;
pub mod error;
pub mod gmail;

pub use credentials::{AccessToken, CredentialSource, ServiceAccountAuth, ServiceAccountKey};
pub use directory::{DirectoryApi, DirectoryClient};
pub use error::GoogleError;
pub use gmail::{GmailClient, MailApi};

/// 常に要求するスコープ。
pub const BASE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/admin.directory.user",
    "https://www.googleapis.com/auth/gmail.settings.basic",
    "https://www.googleapis.com/auth/gmail.settings.sharing",
    "https://mail.google.com/",
];

/// グループ参照を有効にした場合に追加するスコープ。
pub const GROUP_SCOPE: &str = "https://www.googleapis.com/auth/admin.directory.group.readonly";

/// 要求するスコープ一覧を返す。
pub fn scopes(enable_groups: bool) -> Vec<String> {
    let mut scopes: Vec<String> = BASE_SCOPES.iter().map(|s| s.to_string()).collect();
    if enable_groups {
        scopes.push(GROUP_SCOPE.to_string());
    }
    scopes
}

// ---------------------------------------------------------------------------
// REST共通処理
// ---------------------------------------------------------------------------

/// ベースURLにパスセグメントを追加したURLを作る。セグメントはエスケープされる。
pub(crate) fn endpoint(base_url: &str, segments: &[&str]) -> Result<url::Url, GoogleError> {
    let mut url = url::Url::parse(base_url)
        .map_err(|e| GoogleError::Transport(format!("不正なベースURL ({base_url}): {e}")))?;
    url.path_segments_mut()
        .map_err(|_| GoogleError::Transport(format!("パスを持てないベースURL: {base_url}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// リクエストを送信し、2xxならJSONとしてパースする。
pub(crate) async fn send_json<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, GoogleError> {
    let response = request
        .send()
        .await
        .map_err(|e| GoogleError::Transport(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| GoogleError::Transport(format!("レスポンス読み取り失敗: {e}")))?;

    if !status.is_success() {
        return Err(GoogleError::Api {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| GoogleError::Parse(e.to_string()))
}

//! # サーバー設定・共有状態
//!
//! 起動時に環境変数から一度だけ設定を読み込み、以後は不変の値として
//! `Arc<AppState>` 経由で全ハンドラに渡す。

use std::path::PathBuf;

use anyhow::Context;
use sigman_core::ImageStore;

use crate::workspace::Workspace;

/// サービスアカウント鍵ファイルの既定パス
pub const DEFAULT_SERVICE_ACCOUNT_FILE: &str = "client_secret.json";
/// 画像保存先の既定ディレクトリ
pub const DEFAULT_STORAGE_ROOT: &str = "static/uploads";
/// 既定の待ち受けアドレス
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5000";

/// 環境変数から構築する不変の設定。
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `SERVICE_ACCOUNT_FILE`
    pub service_account_file: PathBuf,
    /// `ADMIN_EMAIL`（必須）。ディレクトリ操作の委任先。
    pub admin_email: String,
    /// `DOMAIN`（必須）
    pub domain: String,
    /// `EXTERNAL_URL`。署名中のローカル画像を絶対URLにする際のベース。
    /// 未設定ならリクエストのHostから組み立てる。
    pub external_url: Option<String>,
    /// `ENABLE_GROUPS`
    pub enable_groups: bool,
    /// `STORAGE_ROOT`
    pub storage_root: PathBuf,
    /// `LISTEN_ADDR`
    pub listen_addr: String,
    /// `SIGNATURE_LOGO_URL`。組み込みテンプレートのロゴ。
    pub logo_url: Option<String>,
}

impl AppConfig {
    /// プロセスの環境変数から構築する。
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の取得関数から構築する。空文字列は未設定として扱う。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let admin_email = get("ADMIN_EMAIL").context("ADMIN_EMAILが設定されていません")?;
        let domain = get("DOMAIN").context("DOMAINが設定されていません")?;

        Ok(Self {
            service_account_file: get("SERVICE_ACCOUNT_FILE")
                .unwrap_or_else(|| DEFAULT_SERVICE_ACCOUNT_FILE.to_string())
                .into(),
            admin_email,
            domain,
            external_url: get("EXTERNAL_URL").map(|url| url.trim_end_matches('/').to_string()),
            enable_groups: get("ENABLE_GROUPS")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1"))
                .unwrap_or(false),
            storage_root: get("STORAGE_ROOT")
                .unwrap_or_else(|| DEFAULT_STORAGE_ROOT.to_string())
                .into(),
            listen_addr: get("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
            logo_url: get("SIGNATURE_LOGO_URL"),
        })
    }

    /// 要求するスコープ一覧。
    pub fn scopes(&self) -> Vec<String> {
        sigman_google::scopes(self.enable_groups)
    }
}

/// サーバーの共有状態。
pub struct AppState {
    pub config: AppConfig,
    /// Google Workspaceへの操作
    pub workspace: Workspace,
    /// 署名画像のローカルストレージ
    pub images: ImageStore,
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("ADMIN_EMAIL", "admin@example.com"),
            ("DOMAIN", "example.com"),
        ]))
        .unwrap();

        assert_eq!(config.service_account_file, PathBuf::from("client_secret.json"));
        assert_eq!(config.storage_root, PathBuf::from("static/uploads"));
        assert_eq!(config.listen_addr, "0.0.0.0:5000");
        assert_eq!(config.external_url, None);
        assert!(!config.enable_groups);
        assert_eq!(config.scopes().len(), 4);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("ADMIN_EMAIL", "admin@example.com"),
            ("DOMAIN", "example.com"),
            ("EXTERNAL_URL", "https://sig.example.com/"),
            ("ENABLE_GROUPS", "True"),
            ("STORAGE_ROOT", "/var/lib/sigman"),
            ("SIGNATURE_LOGO_URL", "https://cdn.example.com/logo.png"),
        ]))
        .unwrap();

        assert_eq!(config.external_url.as_deref(), Some("https://sig.example.com"));
        assert!(config.enable_groups);
        assert_eq!(config.scopes().len(), 5);
        assert_eq!(config.storage_root, PathBuf::from("/var/lib/sigman"));
        assert_eq!(config.logo_url.as_deref(), Some("https://cdn.example.com/logo.png"));
    }

    #[test]
    fn test_required_values() {
        let err = AppConfig::from_lookup(lookup(&[("DOMAIN", "example.com")])).unwrap_err();
        assert!(err.to_string().contains("ADMIN_EMAIL"));

        let err = AppConfig::from_lookup(lookup(&[
            ("ADMIN_EMAIL", "admin@example.com"),
            ("DOMAIN", " "),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DOMAIN"));
    }
}

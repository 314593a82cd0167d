//! # Sigman Server
//!
//! Google Workspaceのメール署名とプロフィールを管理するHTTP API。
//!
//! ## 起動手順
//! 1. 環境変数から設定を読み込む（`ADMIN_EMAIL`, `DOMAIN` は必須）
//! 2. 画像ストレージのディレクトリを作成する
//! 3. サービスアカウント認証・Directory API・Gmail APIのクライアントを構築する
//! 4. ルーターを起動する
//!
//! 鍵ファイルがなくても起動する。認証の失敗はリクエストごとに画面の通知として返す。

mod config;
mod endpoints;
mod error;
mod strategies;
mod workspace;

use std::sync::Arc;

use sigman_core::ImageStore;
use sigman_google::{DirectoryClient, GmailClient, ServiceAccountAuth};

use config::{AppConfig, AppState};
use workspace::Workspace;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;

    tokio::fs::create_dir_all(&config.storage_root).await?;

    if !config.service_account_file.exists() {
        tracing::warn!(
            "サービスアカウント鍵ファイルがありません: {}",
            config.service_account_file.display()
        );
    }

    let http = reqwest::Client::new();
    let credentials = Arc::new(ServiceAccountAuth::new(
        config.service_account_file.clone(),
        config.admin_email.clone(),
        config.scopes(),
        http.clone(),
    ));
    tracing::info!(
        key = %credentials.key_path().display(),
        admin = %config.admin_email,
        groups = config.enable_groups,
        "認証情報を設定しました"
    );

    let workspace = Workspace::new(
        credentials,
        Arc::new(DirectoryClient::new(http.clone())),
        Arc::new(GmailClient::new(http.clone())),
    );
    let images = ImageStore::new(config.storage_root.clone(), http);

    let addr = config.listen_addr.clone();
    tracing::info!("ドメイン {} の署名管理を開始します", config.domain);

    let state = Arc::new(AppState {
        config,
        workspace,
        images,
    });
    let app = endpoints::router(state);

    tracing::info!("Sigmanサーバーを {} で起動します", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

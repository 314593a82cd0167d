//! # Google API エラー型

/// 認証・API呼び出しのエラー。
#[derive(Debug, thiserror::Error)]
pub enum GoogleError {
    /// サービスアカウント鍵の読み込み・JWT生成・トークン交換に失敗
    #[error("認証に失敗: {0}")]
    Credential(String),
    /// HTTP送信・受信に失敗
    #[error("HTTP通信に失敗: {0}")]
    Transport(String),
    /// APIが2xx以外を返した
    #[error("APIがエラーを返しました: HTTP {status} - {body}")]
    Api { status: u16, body: String },
    /// レスポンスボディが期待する形式でない
    #[error("レスポンスのパースに失敗: {0}")]
    Parse(String),
}

//! # 絶対URLへの変換
//!
//! 送信メールの中では相対パスは意味を持たないため、プロバイダーに送る直前に
//! ローカルの静的パスを絶対URLに変換する。

use super::{rewrite_sources, STATIC_PREFIX};

/// `/static/` で始まる画像の `src` を `{base_url}{src}` に書き換える。
///
/// `base_url` は外部URL設定、なければ現在のリクエストのオリジン。
/// 末尾の `/` は取り除いてから連結する。
/// 変換後の `src` は `/static/` で始まらないため、2回適用しても結果は変わらない。
pub fn make_absolute(html: &str, base_url: &str) -> String {
    if html.is_empty() {
        return html.to_string();
    }

    let base = base_url.trim_end_matches('/');
    rewrite_sources(html, |image| {
        image
            .src
            .as_deref()
            .filter(|src| src.starts_with(STATIC_PREFIX))
            .map(|src| format!("{base}{src}"))
    })
    .unwrap_or_else(|e| {
        tracing::error!(error = %e, "絶対URLへの変換に失敗");
        html.to_string()
    })
}

//! # 署名HTMLの画像処理
//!
//! 署名内の `<img>` 参照を永続的かつ持ち運び可能な形に正規化する。
//!
//! ## 画像参照の種類
//! - ローカルパス: `/static/uploads/<file>`（保存済み）
//! - 外部URL: `http://` / `https://`
//! - インライン: `data:image/<fmt>;base64,<data>`（正規化待ち）
//!
//! ## 呼び出し順序
//! `preserve_existing` → `ImageStore::extract_and_store` の順に呼ぶこと。
//! 既存画像をローカルパスに戻してから抽出すれば、変更のない画像は
//! 保存済みとしてスキップされ、新しい画像だけが保存される。
//!
//! 属性の読み取りと書き換えはどちらも `lol_html` のトークナイザで行う。
//! 読み取りと書き換えで同じ生の属性値を扱うため、エンティティを含むURLでも
//! 照合がずれない。

mod absolute;
mod preserve;
mod store;

pub use absolute::make_absolute;
pub use preserve::preserve_existing;
pub use store::ImageStore;

use lol_html::{element, rewrite_str, RewriteStrSettings};

/// ローカル保存画像の公開パスのプレフィックス。ストレージルートと1対1に対応する。
pub const UPLOADS_PREFIX: &str = "/static/uploads/";

/// 静的ファイルの公開パスのプレフィックス。`make_absolute` の変換対象。
pub const STATIC_PREFIX: &str = "/static/";

/// インライン画像のプレフィックス
const INLINE_PREFIX: &str = "data:image";

/// 画像処理のエラー型。呼び出し元には返さず、画像単位でログに記録する。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// インライン画像のデコードに失敗
    #[error("インライン画像のデコードに失敗: {0}")]
    Decode(String),
    /// 外部画像の取得に失敗
    #[error("画像の取得に失敗: {0}")]
    Fetch(String),
    /// 外部画像が200以外を返した
    #[error("画像の取得でHTTPエラー: ステータス {0}")]
    Status(u16),
    /// ファイル名が不正
    #[error("不正なファイル名: {0}")]
    InvalidName(String),
    /// ファイル書き込みに失敗
    #[error("画像の保存に失敗: {0}")]
    Io(#[from] std::io::Error),
    /// HTMLの書き換えに失敗
    #[error("HTMLの書き換えに失敗: {0}")]
    Rewrite(String),
}

/// 画像参照の種類。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// ストレージルート配下の保存済み画像
    Local,
    /// `http://` / `https://` の外部画像
    External,
    /// `data:image/...` のインライン画像
    Inline,
    /// 上記以外（相対パス、cid: 等）。処理対象外。
    Other,
}

impl ImageSource {
    /// `src` 属性値から種類を判定する。
    pub fn classify(src: &str) -> Self {
        if src.starts_with(UPLOADS_PREFIX) {
            ImageSource::Local
        } else if src.starts_with(INLINE_PREFIX) {
            ImageSource::Inline
        } else if src.starts_with("http://") || src.starts_with("https://") {
            ImageSource::External
        } else {
            ImageSource::Other
        }
    }
}

/// HTML中の1つの `<img>` 要素。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// `src` 属性（生の値）
    pub src: Option<String>,
    /// `alt` 属性（生の値）
    pub alt: Option<String>,
}

impl ImageRef {
    /// 空でない `alt` 属性。
    pub fn alt_key(&self) -> Option<&str> {
        self.alt.as_deref().filter(|a| !a.is_empty())
    }
}

/// HTML中の `<img>` 要素を文書順に列挙する。
pub fn collect_images(html: &str) -> Result<Vec<ImageRef>, ImageError> {
    let mut images = Vec::new();
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("img", |el| {
                images.push(ImageRef {
                    src: el.get_attribute("src"),
                    alt: el.get_attribute("alt"),
                });
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| ImageError::Rewrite(e.to_string()))?;
    Ok(images)
}

/// HTMLに `<img>` 要素が1つ以上含まれるか。
pub fn has_image(html: &str) -> bool {
    !html.is_empty() && collect_images(html).map(|i| !i.is_empty()).unwrap_or(false)
}

/// `src` を持つ各 `<img>` に対して `replace(src, alt)` を呼び、
/// `Some` が返った要素の `src` を置き換える。それ以外の部分は入力のまま残る。
pub(crate) fn rewrite_sources<F>(html: &str, mut replace: F) -> Result<String, ImageError>
where
    F: FnMut(&ImageRef) -> Option<String>,
{
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("img[src]", |el| {
                let image = ImageRef {
                    src: el.get_attribute("src"),
                    alt: el.get_attribute("alt"),
                };
                if let Some(new_src) = replace(&image) {
                    el.set_attribute("src", &new_src)?;
                }
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| ImageError::Rewrite(e.to_string()))
}

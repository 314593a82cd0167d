//! # 既存画像パスの引き継ぎ
//!
//! エディタは既存の画像を含む署名HTML全体を再送信してくる。
//! 変更されていない画像は編集前の参照に戻し、再保存や重複を防ぐ。
//!
//! ## 照合
//! 1. 編集前の署名から `キー → src` の表を作る。キーは空でない `alt`、
//!    なければ生の `src`。対象はローカル画像と外部画像のみ。
//! 2. 新しい署名の各画像を照合する。インライン画像は新規として扱い変更しない。
//!    `alt` 一致を優先し、次に `src` 一致。どちらにも一致しなければ変更しない。
//!
//! `alt` と `src` は同じキー空間を共有するため、ある画像の `alt` が別の画像の
//! `src` 文字列と偶然一致すると、その画像に対応付けられる。

use std::collections::HashMap;

use super::{collect_images, rewrite_sources, ImageRef, ImageSource};

/// 編集前の署名の画像参照を、新しい署名に引き継ぐ。
///
/// `old` と `new` の両方に `<img>` がなければ `new` をそのまま返す。
pub fn preserve_existing(old: &str, new: &str) -> String {
    if old.is_empty() || new.is_empty() {
        return new.to_string();
    }

    let (old_images, new_images) = match (collect_images(old), collect_images(new)) {
        (Ok(o), Ok(n)) => (o, n),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "署名HTMLの解析に失敗。画像パスを引き継ぎません");
            return new.to_string();
        }
    };
    if old_images.is_empty() || new_images.is_empty() {
        return new.to_string();
    }

    let known = known_sources(&old_images);
    if known.is_empty() {
        return new.to_string();
    }

    rewrite_sources(new, |image| {
        let src = image.src.as_deref()?;
        resolve(&known, image)
            .filter(|mapped| mapped.as_str() != src)
            .cloned()
    })
    .unwrap_or_else(|e| {
        tracing::error!(error = %e, "画像パスの引き継ぎに失敗");
        new.to_string()
    })
}

/// 編集前の画像から `alt または src → src` の表を作る。
fn known_sources(images: &[ImageRef]) -> HashMap<String, String> {
    let mut known = HashMap::new();
    for image in images {
        let Some(src) = image.src.as_deref() else {
            continue;
        };
        if !matches!(
            ImageSource::classify(src),
            ImageSource::Local | ImageSource::External
        ) {
            continue;
        }
        let key = image.alt_key().unwrap_or(src);
        known.insert(key.to_string(), src.to_string());
    }
    known
}

/// 新しい画像に対応する編集前の `src` を探す。
fn resolve<'a>(known: &'a HashMap<String, String>, image: &ImageRef) -> Option<&'a String> {
    let src = image.src.as_deref()?;
    if ImageSource::classify(src) == ImageSource::Inline {
        return None;
    }
    image
        .alt_key()
        .and_then(|alt| known.get(alt))
        .or_else(|| known.get(src))
}

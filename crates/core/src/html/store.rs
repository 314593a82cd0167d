//! # ローカル画像ストレージ
//!
//! 署名中のインライン画像・外部画像をストレージルート配下に保存し、
//! `src` を公開パス（`/static/uploads/<file>`）に書き換える。
//!
//! 同じディレクトリに複数のリクエストが同時に書き込む可能性があるが、
//! ロックは取らない。保存名はランダムなUUID v4で生成し、衝突を避ける。

use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::Engine;

use super::{collect_images, rewrite_sources, ImageError, ImageSource, UPLOADS_PREFIX};

/// 外部画像取得のタイムアウト
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// 外部URLに拡張子がない場合の既定拡張子
const DEFAULT_EXTENSION: &str = "jpg";

/// ストレージルートと画像取得用HTTPクライアント。
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    http: reqwest::Client,
}

impl ImageStore {
    /// 新しいImageStoreを作成する。
    ///
    /// # 引数
    /// - `root`: 画像を保存するディレクトリ（`/static/uploads/` に対応）
    /// - `http`: 外部画像の取得に使うHTTPクライアント
    pub fn new(root: impl Into<PathBuf>, http: reqwest::Client) -> Self {
        Self {
            root: root.into(),
            http,
        }
    }

    /// ストレージルート。
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 署名HTML中のインライン画像・外部画像を保存し、`src` をローカルパスに書き換える。
    ///
    /// 画像単位のエラーはログに記録し、その画像の `src` は変更しない。
    /// 残りの画像の処理は継続する。呼び出し元にエラーを返すことはない。
    /// 同じ `src` が複数回現れても、`<img>` ごとに別のファイルとして保存する。
    ///
    /// 属性値はエンティティを含む生の値のまま照合・書き換えに使い、
    /// デコードと取得にはエンティティを展開した値を使う。
    pub async fn extract_and_store(&self, html: &str) -> String {
        if html.is_empty() {
            return html.to_string();
        }

        let images = match collect_images(html) {
            Ok(images) => images,
            Err(e) => {
                tracing::error!(error = %e, "署名HTMLの解析に失敗");
                return html.to_string();
            }
        };

        // `src` を持つ `<img>` の文書順に、新しいパスまたは None
        let mut replacements: Vec<Option<String>> = Vec::new();
        for src in images.into_iter().filter_map(|i| i.src) {
            let value = html_escape::decode_html_entities(&src);
            let stored = match ImageSource::classify(&src) {
                ImageSource::Local | ImageSource::Other => {
                    replacements.push(None);
                    continue;
                }
                ImageSource::Inline => self.store_inline(&value).await,
                ImageSource::External => self.store_remote(&value).await,
            };
            match stored {
                Ok(public_path) => replacements.push(Some(public_path)),
                Err(e) => {
                    tracing::warn!(src = %truncate(&src), error = %e, "画像を保存できませんでした");
                    replacements.push(None);
                }
            }
        }

        if replacements.iter().all(Option::is_none) {
            return html.to_string();
        }

        let mut next = replacements.into_iter();
        rewrite_sources(html, |_| next.next().flatten()).unwrap_or_else(|e| {
            tracing::error!(error = %e, "画像パスの書き換えに失敗");
            html.to_string()
        })
    }

    /// `data:image/<fmt>;base64,<data>` をデコードして保存する。
    async fn store_inline(&self, src: &str) -> Result<String, ImageError> {
        let (extension, bytes) = decode_inline(src)?;
        let filename = format!("{}.{extension}", uuid::Uuid::new_v4());
        self.write(&filename, &bytes).await
    }

    /// 外部URLから画像を取得して保存する。
    /// 取得失敗・200以外の場合はファイルを作成しない。
    async fn store_remote(&self, src: &str) -> Result<String, ImageError> {
        let extension = remote_extension(src);
        let filename = format!("{}.{extension}", uuid::Uuid::new_v4());

        let response = self
            .http
            .get(src)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| ImageError::Fetch(e.to_string()))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(ImageError::Status(response.status().as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageError::Fetch(e.to_string()))?;

        self.write(&filename, &bytes).await
    }

    /// クライアントがアップロードした画像を保存し、公開パスを返す。
    ///
    /// ファイル名はクライアント指定の名前をそのまま使う（一意化しない）。
    /// 同名ファイルは上書きされる。パス区切りを含む場合は最後の要素のみを使う。
    pub async fn save_upload(&self, filename: &str, bytes: &[u8]) -> Result<String, ImageError> {
        let name = sanitize_filename(filename)?;
        self.write(name, bytes).await
    }

    /// 保存済み画像を読み込む。
    pub async fn read(&self, filename: &str) -> Result<Vec<u8>, ImageError> {
        let name = sanitize_filename(filename)?;
        Ok(tokio::fs::read(self.root.join(name)).await?)
    }

    async fn write(&self, filename: &str, bytes: &[u8]) -> Result<String, ImageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(filename), bytes).await?;
        Ok(format!("{UPLOADS_PREFIX}{filename}"))
    }
}

/// インライン画像の形式とバイト列を取り出す。
///
/// `data:image/svg+xml;base64,...` のような形式は `+` より前を拡張子とする。
fn decode_inline(src: &str) -> Result<(String, Vec<u8>), ImageError> {
    let (header, data) = src
        .split_once(',')
        .ok_or_else(|| ImageError::Decode("データ部がありません".to_string()))?;

    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default();
    if !params.any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(ImageError::Decode("base64形式ではありません".to_string()));
    }

    let format = mime
        .split_once('/')
        .map(|(_, f)| f.split('+').next().unwrap_or_default())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if format.is_empty() || !format.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ImageError::Decode(format!("不明な画像形式: {mime}")));
    }

    let cleaned: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| ImageError::Decode(e.to_string()))?;
    if bytes.is_empty() {
        return Err(ImageError::Decode("空の画像データ".to_string()));
    }

    Ok((format, bytes))
}

/// 外部URLのパスから拡張子を取り出す。取り出せない場合は既定拡張子。
fn remote_extension(src: &str) -> String {
    url::Url::parse(src)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .and_then(|last| {
            Path::new(&last)
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
        })
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// パス区切りを除去し、最後の要素だけをファイル名として使う。
fn sanitize_filename(filename: &str) -> Result<&str, ImageError> {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    if name.is_empty() || name == "." || name == ".." {
        return Err(ImageError::InvalidName(filename.to_string()));
    }
    Ok(name)
}

/// ログ出力用にインライン画像などの長い値を切り詰める。
fn truncate(src: &str) -> &str {
    const MAX: usize = 80;
    match src.char_indices().nth(MAX) {
        Some((idx, _)) => &src[..idx],
        None => src,
    }
}

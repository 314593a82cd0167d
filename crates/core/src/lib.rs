//! # Sigman Core
//!
//! 署名HTMLの画像正規化と、署名更新のフォールバック制御を実装する。
//!
//! ## 処理フロー（署名の保存）
//! 1. 編集前の署名と照合し、既存画像の参照を引き継ぐ（`html::preserve_existing`）
//! 2. インライン画像・外部画像をローカルストレージに保存する（`html::ImageStore`）
//! 3. ローカルパスを絶対URLに変換する（`html::make_absolute`）
//! 4. 複数の認可方式を順に試し、最初に成功した方式で保存する（`update::apply`）
//!
//! ## モジュール構成
//! - `html`: 画像の抽出・保存・書き換え
//! - `update`: 署名更新ストラテジーの順次実行
//! - `bulk`: 複数ユーザーへの一括適用
//! - `profile`: プロフィール部分更新ボディの構築
//! - `placeholders`: テンプレート署名のプレースホルダー置換
//! - `templates`: 組み込み署名テンプレート

pub mod bulk;
pub mod html;
pub mod placeholders;
pub mod profile;
pub mod templates;
pub mod update;

pub use bulk::{bulk_apply, BulkBackend};
pub use html::{make_absolute, preserve_existing, ImageStore};
pub use update::{apply, SignatureUpdate, UpdateOutcome, UpdateStrategy};

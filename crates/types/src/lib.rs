//! # Sigman 共有型定義
//!
//! Google Workspace（Directory API / Gmail API）とWeb画面の間でやり取りする
//! データ構造をRust構造体として提供する。
//!
//! ## 命名規則
//! - プロバイダーのJSONはcamelCase（`primaryEmail`, `sendAsEmail` 等）
//! - フロントエンド向けのリクエスト/レスポンスも同じくcamelCaseに揃える
//! - プロバイダーが返す未知のフィールドは `extra` に保持し、往復で失わない

use serde::{Deserialize, Serialize};

/// 未知フィールドの保持用マップ
pub type ExtraFields = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Directory API
// ---------------------------------------------------------------------------

/// Directory APIのユーザーレコード（読み取り側）。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    /// 主メールアドレス
    #[serde(default)]
    pub primary_email: String,
    /// 氏名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<UserName>,
    /// 電話番号一覧。先頭要素が編集対象。
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phones: Vec<Phone>,
    /// 組織情報一覧。先頭要素が編集対象。
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub organizations: Vec<Organization>,
    /// 停止中アカウントかどうか
    #[serde(default)]
    pub suspended: bool,
    /// 特権管理者かどうか
    #[serde(default)]
    pub is_admin: bool,
    /// その他のフィールド（id, thumbnailPhotoUrl 等）
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl DirectoryUser {
    /// フルネーム。未設定なら空文字列。
    pub fn full_name(&self) -> &str {
        self.name
            .as_ref()
            .and_then(|n| n.full_name.as_deref())
            .unwrap_or_default()
    }

    /// 先頭の組織の役職。
    pub fn job_title(&self) -> &str {
        self.organizations
            .first()
            .and_then(|o| o.title.as_deref())
            .unwrap_or_default()
    }

    /// 先頭の組織の部署。
    pub fn department(&self) -> &str {
        self.organizations
            .first()
            .and_then(|o| o.department.as_deref())
            .unwrap_or_default()
    }

    /// 先頭の電話番号。
    pub fn phone(&self) -> &str {
        self.phones.first().map(|p| p.value.as_str()).unwrap_or_default()
    }

    /// 名。
    pub fn given_name(&self) -> &str {
        self.name
            .as_ref()
            .and_then(|n| n.given_name.as_deref())
            .unwrap_or_default()
    }

    /// 姓。
    pub fn family_name(&self) -> &str {
        self.name
            .as_ref()
            .and_then(|n| n.family_name.as_deref())
            .unwrap_or_default()
    }
}

/// ユーザーの氏名。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// 電話番号エントリ。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Phone {
    /// 電話番号
    #[serde(default)]
    pub value: String,
    /// 種別 ("work", "mobile" 等)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// 主番号かどうか
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// 組織情報エントリ。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    /// 役職
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// 部署
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// 種別 ("work" 等)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// 主組織かどうか
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// `PUT users/{userKey}` に送る部分更新ボディ。
/// 指定したフィールドだけがリモートのレコードにマージされる。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<UserName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phones: Option<Vec<Phone>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizations: Option<Vec<Organization>>,
}

impl UserUpdate {
    /// 更新対象が一つもないか。
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phones.is_none() && self.organizations.is_none()
    }
}

/// `GET users?domain=` のレスポンス。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserList {
    #[serde(default)]
    pub users: Vec<DirectoryUser>,
}

/// Directory APIのグループ。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// `GET groups?userKey=` のレスポンス。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupList {
    #[serde(default)]
    pub groups: Vec<Group>,
}

// ---------------------------------------------------------------------------
// Gmail API
// ---------------------------------------------------------------------------

/// 送信元アドレス（send-as）。各アドレスが独立した署名を持つ。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendAs {
    /// 送信元メールアドレス
    pub send_as_email: String,
    /// 表示名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// 署名HTML
    #[serde(default)]
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_primary: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// `GET users/{id}/settings/sendAs` のレスポンス。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendAsList {
    #[serde(default)]
    pub send_as: Vec<SendAs>,
}

/// `PATCH users/{id}/settings/sendAs/{email}` のボディ。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignaturePatch {
    pub signature: String,
}

// ---------------------------------------------------------------------------
// プロフィール編集
// ---------------------------------------------------------------------------

/// 画面・APIから受け取るプロフィール編集フィールド。
/// 指定されたフィールドのみ更新する（部分更新）。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl ProfileFields {
    /// 空文字列のフィールドを未指定として扱ったコピーを返す。
    /// フォーム送信では未入力欄が空文字列で届くため。
    pub fn without_blanks(self) -> Self {
        fn keep(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.is_empty())
        }
        Self {
            first_name: keep(self.first_name),
            last_name: keep(self.last_name),
            phone_number: keep(self.phone_number),
            job_title: keep(self.job_title),
            department: keep(self.department),
        }
    }
}

// ---------------------------------------------------------------------------
// API リクエスト/レスポンス
// ---------------------------------------------------------------------------

/// POST /bulk-apply リクエスト。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkApplyRequest {
    /// 対象ユーザーのメールアドレス
    #[serde(default)]
    pub users: Vec<String>,
    /// テンプレート署名HTML
    #[serde(default)]
    pub signature: String,
    /// `{NOM}` 等のプレースホルダーをユーザーごとに置換するか
    #[serde(default)]
    pub replace_variables: bool,
}

/// POST /bulk-update-users リクエスト。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkUpdateRequest {
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub data: ProfileFields,
}

/// POST /api/user-info リクエスト。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInfoRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub data: ProfileFields,
}

/// 一括処理の失敗エントリ。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedTarget {
    pub email: String,
    pub error: String,
}

/// 一括処理の結果。対象ユーザーを成功/失敗に分割する。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkResult {
    pub success: Vec<String>,
    pub failed: Vec<FailedTarget>,
}

impl BulkResult {
    pub fn record_success(&mut self, email: &str) {
        self.success.push(email.to_string());
    }

    pub fn record_failure(&mut self, email: &str, error: impl Into<String>) {
        self.failed.push(FailedTarget {
            email: email.to_string(),
            error: error.into(),
        });
    }
}

/// 成否とメッセージの組。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
}

impl ApiMessage {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// POST /api/upload-image の成功レスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

/// エラー時のJSONボディ。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// ---------------------------------------------------------------------------
// 画面状態
// ---------------------------------------------------------------------------
//
// 画面描画はフロントエンド側で行う。サーバーは画面に必要な状態と
// フラッシュ通知（notices）をJSONで返す。

/// ユーザー一覧画面（GET / と GET /bulk-update-users）。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserListPage {
    pub users: Vec<DirectoryUser>,
    pub notices: Vec<String>,
}

/// 署名テンプレート。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureTemplate {
    pub name: String,
    pub html: String,
}

/// 署名編集画面（GET /signature/{user_email}）。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignaturePage {
    pub user_email: String,
    pub user_info: DirectoryUser,
    pub send_as_list: Vec<SendAs>,
    pub current_signature: String,
    pub is_valid_send_as: bool,
    pub primary_email: String,
    pub selected_email: String,
    pub user_groups: Vec<Group>,
    pub signature_templates: Vec<SignatureTemplate>,
    pub notices: Vec<String>,
}

/// ユーザー情報編集画面（GET /user-info/{user_email}）。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoPage {
    pub user_email: String,
    pub user_info: DirectoryUser,
    pub first_name: String,
    pub last_name: String,
    pub job_title: String,
    pub department: String,
    pub phone_number: String,
    pub notices: Vec<String>,
}

/// フォーム送信（POST）の結果。元の画面に戻るための情報と通知を持つ。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub success: bool,
    pub notices: Vec<String>,
    /// 署名画面で次に選択するアドレス
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_email: Option<String>,
}

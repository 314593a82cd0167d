//! # テンプレート署名のプレースホルダー置換
//!
//! 一括適用時、テンプレート中のプレースホルダーを対象ユーザーの
//! ディレクトリ情報で置き換える。プレースホルダー名はフロントエンドと共有する。

use sigman_types::DirectoryUser;

/// フルネーム
pub const NAME: &str = "{NOM}";
/// メールアドレス
pub const EMAIL: &str = "{EMAIL}";
/// 役職
pub const JOB_TITLE: &str = "{FONCTION}";
/// 電話番号（先頭）
pub const PHONE: &str = "{TELEPHONE}";
/// 部署
pub const DEPARTMENT: &str = "{DEPARTEMENT}";

/// テンプレート中のプレースホルダーを置換する。値がなければ空文字列になる。
pub fn substitute(template: &str, email: &str, user: &DirectoryUser) -> String {
    template
        .replace(NAME, user.full_name())
        .replace(EMAIL, email)
        .replace(JOB_TITLE, user.job_title())
        .replace(PHONE, user.phone())
        .replace(DEPARTMENT, user.department())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_all_placeholders() {
        let user: DirectoryUser = serde_json::from_value(serde_json::json!({
            "primaryEmail": "alice@example.com",
            "name": {"fullName": "Alice Martin"},
            "phones": [{"value": "01 23 45 67 89"}],
            "organizations": [{"title": "Agent", "department": "Ventes"}]
        }))
        .unwrap();

        let template = "<b>{NOM}</b> {FONCTION} ({DEPARTEMENT})<br>{EMAIL} | {TELEPHONE} | {NOM}";
        assert_eq!(
            substitute(template, "alice@example.com", &user),
            "<b>Alice Martin</b> Agent (Ventes)<br>alice@example.com | 01 23 45 67 89 | Alice Martin"
        );
    }

    #[test]
    fn test_substitute_missing_values_become_empty() {
        let user = DirectoryUser::default();
        assert_eq!(
            substitute("[{NOM}][{TELEPHONE}][{FONCTION}]", "bob@example.com", &user),
            "[][][]"
        );
        assert_eq!(substitute("sans variable", "bob@example.com", &user), "sans variable");
    }
}

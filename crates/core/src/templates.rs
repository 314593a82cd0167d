//! # 組み込み署名テンプレート
//!
//! 署名編集画面で選択できるテンプレートを、ユーザーのディレクトリ情報から生成する。

use sigman_types::{DirectoryUser, SignatureTemplate};

/// テンプレート生成に使う組織情報。
#[derive(Debug, Clone, Copy)]
pub struct Branding<'a> {
    /// Workspaceドメイン
    pub domain: &'a str,
    /// ロゴ画像のURL。なければロゴを出さない。
    pub logo_url: Option<&'a str>,
}

/// 組み込みテンプレート一覧を生成する。
pub fn builtin(
    user: &DirectoryUser,
    selected_email: &str,
    branding: Branding<'_>,
) -> Vec<SignatureTemplate> {
    vec![
        SignatureTemplate {
            name: "Default".to_string(),
            html: default_template(user, branding),
        },
        SignatureTemplate {
            name: "Avec logo".to_string(),
            html: logo_template(user, selected_email, branding),
        },
    ]
}

fn logo_img(branding: Branding<'_>, alt: &str, size: u32) -> String {
    match branding.logo_url {
        Some(url) => format!(
            r#"<img alt="{alt}" height="{size}" src="{}" style="display:block;border:0" width="{size}">"#,
            escape(url)
        ),
        None => String::new(),
    }
}

fn default_template(user: &DirectoryUser, branding: Branding<'_>) -> String {
    format!(
        r#"<table border="0" cellpadding="0" cellspacing="0" style="font-family:'Open Sans',Arial,sans-serif;color:#000000;font-size:12px;line-height:16px;border-collapse:collapse">
<tr>
<td style="vertical-align:top;padding-right:40px;padding-left:40px;width:75px">{logo}</td>
<td style="vertical-align:top">
<table border="0" cellpadding="0" cellspacing="0" style="border-collapse:collapse">
<tr><td style="font-size:14px;line-height:20px;padding-bottom:2px">{name}</td></tr>
<tr><td style="font-size:14px;line-height:20px;padding-bottom:2px">{title}</td></tr>
<tr><td style="font-size:14px;line-height:20px;padding-bottom:2px;padding-top:16px">{phone}</td></tr>
<tr><td style="font-size:12px;line-height:16px"><a href="https://{domain}" style="color:#000000;text-decoration:none" target="_blank">{domain}</a></td></tr>
</table>
</td>
</tr>
<tr><td colspan="2" style="border-top:1px solid #000000"></td></tr>
</table>"#,
        logo = logo_img(branding, "Logo", 75),
        name = escape(user.full_name()),
        title = escape(user.job_title()),
        phone = escape(user.phone()),
        domain = escape(branding.domain),
    )
}

fn logo_template(user: &DirectoryUser, selected_email: &str, branding: Branding<'_>) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; font-size: 12px;">
<table>
<tr>
<td style="padding-right: 15px; vertical-align: top;">{logo}</td>
<td style="vertical-align: top;">
<p><strong>{name}</strong><br>
{title}<br>
{email} | {phone}</p>
<p>{domain}</p>
</td>
</tr>
</table>
</div>"#,
        logo = logo_img(branding, "Logo", 100),
        name = escape(user.full_name()),
        title = escape(user.job_title()),
        email = escape(selected_email),
        phone = escape(user.phone()),
        domain = escape(branding.domain),
    )
}

/// HTMLテキスト・属性値のエスケープ。
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> DirectoryUser {
        serde_json::from_value(serde_json::json!({
            "primaryEmail": "alice@example.com",
            "name": {"fullName": "Alice <Martin>"},
            "phones": [{"value": "0100"}],
            "organizations": [{"title": "Agent"}]
        }))
        .unwrap()
    }

    #[test]
    fn test_builtin_templates_render_profile() {
        let branding = Branding {
            domain: "example.com",
            logo_url: Some("https://cdn.example.com/logo.png"),
        };
        let templates = builtin(&user(), "contact@example.com", branding);

        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].name, "Default");
        assert!(templates[0].html.contains("Alice &lt;Martin&gt;"));
        assert!(templates[0].html.contains("https://cdn.example.com/logo.png"));
        assert!(templates[1].html.contains("contact@example.com | 0100"));
        assert!(templates[1].html.contains("<p>example.com</p>"));
    }

    #[test]
    fn test_builtin_templates_without_logo() {
        let branding = Branding {
            domain: "example.com",
            logo_url: None,
        };
        let templates = builtin(&user(), "alice@example.com", branding);
        assert!(templates.iter().all(|t| !t.html.contains("<img")));
    }
}

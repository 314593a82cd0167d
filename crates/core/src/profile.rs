//! # プロフィール部分更新
//!
//! 現在のディレクトリレコードと編集フィールドから `PUT users/{key}` の
//! ボディを組み立てる。リスト型フィールド（phones, organizations）は
//! 先頭要素だけを変更し、空なら主要な `work` エントリを新規作成する。

use sigman_types::{DirectoryUser, Organization, Phone, ProfileFields, UserUpdate};

/// 変更後のレコードに送る部分更新ボディを作る。
///
/// 指定のないフィールドはボディに含めない。何も指定がなければ空のボディを返す。
pub fn build_update(current: &DirectoryUser, fields: &ProfileFields) -> UserUpdate {
    let mut update = UserUpdate::default();

    if fields.first_name.is_some() || fields.last_name.is_some() {
        let mut name = current.name.clone().unwrap_or_default();
        if let Some(first) = &fields.first_name {
            name.given_name = Some(first.clone());
        }
        if let Some(last) = &fields.last_name {
            name.family_name = Some(last.clone());
        }
        if let (Some(given), Some(family)) = (&name.given_name, &name.family_name) {
            name.full_name = Some(format!("{given} {family}"));
        }
        update.name = Some(name);
    }

    if let Some(number) = &fields.phone_number {
        let mut phones = current.phones.clone();
        match phones.first_mut() {
            Some(phone) => phone.value = number.clone(),
            None => phones.push(Phone {
                value: number.clone(),
                kind: Some("work".to_string()),
                primary: Some(true),
                ..Default::default()
            }),
        }
        update.phones = Some(phones);
    }

    if fields.job_title.is_some() || fields.department.is_some() {
        let mut organizations = current.organizations.clone();
        if organizations.is_empty() {
            organizations.push(Organization {
                kind: Some("work".to_string()),
                primary: Some(true),
                ..Default::default()
            });
        }
        if let Some(org) = organizations.first_mut() {
            if let Some(title) = &fields.job_title {
                org.title = Some(title.clone());
            }
            if let Some(department) = &fields.department {
                org.department = Some(department.clone());
            }
        }
        update.organizations = Some(organizations);
    }

    update
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> DirectoryUser {
        serde_json::from_value(serde_json::json!({
            "primaryEmail": "alice@example.com",
            "name": {"givenName": "Alice", "familyName": "Martin", "fullName": "Alice Martin"},
            "phones": [
                {"value": "0100", "type": "work", "primary": true},
                {"value": "0200", "type": "mobile"}
            ],
            "organizations": [{"title": "Agent", "department": "Ventes", "costCenter": "42"}]
        }))
        .unwrap()
    }

    #[test]
    fn test_empty_fields_produce_empty_update() {
        assert!(build_update(&alice(), &ProfileFields::default()).is_empty());
    }

    #[test]
    fn test_name_update_recomputes_full_name() {
        let fields = ProfileFields {
            last_name: Some("Durand".to_string()),
            ..Default::default()
        };
        let update = build_update(&alice(), &fields);
        let name = update.name.unwrap();
        assert_eq!(name.given_name.as_deref(), Some("Alice"));
        assert_eq!(name.family_name.as_deref(), Some("Durand"));
        assert_eq!(name.full_name.as_deref(), Some("Alice Durand"));
        assert!(update.phones.is_none());
        assert!(update.organizations.is_none());
    }

    #[test]
    fn test_name_without_family_keeps_full_name_unset() {
        let fields = ProfileFields {
            first_name: Some("Bob".to_string()),
            ..Default::default()
        };
        let name = build_update(&DirectoryUser::default(), &fields).name.unwrap();
        assert_eq!(name.given_name.as_deref(), Some("Bob"));
        assert_eq!(name.full_name, None);
    }

    #[test]
    fn test_phone_update_mutates_first_entry_only() {
        let fields = ProfileFields {
            phone_number: Some("0999".to_string()),
            ..Default::default()
        };
        let phones = build_update(&alice(), &fields).phones.unwrap();
        assert_eq!(phones.len(), 2);
        assert_eq!(phones[0].value, "0999");
        assert_eq!(phones[0].kind.as_deref(), Some("work"));
        assert_eq!(phones[1].value, "0200");
    }

    #[test]
    fn test_phone_update_creates_entry_when_missing() {
        let fields = ProfileFields {
            phone_number: Some("0999".to_string()),
            ..Default::default()
        };
        let phones = build_update(&DirectoryUser::default(), &fields).phones.unwrap();
        assert_eq!(phones.len(), 1);
        assert_eq!(phones[0].kind.as_deref(), Some("work"));
        assert_eq!(phones[0].primary, Some(true));
    }

    #[test]
    fn test_organization_update_merges_title_and_department() {
        let fields = ProfileFields {
            job_title: Some("Directrice".to_string()),
            department: Some("Direction".to_string()),
            ..Default::default()
        };
        let orgs = build_update(&alice(), &fields).organizations.unwrap();
        assert_eq!(orgs.len(), 1);
        assert_eq!(orgs[0].title.as_deref(), Some("Directrice"));
        assert_eq!(orgs[0].department.as_deref(), Some("Direction"));
        // 既存の未知フィールドは保持される
        assert_eq!(orgs[0].extra.get("costCenter").unwrap(), "42");

        let fields = ProfileFields {
            department: Some("Support".to_string()),
            ..Default::default()
        };
        let orgs = build_update(&DirectoryUser::default(), &fields)
            .organizations
            .unwrap();
        assert_eq!(orgs[0].department.as_deref(), Some("Support"));
        assert_eq!(orgs[0].title, None);
        assert_eq!(orgs[0].primary, Some(true));
    }
}

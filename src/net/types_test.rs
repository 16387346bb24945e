use super::*;

#[test]
fn contact_deserializes_server_shape() {
    let raw = r#"{
        "id": 3,
        "user_id": 1,
        "name": "Ann",
        "is_favorite": true,
        "created_at": "2024-03-01T10:00:00",
        "updated_at": null,
        "methods": [{ "id": 8, "contact_id": 3, "type": "social", "value": "@ann" }]
    }"#;
    let contact: Contact = serde_json::from_str(raw).unwrap();
    assert_eq!(contact.id, 3);
    assert!(contact.is_favorite);
    assert_eq!(contact.updated_at, None);
    assert_eq!(contact.methods[0].kind, MethodKind::Social);
    assert_eq!(contact.methods[0].value, "@ann");
}

#[test]
fn contact_without_methods_defaults_to_empty() {
    let contact: Contact = serde_json::from_str(r#"{"id":1,"user_id":1,"name":"Bo"}"#).unwrap();
    assert!(contact.methods.is_empty());
    assert!(!contact.is_favorite);
}

#[test]
fn method_kind_parses_case_insensitively() {
    assert_eq!("Phone".parse::<MethodKind>().unwrap(), MethodKind::Phone);
    assert_eq!(" address ".parse::<MethodKind>().unwrap(), MethodKind::Address);
    let err = "fax".parse::<MethodKind>().unwrap_err();
    assert_eq!(err, UnknownMethodKind("fax".to_owned()));
}

#[test]
fn unknown_method_kind_fails_to_deserialize() {
    let raw = r#"{"id":1,"contact_id":1,"type":"pager","value":"x"}"#;
    assert!(serde_json::from_str::<ContactMethod>(raw).is_err());
}

#[test]
fn query_pairs_skip_blank_search() {
    let query = ContactQuery { favorite: false, search: Some("   ".into()) };
    assert!(query.to_pairs().is_empty());
}

#[test]
fn disposition_filename_reads_plain_and_quoted() {
    assert_eq!(disposition_filename("attachment; filename=a.xlsx").as_deref(), Some("a.xlsx"));
    assert_eq!(disposition_filename(r#"attachment; filename="b c.xlsx""#).as_deref(), Some("b c.xlsx"));
    assert_eq!(disposition_filename("inline"), None);
}

#[test]
fn disposition_filename_prefers_extended_form() {
    let header = "attachment; filename=contacts.xlsx; filename*=UTF-8''%E9%80%9A%E8%AE%AF%E5%BD%95.xlsx";
    assert_eq!(disposition_filename(header).as_deref(), Some("通讯录.xlsx"));
}

#[test]
fn disposition_filename_falls_back_on_bad_encoding() {
    let header = "attachment; filename=\"plain.xlsx\"; filename*=UTF-8''%ZZ.xlsx";
    assert_eq!(disposition_filename(header).as_deref(), Some("plain.xlsx"));
}

#[test]
fn disposition_filename_rejects_non_utf8_extended_form() {
    let header = "attachment; filename=fallback.xlsx; filename*=UTF-8''%FF%FE.xlsx";
    assert_eq!(disposition_filename(header).as_deref(), Some("fallback.xlsx"));
}

#[test]
fn disposition_filename_keeps_semicolons_inside_quotes() {
    let header = r#"attachment; filename="my;contacts.xlsx""#;
    assert_eq!(disposition_filename(header).as_deref(), Some("my;contacts.xlsx"));

    let header = r#"attachment; filename="say \"hi\"; now.xlsx"; size=10"#;
    assert_eq!(disposition_filename(header).as_deref(), Some(r#"say "hi"; now.xlsx"#));
}

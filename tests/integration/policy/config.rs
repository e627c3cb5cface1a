//! Policy file loading and validation.

use warden::policy::FileFormat;
use warden::{PolicyConfig, PolicyError};

use crate::common::app_policy_path;

/// Tests loading the shipped application policy.
#[test]
fn test_load_app_policy() {
    let policy = PolicyConfig::load(app_policy_path()).unwrap();
    let acl = policy.build_acl().unwrap();

    assert_eq!(acl.roles(), vec!["ROLE_USER", "ROLE_ADMIN", "ROLE_SUPER_ADMIN"]);
    assert_eq!(acl.resources(), vec!["R_USER_PROFILE", "R_USER_CHANGE_OWN_PASSWORD"]);
    assert!(acl
        .is_allowed(Some("ROLE_USER"), Some("R_USER_CHANGE_OWN_PASSWORD"), Some("update"))
        .unwrap());
    assert!(!acl.is_allowed(Some("ROLE_USER"), None, None).unwrap());
}

/// Tests that roles may be declared before their parents.
#[test]
fn test_declaration_order_is_free() {
    let yaml = r"
roles:
  - id: lead
    inherits: [writer, reviewer]
  - id: reviewer
  - id: writer
resources:
  - id: draft
rules:
  - effect: allow
    roles: [writer]
    resources: [draft]
  - effect: deny
    roles: [reviewer]
    resources: [draft]
    privileges: [edit]
";
    let acl = PolicyConfig::from_str(yaml, FileFormat::Yaml)
        .unwrap()
        .build_acl()
        .unwrap();

    assert_eq!(acl.role_parents("lead").unwrap(), ["writer", "reviewer"]);
    assert!(!acl.is_allowed(Some("lead"), Some("draft"), Some("edit")).unwrap());
    assert!(acl.is_allowed(Some("lead"), Some("draft"), Some("comment")).unwrap());
}

/// Tests that cyclic role declarations are rejected.
#[test]
fn test_cyclic_roles_rejected() {
    let toml = r#"
[[roles]]
id = "a"
inherits = ["c"]

[[roles]]
id = "b"
inherits = ["a"]

[[roles]]
id = "c"
inherits = ["b"]
"#;
    let err = PolicyConfig::from_str(toml, FileFormat::Toml).unwrap_err();

    assert!(matches!(err, PolicyError::CyclicRoleInheritance(_)));
    assert_eq!(err.code(), "CYCLIC_ROLE_INHERITANCE");
}

/// Tests that malformed files surface as configuration errors.
#[test]
fn test_malformed_policy() {
    let err = PolicyConfig::from_str("[[rules]]\neffect = \"maybe\"\n", FileFormat::Toml)
        .unwrap_err();
    assert!(matches!(err, PolicyError::Config(_)));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[[roles]\nid = ").unwrap();
    assert!(matches!(PolicyConfig::load(&path).unwrap_err(), PolicyError::Config(_)));
}

/// Tests rules naming undeclared identifiers.
#[test]
fn test_rule_with_undeclared_role() {
    let json = r#"{
        "roles": [{ "id": "reader" }],
        "rules": [{ "effect": "allow", "roles": ["writer"] }]
    }"#;

    assert_eq!(
        PolicyConfig::from_str(json, FileFormat::Json).unwrap_err().code(),
        "ROLE_NOT_FOUND"
    );
}

/// Tests layering an override file on the shipped policy.
#[test]
fn test_layered_override() {
    let dir = tempfile::tempdir().unwrap();
    let overlay = dir.path().join("overlay.json");
    std::fs::write(
        &overlay,
        r#"{ "rules": [
            { "effect": "deny" },
            { "effect": "allow", "roles": ["ROLE_ADMIN"], "resources": ["R_USER_PROFILE"], "privileges": ["view"] }
        ] }"#,
    )
    .unwrap();

    let policy = PolicyConfig::load_layered(&[app_policy_path(), overlay]).unwrap();

    assert_eq!(policy.roles.len(), 3);
    assert!(policy.rules.iter().any(|rule| rule.privileges == vec!["view"]));
}

//! Rule mutation and cascading cleanup.

use warden::acl::{Operation, RuleType, Scope};
use warden::{Acl, AclError, Privileges, Targets};

use crate::common::{cms_acl, profile_acl, NO_PARENTS};

/// Tests that writing the same rule twice stores it once.
#[test]
fn test_overwrite_semantics() {
    let mut acl = profile_acl();
    let before = acl.rules().rule_count();

    acl.allow("user", "profile", Privileges::ALL).unwrap();
    acl.allow("user", "profile", Privileges::ALL).unwrap();

    assert_eq!(acl.rules().rule_count(), before);
    let rule = acl
        .rules()
        .get(&Scope::from("profile"), &Scope::from("user"), None)
        .unwrap();
    assert_eq!(rule.rule_type, RuleType::Allow);
}

/// Tests that removing a deny falls back to the inherited allow.
#[test]
fn test_scoped_removal() {
    let mut acl = profile_acl();
    acl.deny("admin", "profile", Privileges::ALL).unwrap();
    acl.deny("admin", "profile.password", "reset").unwrap();

    acl.remove_deny("admin", "profile", Privileges::ALL).unwrap();

    assert!(acl.is_allowed(Some("admin"), Some("profile"), None).unwrap());
    assert!(!acl.is_allowed(Some("admin"), Some("profile.password"), Some("reset")).unwrap());
    assert!(acl.is_allowed(Some("user"), Some("profile"), None).unwrap());
}

/// Tests that removal only applies to rules of the same type.
#[test]
fn test_removal_requires_matching_type() {
    let mut acl = profile_acl();
    acl.remove_deny("user", "profile", Privileges::ALL).unwrap();

    assert!(acl.is_allowed(Some("user"), Some("profile"), None).unwrap());
}

/// Tests resetting the global rule.
#[test]
fn test_global_allow_removal() {
    let mut acl = cms_acl();
    acl.allow(Targets::ALL, Targets::ALL, Privileges::ALL).unwrap();
    acl.allow(Targets::ALL, "pricing", Privileges::ALL).unwrap();
    assert!(acl.is_allowed(Some("guest"), Some("pricing"), Some("edit")).unwrap());

    acl.remove_allow(Targets::ALL, Targets::ALL, Privileges::ALL).unwrap();

    assert!(!acl.is_allowed(Some("guest"), Some("pricing"), Some("edit")).unwrap());
    assert!(!acl.is_allowed(None, None, None).unwrap());
}

/// Tests that a failed mutation leaves the rule table untouched.
#[test]
fn test_failed_mutation_is_atomic() {
    let mut acl = profile_acl();
    let before = acl.rules().rule_count();

    let err = acl
        .deny(["user", "admin"], ["profile", "billing"], Privileges::ALL)
        .unwrap_err();

    assert_eq!(err, AclError::ResourceNotFound("billing".into()));
    assert_eq!(acl.rules().rule_count(), before);
    assert!(acl.is_allowed(Some("user"), Some("profile"), None).unwrap());
}

/// Tests that removing a role drops its rules.
#[test]
fn test_remove_role_cascades() {
    let mut acl = cms_acl();
    acl.remove_role("marketing").unwrap();

    assert!(!acl.has_role("marketing"));
    assert_eq!(
        acl.is_allowed(Some("marketing"), Some("newsletter"), None).unwrap_err(),
        AclError::RoleNotFound("marketing".into())
    );

    acl.add_role("marketing", ["staff"]).unwrap();
    assert!(!acl.is_allowed(Some("marketing"), Some("newsletter"), Some("publish")).unwrap());
}

/// Tests that removing a parent role detaches it from its children.
#[test]
fn test_remove_parent_role() {
    let mut acl = profile_acl();
    acl.remove_role("user").unwrap();

    assert!(acl.role_parents("admin").unwrap().is_empty());
    assert!(!acl.is_allowed(Some("admin"), Some("profile"), None).unwrap());
}

/// Tests that removing a resource drops its subtree and rules.
#[test]
fn test_remove_resource_cascades() {
    let mut acl = profile_acl();
    acl.allow("admin", "profile.password", "reset").unwrap();

    acl.remove_resource("profile").unwrap();

    assert!(!acl.has_resource("profile.password"));
    assert_eq!(acl.rules().rule_count(), 1);

    acl.add_resource("profile", None).unwrap();
    assert!(!acl.is_allowed(Some("user"), Some("profile"), None).unwrap());
}

/// Tests clearing every role and resource.
#[test]
fn test_remove_everything() {
    let mut acl = cms_acl();
    acl.remove_role_all().remove_resource_all();

    assert!(acl.roles().is_empty());
    assert!(acl.resources().is_empty());
    assert_eq!(acl.rules().rule_count(), 1);
}

/// Tests the low-level rule entry point.
#[test]
fn test_set_rule() {
    let mut acl = Acl::new();
    acl.add_role("auditor", NO_PARENTS).unwrap();
    acl.add_resource("ledger", None).unwrap();

    acl.set_rule(
        Operation::Add,
        RuleType::Allow,
        Targets::from("auditor"),
        Targets::new(vec![Scope::from("ledger")]),
        Privileges::from(vec!["read", "export"]),
        None,
    )
    .unwrap();

    assert!(acl.is_allowed(Some("auditor"), Some("ledger"), Some("export")).unwrap());
    assert_eq!(acl.rules().rule_count(), 3);
}

/// Tests registration errors.
#[test]
fn test_registration_errors() {
    let mut acl = profile_acl();

    assert_eq!(
        acl.add_role("user", NO_PARENTS).unwrap_err(),
        AclError::DuplicateRole("user".into())
    );
    assert_eq!(
        acl.add_role("owner", ["nobody"]).unwrap_err(),
        AclError::UnknownParentRole("nobody".into())
    );
    assert_eq!(
        acl.add_resource("profile", None).unwrap_err(),
        AclError::DuplicateResource("profile".into())
    );
    assert_eq!(
        acl.add_resource("avatar", Some("settings")).unwrap_err(),
        AclError::UnknownParentResource("settings".into())
    );
}

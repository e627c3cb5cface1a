//! Access resolution over role and resource hierarchies.

use std::sync::Arc;
use std::thread;

use warden::{Acl, AclError, Privileges, Targets};

use crate::common::{cms_acl, profile_acl, NO_PARENTS};

/// Tests that an ACL without rules denies everything.
#[test]
fn test_default_deny() {
    let mut acl = Acl::new();
    acl.add_role("user", NO_PARENTS).unwrap();
    acl.add_resource("profile", None).unwrap();

    assert!(!acl.is_allowed(Some("user"), Some("profile"), None).unwrap());
    assert!(!acl.is_allowed(Some("user"), Some("profile"), Some("read")).unwrap());
    assert!(!acl.is_allowed(None, None, None).unwrap());
}

/// Tests a direct allow.
#[test]
fn test_direct_allow() {
    let acl = profile_acl();
    assert!(acl.is_allowed(Some("user"), Some("profile"), None).unwrap());
}

/// Tests that rules are inherited from parent roles.
#[test]
fn test_role_inheritance() {
    let acl = profile_acl();

    assert!(acl.is_allowed(Some("admin"), Some("profile"), None).unwrap());
    assert!(acl.inherits_role("admin", "user", false).unwrap());
    assert!(!acl.inherits_role("user", "admin", false).unwrap());
}

/// Tests that a child resource falls back to its parent's rules.
#[test]
fn test_resource_fallback() {
    let acl = profile_acl();

    assert!(acl.is_allowed(Some("user"), Some("profile.password"), None).unwrap());
    assert!(acl.inherits_resource("profile.password", "profile", true).unwrap());
}

/// Tests that a rule on the queried role beats an inherited one.
#[test]
fn test_specific_rule_overrides_inheritance() {
    let mut acl = profile_acl();
    acl.deny("admin", "profile", Privileges::ALL).unwrap();

    assert!(!acl.is_allowed(Some("admin"), Some("profile"), None).unwrap());
    assert!(acl.is_allowed(Some("user"), Some("profile"), None).unwrap());
}

/// Tests queries naming unregistered identifiers.
#[test]
fn test_unknown_identifiers() {
    let acl = profile_acl();

    assert_eq!(
        acl.is_allowed(Some("ghost"), Some("profile"), None).unwrap_err(),
        AclError::RoleNotFound("ghost".into())
    );
    assert_eq!(
        acl.is_allowed(Some("user"), Some("settings"), None).unwrap_err(),
        AclError::ResourceNotFound("settings".into())
    );
    assert!(acl.inherits_role("ghost", "user", false).is_err());
}

/// Tests the content management matrix.
#[test]
fn test_cms_matrix() {
    let acl = cms_acl();
    let cases = [
        ("guest", "newsletter", "view", true),
        ("staff", "newsletter", "publish", false),
        ("staff", "newsletter", "revise", true),
        ("editor", "news", "view", true),
        ("editor", "latest", "update", false),
        ("marketing", "newsletter", "publish", true),
        ("marketing", "latest", "archive", true),
        ("marketing", "latest", "revise", false),
        ("editor", "latest", "revise", false),
        ("editor", "announcement", "archive", false),
        ("marketing", "announcement", "archive", false),
        ("marketing", "pricing", "publish", false),
        ("administrator", "announcement", "archive", true),
        ("administrator", "pricing", "anything", true),
    ];

    for (role, resource, privilege, expected) in cases {
        assert_eq!(
            acl.is_allowed(Some(role), Some(resource), Some(privilege)).unwrap(),
            expected,
            "{role} -> {resource}:{privilege}"
        );
    }
}

/// Tests that the most recently added parent has the highest priority.
#[test]
fn test_last_parent_wins() {
    let mut acl = Acl::new();
    acl.add_role("reader", NO_PARENTS).unwrap();
    acl.add_role("banned", NO_PARENTS).unwrap();
    acl.add_resource("forum", None).unwrap();
    acl.allow("reader", "forum", Privileges::ALL).unwrap();
    acl.deny("banned", "forum", Privileges::ALL).unwrap();

    acl.add_role("troll", ["reader", "banned"]).unwrap();
    acl.add_role("reformed", ["banned", "reader"]).unwrap();

    assert!(!acl.is_allowed(Some("troll"), Some("forum"), Some("post")).unwrap());
    assert!(acl.is_allowed(Some("reformed"), Some("forum"), Some("post")).unwrap());
}

/// Tests that diamond inheritance resolves and terminates.
#[test]
fn test_diamond_inheritance() {
    let mut acl = Acl::new();
    acl.add_role("base", NO_PARENTS).unwrap();
    acl.add_role("left", ["base"]).unwrap();
    acl.add_role("right", ["base"]).unwrap();
    acl.add_role("bottom", ["left", "right"]).unwrap();
    acl.add_resource("doc", None).unwrap();
    acl.allow("base", "doc", "read").unwrap();

    assert!(acl.is_allowed(Some("bottom"), Some("doc"), Some("read")).unwrap());
    assert!(!acl.is_allowed(Some("bottom"), Some("doc"), Some("write")).unwrap());
    assert!(acl.inherits_role("bottom", "base", false).unwrap());
}

/// Tests the wildcard role level and queries without a role.
#[test]
fn test_wildcard_role() {
    let mut acl = profile_acl();
    acl.allow(Targets::ALL, "profile", "view").unwrap();
    acl.add_role("visitor", NO_PARENTS).unwrap();

    assert!(acl.is_allowed(Some("visitor"), Some("profile.password"), Some("view")).unwrap());
    assert!(acl.is_allowed(None, Some("profile"), Some("view")).unwrap());
    assert!(!acl.is_allowed(None, Some("profile"), Some("edit")).unwrap());
}

/// Tests that a named deny disqualifies an all-privileges query.
#[test]
fn test_named_deny_beats_allow_all() {
    let mut acl = profile_acl();
    acl.deny("user", "profile", "delete").unwrap();

    assert!(!acl.is_allowed(Some("user"), Some("profile"), None).unwrap());
    assert!(acl.is_allowed(Some("user"), Some("profile"), Some("edit")).unwrap());
    assert!(!acl.is_allowed(Some("user"), Some("profile"), Some("delete")).unwrap());
}

/// Tests that a built ACL can be shared across threads.
#[test]
fn test_concurrent_reads() {
    let acl = Arc::new(cms_acl());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let acl = Arc::clone(&acl);
            thread::spawn(move || {
                (0..100).all(|_| {
                    acl.is_allowed(Some("editor"), Some("latest"), Some("publish"))
                        .unwrap()
                })
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

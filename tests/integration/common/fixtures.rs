//! Test fixtures for integration tests.

use std::path::PathBuf;

use warden::{Acl, Privileges, Targets};

/// Role list with no parents.
pub const NO_PARENTS: [&str; 0] = [];

/// Path of the application policy shipped with the repository.
pub fn app_policy_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("policies")
        .join("app.toml")
}

/// Profile scenario: `user` may do anything on `profile`, and
/// `profile.password` sits under `profile`.
pub fn profile_acl() -> Acl {
    let mut acl = Acl::new();
    acl.add_role("user", NO_PARENTS).unwrap();
    acl.add_resource("profile", None).unwrap();
    acl.add_resource("profile.password", Some("profile")).unwrap();
    acl.allow("user", "profile", Privileges::ALL).unwrap();
    acl.add_role("admin", ["user"]).unwrap();
    acl
}

/// Content management scenario with multiple inheritance.
///
/// ```text
/// guest <- staff <- editor
///            ^
///            +---- marketing
/// administrator
///
/// newsletter, pricing, news <- { latest, announcement }
/// ```
pub fn cms_acl() -> Acl {
    let mut acl = Acl::new();
    acl.add_role("guest", NO_PARENTS).unwrap();
    acl.add_role("staff", ["guest"]).unwrap();
    acl.add_role("editor", ["staff"]).unwrap();
    acl.add_role("administrator", NO_PARENTS).unwrap();
    acl.add_role("marketing", ["staff"]).unwrap();

    acl.add_resource("newsletter", None).unwrap();
    acl.add_resource("pricing", None).unwrap();
    acl.add_resource("news", None).unwrap();
    acl.add_resource("latest", Some("news")).unwrap();
    acl.add_resource("announcement", Some("news")).unwrap();

    acl.allow("guest", Targets::ALL, "view").unwrap();
    acl.allow("staff", Targets::ALL, ["edit", "submit", "revise"]).unwrap();
    acl.allow("editor", Targets::ALL, ["publish", "archive", "delete"]).unwrap();
    acl.allow("administrator", Targets::ALL, Privileges::ALL).unwrap();

    acl.allow("marketing", ["newsletter", "latest"], ["publish", "archive"])
        .unwrap();
    acl.deny("staff", "latest", "revise").unwrap();
    acl.deny(["guest", "staff", "marketing"], "announcement", "archive")
        .unwrap();
    acl
}

//! Voter decisions over the application policy.

use std::sync::Arc;

use warden::policy::{User, Vote};
use warden::{AclVoter, Policy, StaticPolicy};

use crate::common::app_policy_path;

fn voter() -> AclVoter<StaticPolicy> {
    let policy = Policy::new(StaticPolicy::load(app_policy_path()).unwrap());
    AclVoter::new(Arc::new(policy))
}

/// Tests the decision table.
#[test]
fn test_votes() {
    let voter = voter();
    let user = User::new(["ROLE_USER"]);
    let admin = User::new(["ROLE_ADMIN"]);
    let root = User::new(["ROLE_SUPER_ADMIN"]);

    assert_eq!(voter.vote(&user, "IS_AUTHENTICATED", None).unwrap(), Vote::Abstain);
    assert_eq!(voter.vote(&user, "R_USER_PROFILE", None).unwrap(), Vote::Granted);
    assert_eq!(
        voter.vote(&user, "update", Some("R_USER_CHANGE_OWN_PASSWORD")).unwrap(),
        Vote::Granted
    );
    assert_eq!(voter.vote(&user, "ROLE_ADMIN", None).unwrap(), Vote::Denied);
    assert_eq!(voter.vote(&admin, "ROLE_USER", None).unwrap(), Vote::Granted);
    assert_eq!(voter.vote(&root, "ROLE_ANYTHING", None).unwrap(), Vote::Granted);
}

/// Tests that disabled accounts are denied unless super admin.
#[test]
fn test_inactive_principals() {
    let voter = voter();

    assert_eq!(
        voter.vote(&User::new(["ROLE_ADMIN"]).inactive(), "R_USER_PROFILE", None).unwrap(),
        Vote::Denied
    );
    assert_eq!(
        voter
            .vote(&User::new(["ROLE_SUPER_ADMIN"]).inactive(), "R_USER_PROFILE", None)
            .unwrap(),
        Vote::Granted
    );
}

/// Tests that roles unknown to the policy grant nothing.
#[test]
fn test_foreign_roles_ignored() {
    let voter = voter();
    let user = User::new(["ROLE_PREVIOUS_ADMIN"]);

    assert_eq!(voter.vote(&user, "R_USER_PROFILE", None).unwrap(), Vote::Denied);
    assert_eq!(voter.vote(&user, "ROLE_PREVIOUS_ADMIN", None).unwrap(), Vote::Granted);
}

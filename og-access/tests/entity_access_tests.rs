//! Integration tests for access checks on groups and group content.

mod common;

use std::sync::Arc;

use common::*;
use og_access::OgAccess;
use og_membership::{Account, Entity};

#[test]
fn test_group_content_allowed_through_its_group() {
    let fixture = TestFixture::new();
    let club = fixture.club("1");
    let article = fixture.article("7", OTHER_ID, &[&club]);
    fixture.join(&club, MEMBER_ID, &["view group"]);

    let engine = fixture.engine();
    let mut session = engine.session(member());

    let result = session.user_access_entity("view group", &article, None).unwrap();
    assert!(result.is_allowed());
    assert!(result.cacheability().has_tag("node_list"));

    let outsider = Account::new(9);
    let result = session
        .user_access_entity("view group", &article, Some(&outsider))
        .unwrap();
    assert!(result.is_forbidden());
    assert!(result.cacheability().has_tag("node_list"));
    assert!(result.cacheability().has_tag("og_membership_list"));
}

#[test]
fn test_group_entity_allowed_directly() {
    let fixture = TestFixture::new();
    let club = fixture.club("1");
    fixture.join(&club, MEMBER_ID, &["view group"]);

    let engine = fixture.engine();
    let mut session = engine.session(member());

    let result = session.user_access_entity("view group", &club, None).unwrap();
    assert!(result.is_allowed());
    assert!(!result.cacheability().has_tag("node_list"));
}

#[test]
fn test_denied_group_allowed_as_group_content() {
    let fixture = TestFixture::new();
    fixture.store.add_group_content_bundle(GROUP_TYPE, GROUP_BUNDLE);

    let parent = fixture.club("1");
    let subgroup = fixture.club("2");
    fixture.store.add_group_content(&subgroup, &parent);
    fixture.join(&parent, MEMBER_ID, &["view group"]);

    let engine = fixture.engine();
    let mut session = engine.session(member());

    assert!(session.user_access(&subgroup, "view group", None).unwrap().is_forbidden());

    let result = session.user_access_entity("view group", &subgroup, None).unwrap();
    assert!(result.is_allowed());
    assert!(result.cacheability().has_tag("node_list"));
}

#[test]
fn test_denied_group_without_content_path_is_forbidden() {
    let fixture = TestFixture::new();
    let club = fixture.club("1");

    let engine = fixture.engine();
    let mut session = engine.session(member());

    let result = session.user_access_entity("view group", &club, None).unwrap();
    assert!(result.is_forbidden());
    assert!(result.cacheability().has_tag("og_membership_list"));
    assert!(result.cacheability().has_tag("config:og.settings"));

    // A group that is also group content, but of no group.
    fixture.store.add_group_content_bundle(GROUP_TYPE, GROUP_BUNDLE);
    let result = session.user_access_entity("view group", &club, None).unwrap();
    assert!(result.is_forbidden());
    assert!(result.cacheability().has_tag("node_list"));
}

#[test]
fn test_orphaned_content_is_neutral() {
    let fixture = TestFixture::new();
    let article = fixture.article("7", MEMBER_ID, &[]);

    let engine = fixture.engine();
    let mut session = engine.session(member());

    let result = session.user_access_entity("update", &article, None).unwrap();
    assert!(result.is_neutral());
    assert!(result.cacheability().has_tag("node_list"));
}

#[test]
fn test_unrelated_entity_is_neutral() {
    let fixture = TestFixture::new();
    let engine = fixture.engine();
    let mut session = engine.session(member());

    let term = Entity::new("taxonomy_term", "tags", "1");
    let result = session.user_access_entity("view", &term, None).unwrap();
    assert!(result.is_neutral());
    assert!(!result.cacheability().has_tag("taxonomy_term_list"));
}

#[test]
fn test_any_allowing_group_wins() {
    let fixture = TestFixture::new();
    let denying = fixture.club("1");
    let allowing = fixture.club("2");
    let article = fixture.article("7", OTHER_ID, &[&denying, &allowing]);
    fixture.join(&denying, MEMBER_ID, &["subscribe"]);
    fixture.join(&allowing, MEMBER_ID, &["view group"]);

    let engine = fixture.engine();
    let mut session = engine.session(member());

    assert!(session
        .user_access_entity("view group", &article, None)
        .unwrap()
        .is_allowed());
}

#[test]
fn test_forbidden_collects_every_checked_group() {
    let fixture = TestFixture::new();
    let joined = fixture.club("1");
    let other = fixture.club("2");
    let article = fixture.article("7", OTHER_ID, &[&joined, &other]);
    fixture.join(&joined, MEMBER_ID, &["subscribe"]);

    let engine = fixture.engine();
    let mut session = engine.session(member());

    let result = session.user_access_entity("view group", &article, None).unwrap();
    assert!(result.is_forbidden());
    let cacheability = result.cacheability();
    assert!(cacheability.has_tag("node_list"));
    assert!(cacheability.has_tag("node:7"));
    assert!(cacheability.has_tag("og_role:node-club-member"));
    assert!(cacheability.has_tag("og_membership_list"));
    assert!(cacheability.has_context("user"));
}

#[test]
fn test_entity_operation_permission_allows_content() {
    let fixture = TestFixture::new();
    let club = fixture.club("1");
    let own = fixture.article("7", MEMBER_ID, &[&club]);
    let foreign = fixture.article("8", OTHER_ID, &[&club]);
    fixture.join(&club, MEMBER_ID, &["update own article content"]);

    let engine = fixture.engine();
    let mut session = engine.session(member());

    assert!(session.user_access_entity("update", &own, None).unwrap().is_allowed());
    assert!(session.user_access_entity("update", &foreign, None).unwrap().is_forbidden());
    assert!(session.user_access_entity("delete", &own, None).unwrap().is_forbidden());
}

#[test]
fn test_user_entity_belongs_to_the_users_groups() {
    let fixture = TestFixture::new();
    let club = fixture.club("1");
    fixture.join(&club, OTHER_ID, &[]);
    fixture.join(&club, MEMBER_ID, &["view group"]);

    let engine = fixture.engine();
    let mut session = engine.session(member());

    let result = session
        .user_access_entity("view group", &Entity::user(OTHER_ID), None)
        .unwrap();
    assert!(result.is_allowed());
    assert!(result.cacheability().has_tag("user_list"));

    let loner = session
        .user_access_entity("view group", &Entity::user(42), None)
        .unwrap();
    assert!(loner.is_neutral());
    assert!(loner.cacheability().has_tag("user_list"));
}

#[test]
fn test_non_numeric_user_entity_belongs_to_no_group() {
    let fixture = TestFixture::new();
    let club = fixture.club("1");
    fixture.join(&club, MEMBER_ID, &["view group"]);

    let engine = fixture.engine();
    let mut session = engine.session(member());

    let result = session
        .user_access_entity("view group", &Entity::new("user", "user", "abc"), None)
        .unwrap();
    assert!(result.is_neutral());
    assert!(result.cacheability().has_tag("user_list"));
}

#[test]
fn test_group_lookup_failure_propagates() {
    let fixture = TestFixture::new();
    let article = Entity::new(GROUP_TYPE, CONTENT_BUNDLE, "7");

    let engine = OgAccess::builder()
        .with_group_types(fixture.store.clone())
        .with_memberships(Arc::new(FailingBackend))
        .build()
        .unwrap();
    let mut session = engine.session(member());

    let err = session.user_access_entity("update", &article, None).unwrap_err();
    assert!(err.is_collaborator_error());
    assert_eq!(err.to_string(), "membership manager failed: storage offline");
}

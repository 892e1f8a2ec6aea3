//! Behaviour tests for role-gated page navigation.
//!
//! Each scenario builds a session snapshot, enforces the guard of one page
//! through a recording navigator and checks where the visitor ends up.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

use std::cell::RefCell;

use designdesk::domain::{
    Email, GuardState, Page, PendingRedirect, Role, SessionSnapshot, User, UserId,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

struct GuardWorld {
    snapshot: RefCell<SessionSnapshot>,
    navigator: RefCell<PendingRedirect>,
    outcome: RefCell<Option<GuardState>>,
}

impl GuardWorld {
    fn new() -> Self {
        Self {
            snapshot: RefCell::new(SessionSnapshot::resolved(None)),
            navigator: RefCell::new(PendingRedirect::default()),
            outcome: RefCell::new(None),
        }
    }

    fn outcome(&self) -> GuardState {
        self.outcome.borrow().expect("a page was opened")
    }
}

fn page_named(name: &str) -> Page {
    match name {
        "dashboard" => Page::Dashboard,
        "project list" => Page::ProjectList,
        "new project" => Page::NewProject,
        "project detail" => Page::ProjectDetail,
        "edit project" => Page::EditProject,
        other => panic!("unknown page {other}"),
    }
}

#[fixture]
fn world() -> GuardWorld {
    GuardWorld::new()
}

#[given("an anonymous visitor")]
fn an_anonymous_visitor(world: &GuardWorld) {
    *world.snapshot.borrow_mut() = SessionSnapshot::resolved(None);
}

#[given("a signed-in {role}")]
fn a_signed_in_user(world: &GuardWorld, role: String) {
    let role: Role = role.parse().expect("known role");
    let user = User::new(
        UserId::random(),
        Email::new(format!("{}@studio.io", role.as_str())).expect("valid email"),
        role,
        None,
    );
    *world.snapshot.borrow_mut() = SessionSnapshot::resolved(Some(user));
}

#[given("identity resolution is still running")]
fn identity_resolution_is_still_running(world: &GuardWorld) {
    *world.snapshot.borrow_mut() = SessionSnapshot::resolving();
}

#[when("the visitor opens the {page} page")]
fn the_visitor_opens_the_page(world: &GuardWorld, page: String) {
    let snapshot = world.snapshot.borrow();
    let state = page_named(&page)
        .guard()
        .enforce(&snapshot, &mut *world.navigator.borrow_mut());
    *world.outcome.borrow_mut() = Some(state);
}

#[then("the visitor is redirected to {target}")]
fn the_visitor_is_redirected(world: &GuardWorld, target: String) {
    assert_eq!(world.navigator.borrow().target(), Some(target.as_str()));
    assert_eq!(world.outcome().redirect_target(), Some(target.as_str()));
}

#[then("the page renders")]
fn the_page_renders(world: &GuardWorld) {
    assert_eq!(world.outcome(), GuardState::Authorized);
    assert_eq!(world.navigator.borrow().target(), None);
}

#[then("a loading view is shown")]
fn a_loading_view_is_shown(world: &GuardWorld) {
    assert_eq!(world.outcome(), GuardState::Resolving);
    assert_eq!(world.navigator.borrow().issued(), 0);
}

#[then("exactly {count} redirect is issued")]
fn exactly_count_redirects(world: &GuardWorld, count: usize) {
    assert_eq!(world.navigator.borrow().issued(), count);
}

#[scenario(path = "tests/features/route_guard.feature", index = 0)]
fn anonymous_visitors_go_to_login(world: GuardWorld) {
    drop(world);
}

#[scenario(path = "tests/features/route_guard.feature", index = 1)]
fn designers_cannot_create(world: GuardWorld) {
    drop(world);
}

#[scenario(path = "tests/features/route_guard.feature", index = 2)]
fn clients_can_create(world: GuardWorld) {
    drop(world);
}

#[scenario(path = "tests/features/route_guard.feature", index = 3)]
fn project_managers_can_edit(world: GuardWorld) {
    drop(world);
}

#[scenario(path = "tests/features/route_guard.feature", index = 4)]
fn pages_wait_for_resolution(world: GuardWorld) {
    drop(world);
}

#[scenario(path = "tests/features/route_guard.feature", index = 5)]
fn repeated_checks_redirect_once(world: GuardWorld) {
    drop(world);
}

//! Tests for the project workspace.

use super::*;
use crate::domain::ports::{
    MockProjectRepository, MockUserRepository, ProjectRepositoryError,
};
use crate::domain::{Email, ErrorCode};
use chrono::{DateTime, Local, TimeZone, Utc};
use rstest::rstest;

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 2, 15, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn earlier() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn user(role: Role) -> User {
    User::new(
        UserId::random(),
        Email::new("member@studio.io").expect("valid email"),
        role,
        None,
    )
}

fn project_for(owner: &User) -> Project {
    ProjectDraft::try_from_parts("Poster", "Festival poster", vec![])
        .expect("valid draft")
        .into_project(owner.id().clone(), earlier())
}

fn workspace(
    identity: Option<User>,
    projects: MockProjectRepository,
    users: MockUserRepository,
) -> ProjectWorkspace {
    ProjectWorkspace::new(
        identity,
        Arc::new(projects),
        Arc::new(users),
        Arc::new(FixtureClock { utc_now: now() }),
    )
}

fn repo_finding(project: Project) -> MockProjectRepository {
    let mut repo = MockProjectRepository::new();
    repo.expect_find()
        .returning(move |_| Ok(Some(project.clone())));
    repo
}

#[rstest]
#[case(Role::Client)]
#[case(Role::Designer)]
#[case(Role::ProjectManager)]
#[tokio::test]
async fn list_queries_the_role_scope(#[case] role: Role) {
    let identity = user(role);
    let expected = ProjectScope::for_user(&identity);
    let mut repo = MockProjectRepository::new();
    repo.expect_list()
        .withf(move |scope| *scope == expected)
        .times(1)
        .returning(|_| Ok(Vec::new()));
    let mut ws = workspace(Some(identity), repo, MockUserRepository::new());

    ws.list().await.expect("list succeeds");
}

#[tokio::test]
async fn anonymous_list_is_empty_without_querying() {
    let mut repo = MockProjectRepository::new();
    repo.expect_list().never();
    let mut ws = workspace(None, repo, MockUserRepository::new());

    assert!(ws.list().await.expect("empty list").is_empty());
}

#[tokio::test]
async fn list_failure_records_error_and_keeps_cache() {
    let client = user(Role::Client);
    let existing = project_for(&client);
    let mut repo = MockProjectRepository::new();
    let mut calls = 0;
    let first = existing.clone();
    repo.expect_list().returning(move |_| {
        calls += 1;
        if calls == 1 {
            Ok(vec![first.clone()])
        } else {
            Err(ProjectRepositoryError::connection("refused"))
        }
    });
    let mut ws = workspace(Some(client), repo, MockUserRepository::new());
    ws.list().await.expect("first list succeeds");

    let err = ws.list().await.expect_err("second list fails");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(ws.projects(), [existing].as_slice());
    assert!(ws.last_error().is_some_and(|msg| msg.contains("refused")));
}

#[tokio::test]
async fn create_requires_identity() {
    let mut repo = MockProjectRepository::new();
    repo.expect_insert().never();
    let mut ws = workspace(None, repo, MockUserRepository::new());
    let draft = ProjectDraft::try_from_parts("Logo", "Mark", vec![]).expect("valid draft");

    let err = ws.create(draft).await.expect_err("anonymous create");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn designers_cannot_create() {
    let mut repo = MockProjectRepository::new();
    repo.expect_insert().never();
    let mut ws = workspace(Some(user(Role::Designer)), repo, MockUserRepository::new());
    let draft = ProjectDraft::try_from_parts("Logo", "Mark", vec![]).expect("valid draft");

    let err = ws.create(draft).await.expect_err("designer create");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn create_appends_pending_project_owned_by_caller() {
    let client = user(Role::Client);
    let mut repo = MockProjectRepository::new();
    repo.expect_insert()
        .times(1)
        .returning(|project| Ok(project.clone()));
    let mut ws = workspace(Some(client.clone()), repo, MockUserRepository::new());
    let draft = ProjectDraft::try_from_parts("Logo", "Mark", vec![]).expect("valid draft");

    let created = ws.create(draft).await.expect("create succeeds");

    assert_eq!(created.status, ProjectStatus::Pending);
    assert_eq!(&created.client_id, client.id());
    assert_eq!(created.created_at, now());
    assert_eq!(ws.projects(), [created].as_slice());
}

#[tokio::test]
async fn failed_create_leaves_cache_untouched() {
    let mut repo = MockProjectRepository::new();
    repo.expect_insert()
        .returning(|_| Err(ProjectRepositoryError::query("constraint violated")));
    let mut ws = workspace(Some(user(Role::Client)), repo, MockUserRepository::new());
    let draft = ProjectDraft::try_from_parts("Logo", "Mark", vec![]).expect("valid draft");

    ws.create(draft).await.expect_err("insert fails");

    assert!(ws.projects().is_empty());
    assert!(ws.last_error().is_some());
}

#[tokio::test]
async fn owner_update_merges_patch_into_cache() {
    let client = user(Role::Client);
    let project = project_for(&client);
    let mut repo = repo_finding(project.clone());
    let listed = project.clone();
    repo.expect_list().returning(move |_| Ok(vec![listed.clone()]));
    repo.expect_update()
        .withf(|_, patch| patch.updated_at.is_some())
        .times(1)
        .returning(|_, _| Ok(()));
    let mut ws = workspace(Some(client), repo, MockUserRepository::new());
    ws.list().await.expect("list");
    let patch = ProjectPatch::content(None, Some("Poster and flyers"), None).expect("valid patch");

    let updated = ws.update(&project.id, patch).await.expect("update succeeds");

    let cached = ws.projects().first().expect("cached project");
    assert_eq!(cached, &updated);
    assert_eq!(cached.description.as_ref(), "Poster and flyers");
    assert_eq!(cached.title, project.title);
    assert_eq!(cached.status, project.status);
    assert_eq!(cached.updated_at, now());
}

#[tokio::test]
async fn clients_cannot_edit_projects_they_do_not_own() {
    let owner = user(Role::Client);
    let mut repo = repo_finding(project_for(&owner));
    repo.expect_update().never();
    let mut ws = workspace(Some(user(Role::Client)), repo, MockUserRepository::new());
    let patch = ProjectPatch::content(Some("Mine now"), None, None).expect("valid patch");

    let err = ws
        .update(&ProjectId::random(), patch)
        .await
        .expect_err("foreign project");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn backward_status_patch_is_rejected() {
    let client = user(Role::Client);
    let mut project = project_for(&client);
    project.status = ProjectStatus::Completed;
    let mut repo = repo_finding(project.clone());
    repo.expect_update().never();
    let mut ws = workspace(Some(user(Role::ProjectManager)), repo, MockUserRepository::new());
    let patch = ProjectPatch {
        status: Some(ProjectStatus::InProgress),
        ..ProjectPatch::default()
    };

    let err = ws.update(&project.id, patch).await.expect_err("backward");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn delete_is_reserved_to_managers() {
    let client = user(Role::Client);
    let mut repo = repo_finding(project_for(&client));
    repo.expect_delete().never();
    let mut ws = workspace(Some(client), repo, MockUserRepository::new());

    let err = ws.delete(&ProjectId::random()).await.expect_err("client delete");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn delete_removes_from_cache() {
    let project = project_for(&user(Role::Client));
    let mut repo = repo_finding(project.clone());
    let listed = project.clone();
    repo.expect_list().returning(move |_| Ok(vec![listed.clone()]));
    repo.expect_delete().times(1).returning(|_| Ok(()));
    let mut ws = workspace(Some(user(Role::ProjectManager)), repo, MockUserRepository::new());
    ws.list().await.expect("list");

    ws.delete(&project.id).await.expect("delete succeeds");

    assert!(ws.projects().is_empty());
}

#[tokio::test]
async fn assignment_moves_project_in_progress() {
    let project = project_for(&user(Role::Client));
    let designer = user(Role::Designer);
    let mut repo = repo_finding(project.clone());
    repo.expect_update().times(1).returning(|_, _| Ok(()));
    let mut users = MockUserRepository::new();
    let record = designer.clone();
    users
        .expect_find_by_id()
        .returning(move |_| Ok(Some(record.clone())));
    let mut ws = workspace(Some(user(Role::ProjectManager)), repo, users);

    let assigned = ws
        .assign_designer(&project.id, designer.id())
        .await
        .expect("assignment succeeds");

    assert_eq!(assigned.status, ProjectStatus::InProgress);
    assert_eq!(assigned.designer_id.as_ref(), Some(designer.id()));
}

#[tokio::test]
async fn assignment_requires_a_designer() {
    let project = project_for(&user(Role::Client));
    let other_client = user(Role::Client);
    let mut repo = repo_finding(project.clone());
    repo.expect_update().never();
    let mut users = MockUserRepository::new();
    let record = other_client.clone();
    users
        .expect_find_by_id()
        .returning(move |_| Ok(Some(record.clone())));
    let mut ws = workspace(Some(user(Role::ProjectManager)), repo, users);

    let err = ws
        .assign_designer(&project.id, other_client.id())
        .await
        .expect_err("not a designer");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn completed_projects_cannot_be_reassigned() {
    let mut project = project_for(&user(Role::Client));
    project.status = ProjectStatus::Completed;
    let repo = repo_finding(project.clone());
    let mut ws = workspace(
        Some(user(Role::ProjectManager)),
        repo,
        MockUserRepository::new(),
    );

    let err = ws
        .assign_designer(&project.id, &UserId::random())
        .await
        .expect_err("completed");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn only_the_assigned_designer_completes() {
    let designer = user(Role::Designer);
    let mut project = project_for(&user(Role::Client));
    project.status = ProjectStatus::InProgress;
    project.designer_id = Some(designer.id().clone());
    let mut repo = repo_finding(project.clone());
    repo.expect_update().times(1).returning(|_, _| Ok(()));
    let mut ws = workspace(Some(designer), repo, MockUserRepository::new());

    let completed = ws.mark_completed(&project.id).await.expect("completion succeeds");

    assert_eq!(completed.status, ProjectStatus::Completed);
}

#[tokio::test]
async fn unassigned_designers_do_not_see_the_project() {
    let mut project = project_for(&user(Role::Client));
    project.status = ProjectStatus::InProgress;
    project.designer_id = Some(UserId::random());
    let repo = repo_finding(project.clone());
    let mut ws = workspace(Some(user(Role::Designer)), repo, MockUserRepository::new());

    let err = ws.mark_completed(&project.id).await.expect_err("not assigned");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn summary_reflects_the_cache() {
    let client = user(Role::Client);
    let mut started = project_for(&client);
    started.status = ProjectStatus::InProgress;
    let listed = vec![project_for(&client), started];
    let mut repo = MockProjectRepository::new();
    repo.expect_list().returning(move |_| Ok(listed.clone()));
    let mut ws = workspace(Some(client), repo, MockUserRepository::new());
    ws.list().await.expect("list");

    let summary = ws.summary();

    assert_eq!(summary.pending, 1);
    assert_eq!(summary.in_progress, 1);
    assert_eq!(summary.total, 2);
}

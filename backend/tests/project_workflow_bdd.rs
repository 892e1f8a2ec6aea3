//! Behaviour tests for the project status workflow.
//!
//! Scenarios drive [`ProjectWorkspace`] instances for each role against the
//! shared in-memory adapters, so every role observes the same store.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

use std::cell::RefCell;
use std::sync::Arc;

use designdesk::domain::ports::{ProjectRepository, UserRepository};
use designdesk::domain::{
    Email, Error, ErrorCode, FullName, ProjectDraft, ProjectId, ProjectStatus, ProjectWorkspace,
    Role, User, UserId,
};
use designdesk::outbound::memory::{MemoryProjectRepository, MemoryUserRepository};
use mockable::DefaultClock;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tokio::runtime::Runtime;

struct Cast {
    client: User,
    designer: User,
    manager: User,
}

struct WorkflowWorld {
    runtime: Runtime,
    projects: Arc<MemoryProjectRepository>,
    users: RefCell<Option<Arc<MemoryUserRepository>>>,
    cast: RefCell<Option<Cast>>,
    project: RefCell<Option<ProjectId>>,
    last_error: RefCell<Option<Error>>,
}

fn person(email: &str, role: Role, name: &str) -> User {
    User::new(
        UserId::random(),
        Email::new(email).expect("valid email"),
        role,
        Some(FullName::new(name).expect("valid name")),
    )
}

impl WorkflowWorld {
    fn new() -> Self {
        Self {
            runtime: tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("test runtime"),
            projects: Arc::new(MemoryProjectRepository::default()),
            users: RefCell::new(None),
            cast: RefCell::new(None),
            project: RefCell::new(None),
            last_error: RefCell::new(None),
        }
    }

    fn workspace(&self, pick: impl FnOnce(&Cast) -> &User) -> ProjectWorkspace {
        let cast = self.cast.borrow();
        let identity = pick(cast.as_ref().expect("cast is set up")).clone();
        let users: Arc<dyn UserRepository> =
            self.users.borrow().clone().expect("users are registered");
        let projects: Arc<dyn ProjectRepository> = self.projects.clone();
        ProjectWorkspace::new(Some(identity), projects, users, Arc::new(DefaultClock))
    }

    fn project_id(&self) -> ProjectId {
        self.project.borrow().clone().expect("a project was created")
    }

    fn designer_id(&self) -> UserId {
        self.cast
            .borrow()
            .as_ref()
            .expect("cast is set up")
            .designer
            .id()
            .clone()
    }

    fn record<T>(&self, result: Result<T, Error>) -> Option<T> {
        match result {
            Ok(value) => {
                *self.last_error.borrow_mut() = None;
                Some(value)
            }
            Err(error) => {
                *self.last_error.borrow_mut() = Some(error);
                None
            }
        }
    }
}

#[fixture]
fn world() -> WorkflowWorld {
    WorkflowWorld::new()
}

#[given("a client, a designer and a project manager")]
fn a_client_designer_and_manager(world: &WorkflowWorld) {
    let cast = Cast {
        client: person("ana@studio.io", Role::Client, "Ana Torres"),
        designer: person("dee@studio.io", Role::Designer, "Dee Park"),
        manager: person("pat@studio.io", Role::ProjectManager, "Pat Lee"),
    };
    let users = MemoryUserRepository::with_users([
        cast.client.clone(),
        cast.designer.clone(),
        cast.manager.clone(),
    ]);
    *world.users.borrow_mut() = Some(Arc::new(users));
    *world.cast.borrow_mut() = Some(cast);
}

#[when("the client creates a project titled {title}")]
fn the_client_creates_a_project(world: &WorkflowWorld, title: String) {
    let draft = ProjectDraft::try_from_parts(&title, "Scope agreed in kickoff", Vec::new())
        .expect("valid draft");
    let mut workspace = world.workspace(|cast| &cast.client);
    let created = world.runtime.block_on(workspace.create(draft));
    let project = world.record(created).expect("client can create projects");
    assert_eq!(project.status, ProjectStatus::Pending);
    *world.project.borrow_mut() = Some(project.id);
}

#[when("the project manager assigns the designer")]
fn the_manager_assigns_the_designer(world: &WorkflowWorld) {
    let id = world.project_id();
    let designer = world.designer_id();
    let mut workspace = world.workspace(|cast| &cast.manager);
    let result = world
        .runtime
        .block_on(workspace.assign_designer(&id, &designer));
    world.record(result);
}

#[when("the designer marks the project completed")]
fn the_designer_completes_the_project(world: &WorkflowWorld) {
    let id = world.project_id();
    let mut workspace = world.workspace(|cast| &cast.designer);
    let result = world.runtime.block_on(workspace.mark_completed(&id));
    world.record(result);
}

#[then("the project status is {status}")]
fn the_project_status_is(world: &WorkflowWorld, status: String) {
    let id = world.project_id();
    let mut workspace = world.workspace(|cast| &cast.manager);
    let project = world
        .runtime
        .block_on(workspace.get(&id))
        .expect("project is visible to managers");
    assert_eq!(project.status.as_str(), status);
}

#[then("the project manager sees {completed} completed of {total} projects")]
fn the_manager_sees_summary(world: &WorkflowWorld, completed: usize, total: usize) {
    let mut workspace = world.workspace(|cast| &cast.manager);
    world
        .runtime
        .block_on(workspace.list())
        .expect("managers list every project");
    let summary = workspace.summary();
    assert_eq!(summary.completed, completed);
    assert_eq!(summary.total, total);
}

#[then("the designer sees {count} projects")]
fn the_designer_sees(world: &WorkflowWorld, count: usize) {
    let mut workspace = world.workspace(|cast| &cast.designer);
    let listed = world
        .runtime
        .block_on(workspace.list())
        .expect("designers list assigned projects")
        .len();
    assert_eq!(listed, count);
}

#[then("the last action fails with {code}")]
fn the_last_action_fails(world: &WorkflowWorld, code: String) {
    let error = world.last_error.borrow();
    let error = error.as_ref().expect("the last action failed");
    let expected = match code.as_str() {
        "conflict" => ErrorCode::Conflict,
        "forbidden" => ErrorCode::Forbidden,
        other => panic!("unexpected code {other}"),
    };
    assert_eq!(error.code(), expected);
}

#[scenario(path = "tests/features/project_workflow.feature", index = 0)]
fn project_moves_to_completed(world: WorkflowWorld) {
    drop(world);
}

#[scenario(path = "tests/features/project_workflow.feature", index = 1)]
fn designers_see_assigned_projects(world: WorkflowWorld) {
    drop(world);
}

#[scenario(path = "tests/features/project_workflow.feature", index = 2)]
fn completed_projects_stay_completed(world: WorkflowWorld) {
    drop(world);
}

//! Route guard for page views.
//!
//! The guard is level-triggered: every evaluation recomputes the state from
//! the current [`SessionSnapshot`]. Redirects are issued through a
//! [`Navigator`], whose `navigate` must be idempotent.

use super::{Role, SessionSnapshot};

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/login";
/// Where authenticated users without the required role are sent.
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Outcome of evaluating a guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// Identity resolution is still running; render a loading view.
    Resolving,
    /// No identity; redirect to the login page.
    Unauthenticated,
    /// Identity present but its role is not allowed.
    Unauthorized,
    /// Render the page.
    Authorized,
}

impl GuardState {
    /// Redirect target for this state, if any.
    pub fn redirect_target(self) -> Option<&'static str> {
        match self {
            Self::Unauthenticated => Some(LOGIN_PATH),
            Self::Unauthorized => Some(DASHBOARD_PATH),
            Self::Resolving | Self::Authorized => None,
        }
    }
}

/// Receives redirect requests from the guard.
pub trait Navigator {
    /// Request navigation to `target`. Repeating the pending target is a
    /// no-op.
    fn navigate(&mut self, target: &str);
}

/// Navigator that records the single pending redirect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingRedirect {
    target: Option<String>,
    issued: usize,
}

impl PendingRedirect {
    /// Latest redirect requested, if any.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Number of distinct navigations issued.
    pub fn issued(&self) -> usize {
        self.issued
    }
}

impl Navigator for PendingRedirect {
    fn navigate(&mut self, target: &str) {
        if self.target.as_deref() == Some(target) {
            return;
        }
        self.target = Some(target.to_owned());
        self.issued += 1;
    }
}

/// Access rule for a page.
///
/// # Examples
/// ```
/// use designdesk::domain::{GuardState, Role, RouteGuard, SessionSnapshot};
///
/// let guard = RouteGuard::allowing(&[Role::Client, Role::ProjectManager]);
/// assert_eq!(guard.evaluate(&SessionSnapshot::resolved(None)), GuardState::Unauthenticated);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteGuard {
    allowed_roles: Option<&'static [Role]>,
}

impl RouteGuard {
    /// Guard admitting any authenticated user.
    pub const fn any_authenticated() -> Self {
        Self {
            allowed_roles: None,
        }
    }

    /// Guard admitting only the listed roles.
    pub const fn allowing(roles: &'static [Role]) -> Self {
        Self {
            allowed_roles: Some(roles),
        }
    }

    /// Roles admitted; `None` admits every authenticated user.
    pub fn allowed_roles(&self) -> Option<&'static [Role]> {
        self.allowed_roles
    }

    /// Recompute the guard state from `snapshot`. Resolution in progress
    /// wins over every other state, then a missing identity, then the role
    /// check.
    pub fn evaluate(&self, snapshot: &SessionSnapshot) -> GuardState {
        if snapshot.loading {
            return GuardState::Resolving;
        }
        let Some(role) = snapshot.role() else {
            return GuardState::Unauthenticated;
        };
        match self.allowed_roles {
            Some(allowed) if !allowed.contains(&role) => GuardState::Unauthorized,
            _ => GuardState::Authorized,
        }
    }

    /// Evaluate and issue any redirect through `navigator`.
    pub fn enforce(&self, snapshot: &SessionSnapshot, navigator: &mut impl Navigator) -> GuardState {
        let state = self.evaluate(snapshot);
        if let Some(target) = state.redirect_target() {
            navigator.navigate(target);
        }
        state
    }
}

/// Guarded dashboard pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Landing page with the status summary.
    Dashboard,
    /// Role-scoped project list.
    ProjectList,
    /// Creation form.
    NewProject,
    /// Single project view.
    ProjectDetail,
    /// Edit form.
    EditProject,
}

const CREATORS: &[Role] = &[Role::Client, Role::ProjectManager];
const EDITORS: &[Role] = &[Role::ProjectManager, Role::Client];

impl Page {
    /// Route pattern served for the page.
    pub fn path(self) -> &'static str {
        match self {
            Self::Dashboard => "/dashboard",
            Self::ProjectList => "/dashboard/projects",
            Self::NewProject => "/dashboard/projects/new",
            Self::ProjectDetail => "/dashboard/projects/{id}",
            Self::EditProject => "/dashboard/projects/{id}/edit",
        }
    }

    /// Access rule protecting the page.
    pub fn guard(self) -> RouteGuard {
        match self {
            Self::Dashboard | Self::ProjectList | Self::ProjectDetail => {
                RouteGuard::any_authenticated()
            }
            Self::NewProject => RouteGuard::allowing(CREATORS),
            Self::EditProject => RouteGuard::allowing(EDITORS),
        }
    }
}

/// Redirect for the login page: authenticated visitors go to the dashboard.
pub fn login_redirect(snapshot: &SessionSnapshot) -> Option<&'static str> {
    match (snapshot.loading, &snapshot.identity) {
        (false, Some(_)) => Some(DASHBOARD_PATH),
        _ => None,
    }
}

//! Message catalogue for page views.
//!
//! Keys are typed; lookups through a dotted string fail closed by returning
//! the key itself.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ProjectStatus;

/// Supported interface languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Spanish; the default.
    #[default]
    Es,
    /// English.
    En,
}

impl Locale {
    /// Language tag used in URLs and payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }

    /// Pick the first supported language from an `Accept-Language` value.
    ///
    /// # Examples
    /// ```
    /// use designdesk::domain::Locale;
    ///
    /// assert_eq!(Locale::negotiate(Some("en-GB,en;q=0.9")), Locale::En);
    /// assert_eq!(Locale::negotiate(Some("fr")), Locale::Es);
    /// ```
    pub fn negotiate(accept_language: Option<&str>) -> Self {
        accept_language
            .into_iter()
            .flat_map(|header| header.split(','))
            .filter_map(|part| part.split(';').next())
            .filter_map(|tag| tag.trim().split('-').next())
            .find_map(|primary| primary.to_ascii_lowercase().parse().ok())
            .unwrap_or_default()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown locale code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale: {0}")]
pub struct UnsupportedLocale(pub String);

impl FromStr for Locale {
    type Err = UnsupportedLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "es" => Ok(Self::Es),
            "en" => Ok(Self::En),
            other => Err(UnsupportedLocale(other.to_owned())),
        }
    }
}

macro_rules! message_keys {
    ($( $variant:ident => $key:literal, es: $es:literal, en: $en:literal; )*) => {
        /// Typed message key.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum MessageKey {
            $( $variant, )*
        }

        impl MessageKey {
            /// Every key in declaration order.
            pub const ALL: &'static [MessageKey] = &[$( MessageKey::$variant, )*];

            /// Dotted key string.
            pub fn as_key(self) -> &'static str {
                match self {
                    $( Self::$variant => $key, )*
                }
            }

            fn text(self, locale: Locale) -> Option<&'static str> {
                let text = match (self, locale) {
                    $(
                        (Self::$variant, Locale::Es) => $es,
                        (Self::$variant, Locale::En) => $en,
                    )*
                };
                (!text.is_empty()).then_some(text)
            }
        }
    };
}

message_keys! {
    CommonLoading => "common.loading", es: "Cargando...", en: "Loading...";
    CommonError => "common.error", es: "Error", en: "Error";
    CommonAppName => "common.designManager", es: "Gestor de Diseño", en: "Design Manager";
    NavDashboard => "navbar.dashboard", es: "Panel", en: "Dashboard";
    NavProjects => "navbar.projects", es: "Proyectos", en: "Projects";
    NavNewProject => "navbar.newProject", es: "Nuevo proyecto", en: "New project";
    AuthSignIn => "auth.signInToAccount", es: "Inicia sesión en tu cuenta", en: "Sign in to your account";
    AuthRegister => "auth.createNewAccount", es: "Crea una cuenta nueva", en: "Create a new account";
    RoleClient => "auth.client", es: "Cliente", en: "Client";
    RoleDesigner => "auth.designer", es: "Diseñador", en: "Designer";
    RoleProjectManager => "auth.projectManager", es: "Gestor de proyectos", en: "Project manager";
    DashboardWelcome => "dashboard.welcome", es: "Bienvenido", en: "Welcome";
    DashboardTotal => "dashboard.totalProjects", es: "Proyectos totales", en: "Total projects";
    DashboardActive => "dashboard.activeProjects", es: "Proyectos activos", en: "Active projects";
    DashboardDelivered => "dashboard.deliveredProjects", es: "Proyectos entregados", en: "Delivered projects";
    ProjectsHeading => "projects.title", es: "Título", en: "Title";
    ProjectsCreate => "projects.createNewProject", es: "Crear nuevo proyecto", en: "Create new project";
    ProjectsUpdate => "projects.updateProject", es: "Actualizar proyecto", en: "Update project";
    ProjectsEmpty => "projects.noProjects", es: "No hay proyectos", en: "No projects yet";
    ProjectsStart => "projects.startCreating", es: "Empieza creando tu primer proyecto", en: "Start by creating your first project";
    ProjectsDeleted => "projects.deleted", es: "Proyecto eliminado", en: "Project deleted";
    ProjectsDeleteError => "projects.deleteError", es: "No se pudo eliminar el proyecto", en: "Could not delete the project";
    StatusPending => "statuses.pending", es: "Pendiente", en: "Pending";
    StatusInProgress => "statuses.in_progress", es: "En progreso", en: "In progress";
    StatusCompleted => "statuses.completed", es: "Completado", en: "Completed";
    ErrorNotAuthenticated => "errors.userNotAuthenticated", es: "Usuario no autenticado", en: "User not authenticated";
    ErrorTitleRequired => "errors.titleRequired", es: "El título es obligatorio", en: "Title is required";
    ErrorDescriptionRequired => "errors.descriptionRequired", es: "La descripción es obligatoria", en: "Description is required";
    LanguageEs => "language.es", es: "Español", en: "Spanish";
    LanguageEn => "language.en", es: "Inglés", en: "English";
}

impl From<ProjectStatus> for MessageKey {
    fn from(value: ProjectStatus) -> Self {
        match value {
            ProjectStatus::Pending => Self::StatusPending,
            ProjectStatus::InProgress => Self::StatusInProgress,
            ProjectStatus::Completed => Self::StatusCompleted,
        }
    }
}

/// Translate `key`, falling back to its dotted form.
///
/// # Examples
/// ```
/// use designdesk::domain::{Locale, MessageKey, translate};
///
/// assert_eq!(translate(Locale::En, MessageKey::StatusPending), "Pending");
/// ```
pub fn translate(locale: Locale, key: MessageKey) -> &'static str {
    key.text(locale).unwrap_or_else(|| key.as_key())
}

/// Translate a dotted key string; unknown keys come back unchanged.
pub fn translate_dotted(locale: Locale, dotted: &str) -> String {
    MessageKey::ALL
        .iter()
        .find(|key| key.as_key() == dotted)
        .map_or_else(|| dotted.to_owned(), |key| translate(locale, *key).to_owned())
}

/// Full table for one locale, keyed by dotted key.
pub fn catalogue(locale: Locale) -> BTreeMap<&'static str, &'static str> {
    MessageKey::ALL
        .iter()
        .map(|key| (key.as_key(), translate(locale, *key)))
        .collect()
}

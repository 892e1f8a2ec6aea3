//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use designdesk::Trace;
#[cfg(debug_assertions)]
use designdesk::doc::ApiDoc;
use designdesk::domain::MAX_FILE_BYTES;
use designdesk::inbound::http::files::{file_options, get_file, store_file};
use designdesk::inbound::http::health::{HealthState, live, ready};
use designdesk::inbound::http::pages;
use designdesk::inbound::http::session_config::SessionSettings;
use designdesk::inbound::http::projects::{
    assign_designer, complete_project, create_project, dashboard, delete_project, get_project,
    list_projects, update_project, upload_project_file,
};
use designdesk::inbound::http::state::HttpState;
use designdesk::inbound::http::translations::get_translations;
use designdesk::inbound::http::users::{current_user, list_designers, login, logout, register};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    session: SessionSettings,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        session,
    } = deps;

    let api = web::scope("/api/v1")
        .service(register)
        .service(login)
        .service(logout)
        .service(current_user)
        .service(list_designers)
        .service(list_projects)
        .service(create_project)
        .service(get_project)
        .service(update_project)
        .service(delete_project)
        .service(assign_designer)
        .service(complete_project)
        .service(upload_project_file)
        .service(dashboard)
        .service(get_translations);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(web::PayloadConfig::new(MAX_FILE_BYTES))
        .wrap(session.middleware())
        .wrap(Trace)
        .service(api)
        .service(file_options)
        .service(get_file)
        .service(store_file)
        .configure(pages::configure)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when the adapters cannot be built or the
/// socket cannot be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config)?;
    let session = config.session.clone();
    let bind_addr = config.bind_addr();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            session: session.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

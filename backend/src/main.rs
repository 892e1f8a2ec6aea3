//! DesignDesk entry-point: loads settings, wires adapters and serves HTTP.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use designdesk::config::{BackendKind, ServerSettings};
use designdesk::inbound::http::health::HealthState;
use designdesk::inbound::http::session_config::{BuildMode, session_settings_from_env};
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .map_err(|e| eyre!("failed to load settings: {e}"))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    let bind_addr = settings.bind_addr()?;

    let config = ServerConfig::new(session, bind_addr).with_bucket(settings.storage_bucket());
    let config = match settings.backend()? {
        BackendKind::Memory => {
            warn!("in-memory backend selected; data is lost on restart");
            config
        }
        BackendKind::Supabase => config.with_supabase(settings.supabase_config()?),
    };

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config).wrap_err("failed to start server")?;
    info!(%bind_addr, "listening");

    let result = server.await;
    health_state.mark_unhealthy();
    result.wrap_err("server terminated with an error")
}

use crate::probe::{ProbeConfig, STARTUP_DELAY};
use crate::state::AppState;
use tracing::info;

mod config;
mod probe;
mod state;
mod webserver;

#[cfg(target_env = "musl")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    info!("Starting color-api {}", env!("CARGO_PKG_VERSION"));

    let config = config::load_config_from_env()?;
    let enable_probes = config.feature_flags.enable_probes;

    let probes = ProbeConfig::from_env(enable_probes);

    let hostname = state::resolve_hostname();
    info!("Serving color {} from host {}", config.color, hostname);

    let startup_delay = probes.delay_startup.then_some(STARTUP_DELAY);
    let state = AppState::new(config.color, hostname, probes);
    let app = webserver::create_app(state, enable_probes);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.webserver.port));
    webserver::serve(addr, app, startup_delay).await?;

    Ok(())
}

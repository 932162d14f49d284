use std::path::PathBuf;
use std::sync::Arc;

use logalert::Result;
use logalert::api::{AppState, build_router, serve};
use logalert::config::Config;
use logalert::error::{ConfigError, Error};
use logalert::telemetry::init_tracing;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::cli::Cli;

const DEFAULT_CONFIG: &str = "config.toml";

pub async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.log_filter.as_deref(), cli.json_logs)?;

    // Un chemin explicite doit exister; le défaut peut manquer (ENV seul).
    let config_path = match cli.config {
        Some(path) => {
            std::fs::metadata(&path).map_err(|source| ConfigError::FileRead {
                path: path.clone(),
                source,
            })?;
            path
        }
        None => PathBuf::from(DEFAULT_CONFIG),
    };
    let mut config = Config::from_env_and_file(&config_path)?;
    if let Some(listen) = cli.listen {
        config.listen = listen;
    }
    if cli.insecure {
        warn!("--insecure: plain-HTTP Zabbix URL and unverified TLS allowed");
    }

    let state = Arc::new(AppState::from_config(&config, cli.insecure)?);
    info!(
        zabbix = %config.zabbix.url,
        search = %config.search.endpoint(),
        host_group = %config.zabbix.host_group_id,
        "logalert starting"
    );

    let listener = TcpListener::bind(config.listen)
        .await
        .map_err(|source| Error::Server { source })?;
    serve(listener, build_router(state)).await?;
    info!("logalert stopped");
    Ok(())
}

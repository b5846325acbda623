use std::{io::ErrorKind, net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use silvia_common::PanelConfig;

use crate::{client::HttpDeviceClient, panel::Panel, server};

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config_path = std::env::var("SILVIA_PANEL_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./.silvia/panel.json"));
    let mut config = load_config(&config_path).await.unwrap_or_else(|err| {
        warn!("failed to load panel config from {}: {err:#}", config_path.display());
        PanelConfig::default()
    });
    apply_env_overrides(&mut config);
    config.sanitize();

    let client = HttpDeviceClient::new(config.device_url.clone())
        .context("failed to build device http client")?;
    let panel = Panel::new(Arc::new(client), &config);
    info!("talking to device at {}", config.device_url);
    panel.start().await;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind panel server at {addr}"))?;

    info!("panel listening on http://{addr}");
    axum::serve(listener, server::router(panel.clone()))
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("ctrl-c handler failed: {err}");
            }
        })
        .await?;

    panel.shutdown().await;
    Ok(())
}

async fn load_config(path: &PathBuf) -> anyhow::Result<PanelConfig> {
    match tokio::fs::read(path).await {
        Ok(raw) => Ok(serde_json::from_slice::<PanelConfig>(&raw)?),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(PanelConfig::default()),
        Err(err) => Err(err.into()),
    }
}

fn apply_env_overrides(config: &mut PanelConfig) {
    if let Ok(url) = std::env::var("DEVICE_URL") {
        config.device_url = url;
    }
    if let Some(port) = std::env::var("PANEL_HTTP_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
    {
        config.http_port = port;
    }
}

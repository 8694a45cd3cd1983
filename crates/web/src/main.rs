use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bridge_web::capability::LocalCapabilities;
use bridge_web::config::BridgeConfig;
use bridge_web::dispatcher::Dispatcher;
use bridge_web::server::Server;
use bridge_web::shutdown::wait_for_exit;
use bridge_web::static_files::StaticFiles;
use bridge_web::{api, tls};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Serves a local web page and gives it access to the filesystem, dialogs and processes.
#[derive(Debug, Parser)]
#[command(name = "local-bridge", version)]
struct Cli {
    /// Page to open; its directory becomes the served root.
    page: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    host: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,

    /// Don't open the browser at startup.
    #[arg(long)]
    no_browser: bool,
}

impl Cli {
    fn into_config(self) -> Result<BridgeConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::load(path)?,
            None => BridgeConfig::default(),
        };

        if let Some(page) = &self.page {
            config = config.with_page(page);
        }
        if let Some(host) = self.host {
            config.listener.host = host;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if self.no_browser {
            config.site.open_browser = false;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Cli::parse().into_config()?;
    let root = config.site.root_dir.canonicalize()?;
    info!(root = %root.display(), "serving site");

    let tls_acceptor = match tls::load_acceptor(&config.tls.cert_path, &config.tls.key_path) {
        Ok(acceptor) => Some(acceptor),
        Err(e) => {
            warn!(cause = %e, "tls disabled, serving plain http");
            None
        }
    };

    let exit = CancellationToken::new();
    let dispatcher = Dispatcher::new(
        api::route_table()?,
        Arc::new(LocalCapabilities::new(&root, exit.clone())),
        StaticFiles::new(&root),
        config.site.client_script.clone(),
    );

    let server = Server::bind(&config.listener.host, config.listener.port, tls_acceptor, dispatcher).await?;
    let entry_url = config.entry_url(server.is_tls());
    let server_task = tokio::spawn(server.run(exit.clone()));

    if config.site.open_browser {
        info!(url = %entry_url, "opening browser");
        if let Err(e) = open::that(&entry_url) {
            warn!(cause = %e, url = %entry_url, "can't open browser");
        }
    } else {
        info!(url = %entry_url, "ready");
    }

    let reason = wait_for_exit(&exit, Duration::from_millis(config.shutdown.poll_interval_ms)).await;
    info!(?reason, "shutting down");

    if let Err(e) = server_task.await {
        warn!(cause = %e, "server task failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_before_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.toml");
        std::fs::write(&path, "[listener]\nport = 0\n").unwrap();
        let path = path.to_str().unwrap();

        let config = Cli::try_parse_from(["local-bridge", "--config", path, "--port", "8080"]).unwrap().into_config().unwrap();
        assert_eq!(config.listener.port, 8080);

        let rejected = Cli::try_parse_from(["local-bridge", "--config", path]).unwrap().into_config();
        assert!(rejected.unwrap_err().to_string().contains("port"));
    }
}

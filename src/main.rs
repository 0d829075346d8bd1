mod api;
mod gateway;
mod guard;
mod shutdown;

use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wapair_core::config::{self, LogConfig};
use wapair_core::pairing::{PairingParams, PairingRequest};
use wapair_whatsapp::WhatsAppConnector;

use gateway::{PairingGateway, Settings};
use shutdown::Shutdown;

#[derive(Parser)]
#[command(
    name = "wapair",
    version,
    about = "WhatsApp pairing endpoint that hands session credentials to the account owner"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml", env = "WAPAIR_CONFIG")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pairing HTTP server.
    Serve {
        /// Listen address (overrides `server.host`).
        #[arg(long, env = "WAPAIR_HOST")]
        host: Option<String>,
        /// Listen port (overrides `server.port`).
        #[arg(long, env = "PORT")]
        port: Option<u16>,
        /// Session directory (overrides `session.dir`).
        #[arg(long, env = "WAPAIR_SESSION_DIR")]
        session_dir: Option<String>,
    },
    /// Check whether a phone number would be accepted for pairing.
    Check {
        /// Phone number with country code, any formatting.
        number: String,
    },
}

/// Install the global subscriber. The returned guard flushes file output on drop.
fn init_logging(log: &LogConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log.filter_directive()));

    let (file_layer, guard) = match &log.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(config::shellexpand(dir), "wapair.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();
    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            session_dir,
        } => {
            let mut cfg = config::load(&cli.config)?;
            if let Some(host) = host {
                cfg.server.host = host;
            }
            if let Some(port) = port {
                cfg.server.port = port;
            }
            if let Some(dir) = session_dir {
                cfg.session.dir = dir;
            }

            let log_guard = init_logging(&cfg.log);
            guard::install_panic_hook();

            let shutdown = Shutdown::new();
            shutdown.listen_for_ctrl_c();

            let connector = Arc::new(WhatsAppConnector::new(cfg.version.clone()));
            let gateway = Arc::new(PairingGateway::new(
                connector,
                Settings::from_config(&cfg),
                shutdown.clone(),
            ));

            let code = api::serve(&cfg.server, gateway, shutdown).await?;
            tracing::info!("exiting with code {code}");
            drop(log_guard);
            std::process::exit(code);
        }
        Commands::Check { number } => {
            let request = PairingRequest::from_params(&PairingParams {
                number: Some(number),
                ..Default::default()
            });
            match request.validate() {
                Ok(phone) => println!("ok: {phone}"),
                Err(rejection) => anyhow::bail!("{rejection}"),
            }
        }
    }

    Ok(())
}

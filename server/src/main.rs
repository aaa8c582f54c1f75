use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use paint_server::config::{
    RelayConfig, DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_PONG_TIMEOUT, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_WRITE_TIMEOUT,
};
use paint_server::router;
use paint_server::state::AppState;

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long, env = "PAINT_ADDR", default_value = "0.0.0.0:8080")]
    addr: SocketAddr,
    #[arg(long, env = "PAINT_PUBLIC_DIR")]
    public_dir: Option<PathBuf>,
    #[arg(long, default_value_t = DEFAULT_MAX_MESSAGE_SIZE)]
    max_message_size: usize,
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,
    /// Defaults to 9/10 of the pong timeout.
    #[arg(long)]
    ping_interval_secs: Option<u64>,
    #[arg(long, default_value_t = DEFAULT_PONG_TIMEOUT.as_secs())]
    pong_timeout_secs: u64,
    #[arg(long, default_value_t = DEFAULT_WRITE_TIMEOUT.as_secs())]
    write_timeout_secs: u64,
    /// PEM certificate; serves https/wss when given together with --tls-key.
    #[arg(long, env = "PAINT_TLS_CERT", requires = "tls_key")]
    tls_cert: Option<PathBuf>,
    #[arg(long, env = "PAINT_TLS_KEY", requires = "tls_cert")]
    tls_key: Option<PathBuf>,
}

impl Args {
    fn relay_config(&self) -> RelayConfig {
        let pong_timeout = Duration::from_secs(self.pong_timeout_secs.max(1));
        let ping_interval = self
            .ping_interval_secs
            .map(Duration::from_secs)
            .unwrap_or(pong_timeout * 9 / 10);
        RelayConfig {
            max_message_size: self.max_message_size,
            queue_capacity: self.queue_capacity,
            ping_interval: ping_interval.max(Duration::from_secs(1)),
            pong_timeout,
            write_timeout: Duration::from_secs(self.write_timeout_secs.max(1)),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paint_server=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = args.relay_config();
    let public_dir = args
        .public_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../public"));
    info!(?config, public_dir = %public_dir.display(), "starting relay");

    let app = router(AppState::new(config), public_dir);

    match (&args.tls_cert, &args.tls_key) {
        (Some(cert), Some(key)) => {
            let tls = RustlsConfig::from_pem_file(cert, key)
                .await
                .context("failed to load TLS certificate")?;
            info!("Paint relay running at https://{}", args.addr);
            axum_server::bind_rustls(args.addr, tls)
                .serve(app.into_make_service())
                .await
                .context("server crashed")?;
        }
        _ => {
            let listener = tokio::net::TcpListener::bind(args.addr)
                .await
                .with_context(|| format!("failed to bind {}", args.addr))?;
            info!("Paint relay running at http://{}", args.addr);
            axum::serve(listener, app).await.context("server crashed")?;
        }
    }
    Ok(())
}

//! cosproxy server - HTTP gateway for the object storage read/write actions.
//!
//! Each request is turned into a web action invocation and answered with the
//! action's result: object content for `/read`, a JSON receipt for `/write`,
//! or a failure result object.
//!
//! # Usage
//!
//! ```text
//! COS_HMAC_ACCESS_KEY_ID=... COS_HMAC_SECRET_ACCESS_KEY=... cosproxy-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:8080` | Bind address |
//! | `COS_ENDPOINT` | `s3.us.cloud-object-storage.appdomain.cloud` | Fallback storage endpoint |
//! | `COS_REGION` | `us-east-1` | Fallback signing region |
//! | `COS_HMAC_ACCESS_KEY_ID` | *(unset)* | Fallback HMAC access key |
//! | `COS_HMAC_SECRET_ACCESS_KEY` | *(unset)* | Fallback HMAC secret key |
//! | `STORAGE_BACKEND` | `s3` | `s3` or `memory` |
//! | `MULTIPART_STRICT` | `false` | Reject bodies in which the initial boundary line never appears |
//! | `MULTIPART_ABORT_ON_PART_ERROR` | `false` | Fail uploads with undecodable parts |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod body;
mod service;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use cosproxy_actions::{MemoryConnector, MemoryObjectStore, S3Connector, StoreConnector};
use cosproxy_core::{ProxyConfig, StorageBackend};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::service::ActionGateway;

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Select the store connector for the configured backend.
fn build_connector(config: &ProxyConfig) -> Arc<dyn StoreConnector> {
    match config.storage_backend {
        StorageBackend::Memory => {
            warn!("using in-memory storage; objects are lost on restart");
            Arc::new(MemoryConnector::new(Arc::new(MemoryObjectStore::auto_create())))
        }
        StorageBackend::S3 => Arc::new(S3Connector::default()),
    }
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve(listener: TcpListener, service: ActionGateway) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

/// Perform a health check by connecting to the gateway and requesting `/health`.
///
/// Exits with code 0 if healthy, 1 otherwise.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET /health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if is_healthy_response(&response) {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

fn is_healthy_response(response: &str) -> bool {
    response.contains("200 OK") && response.contains("\"status\":\"running\"")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle --health-check flag for Docker HEALTHCHECK.
    if std::env::args().any(|a| a == "--health-check") {
        let config = ProxyConfig::from_env();
        let addr = config.gateway_listen.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    let config = ProxyConfig::from_env();

    init_tracing(&config.log_level)?;

    info!(
        gateway_listen = %config.gateway_listen,
        cos_endpoint = %config.cos_endpoint,
        cos_region = %config.cos_region,
        storage_backend = ?config.storage_backend,
        fallback_credentials = config.hmac_keys().is_some(),
        version = VERSION,
        "starting cosproxy server",
    );

    let addr: SocketAddr = config
        .gateway_listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.gateway_listen))?;

    let connector = build_connector(&config);
    let service = ActionGateway::new(config, connector);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening for connections");

    serve(listener, service).await
}

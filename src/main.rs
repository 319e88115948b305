use anyhow::{Context, Result};
use clap::Parser;
use pdf_desk::config::{BackendKind, ConfigOverrides};
use pdf_desk::{api, backend, config, logging};
use tokio::net::TcpListener;

/// Serve the PDF Desk form.
#[derive(Debug, Parser)]
#[command(name = "pdf-desk", version, about)]
struct Cli {
    /// Port to listen on (overrides `SERVER_PORT`).
    #[arg(long)]
    port: Option<u16>,
    /// Remote primitive to drive: `assistant` or `index` (overrides `PDF_DESK_BACKEND`).
    #[arg(long)]
    backend: Option<BackendKind>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::init_config(ConfigOverrides {
        server_port: cli.port,
        backend: cli.backend,
    })
    .context("failed to load configuration")?;
    logging::init_tracing();

    let backend = backend::build_backend(config).context("failed to build Pinecone client")?;
    tracing::info!(
        backend = backend.kind().label(),
        resource = backend.resource_name(),
        ready_delay_secs = config.ready_delay_secs,
        "Backend configured"
    );
    let app = api::create_router(api::AppState::new(backend, config.ready_delay()));

    let (listener, port) = bind_listener(config.server_port)
        .await
        .context("failed to bind listener")?;
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn bind_listener(server_port: Option<u16>) -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    if let Some(port) = server_port {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 4100..=4199;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 4100-4199",
    ))
}

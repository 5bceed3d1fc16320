//! coda-mcp binary: pick a transport and serve

use std::net::{IpAddr, SocketAddr};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use coda_mcp::http::{self, serverless, sse, AppState};
use coda_mcp::{build_registry, server, CodaClient, Config, SharedClient};
use mcp_common::{serve_stdio, Session};

#[derive(Parser)]
#[command(name = "coda-mcp", version, about = "MCP server for Coda documents and pages")]
struct Cli {
    #[command(subcommand)]
    transport: Option<Transport>,
}

#[derive(Subcommand)]
enum Transport {
    /// Serve one client over stdin/stdout (default)
    Stdio,
    /// Long-running HTTP server with SSE sessions
    Http(ListenArgs),
    /// Stateless HTTP handler, one session per request
    Serverless(ListenArgs),
}

#[derive(Args)]
struct ListenArgs {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,
}

impl ListenArgs {
    fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is normal
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(e) = mcp_common::init_tracing("coda_mcp") {
        eprintln!("Failed to initialize logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load().context("Invalid configuration")?;
    let client: SharedClient =
        Arc::new(CodaClient::new(&config.coda).context("Failed to create Coda client")?);

    match cli.transport.unwrap_or(Transport::Stdio) {
        Transport::Stdio => {
            tracing::info!("Starting coda-mcp on stdio");
            let registry = build_registry(client)?;
            let session = Session::new(registry, Arc::new(server::identity()));
            serve_stdio(session).await?;
        }
        Transport::Http(args) => {
            tracing::info!("Starting coda-mcp HTTP server");
            let state = AppState::new(client, server::identity(), config.auth.token);
            state.log_auth_mode();
            http::serve(args.addr(), sse::router(state)).await?;
        }
        Transport::Serverless(args) => {
            tracing::info!("Starting coda-mcp serverless handler");
            let state = AppState::new(client, server::identity(), config.auth.token);
            state.log_auth_mode();
            http::serve(args.addr(), serverless::router(state)).await?;
        }
    }

    Ok(())
}

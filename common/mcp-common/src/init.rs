//! Tracing initialisation shared by every server binary
//!
//! Logs always go to stderr: on the stdio transport stdout carries protocol
//! frames, and the HTTP entry points keep the same convention so log
//! collection works identically for all three.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, no ANSI colours
    Text,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    /// Read `LOG_FORMAT` from the environment (`json` selects [`LogFormat::Json`])
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT") {
            Ok(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Initialize tracing for an MCP server
///
/// Filtering comes from `RUST_LOG`, with `<crate_name>=info` and
/// `mcp_common=info` added as defaults so a bare run still shows session
/// lifecycle events.
///
/// Calling this twice is not an error: the second call leaves the first
/// subscriber in place.
///
/// ```rust,ignore
/// mcp_common::init_tracing("coda_mcp")?;
/// ```
pub fn init_tracing(crate_name: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("{}=info", crate_name).parse()?)
        .add_directive("mcp_common=info".parse()?);

    let registry = tracing_subscriber::registry().with(filter);

    let result = match LogFormat::from_env() {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }

    Ok(())
}

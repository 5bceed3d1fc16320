//! Newline-delimited transport (stdio)
//!
//! Each line on the reader is one inbound frame; each reply is written as
//! one line. End of input is a half-close: replies for calls already in
//! flight are still written before the function returns.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::error::TransportError;
use crate::session::{Session, SessionChannel, DEFAULT_CHANNEL_CAPACITY};

/// Serve one session over the process's stdin and stdout
pub async fn serve_stdio(session: Session) -> Result<(), TransportError> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve_lines(session, stdin, stdout).await
}

/// Serve one session over any line-oriented byte stream pair
pub async fn serve_lines<R, W>(session: Session, reader: R, mut writer: W) -> Result<(), TransportError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let SessionChannel {
        session,
        inbound,
        mut outbound,
    } = session.spawn(DEFAULT_CHANNEL_CAPACITY);
    info!(session_id = %session.id(), "line transport attached");

    let mut lines = reader.lines();
    let mut inbound = Some(inbound);

    loop {
        tokio::select! {
            line = lines.next_line(), if inbound.is_some() => match line {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let delivered = match &inbound {
                        Some(tx) => tx.send(line).await.is_ok(),
                        None => false,
                    };
                    if !delivered {
                        return Err(TransportError::Closed(session.id().to_string()));
                    }
                }
                Ok(None) => {
                    debug!(session_id = %session.id(), "input closed");
                    inbound = None;
                }
                Err(e) => {
                    session.close();
                    return Err(e.into());
                }
            },
            reply = outbound.recv() => match reply {
                Some(frame) => {
                    if let Err(e) = write_frame(&mut writer, &frame).await {
                        session.close();
                        return Err(e.into());
                    }
                }
                None => break,
            },
        }
    }

    info!(session_id = %session.id(), "line transport detached");
    Ok(())
}

async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, frame: &str) -> std::io::Result<()> {
    writer.write_all(frame.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

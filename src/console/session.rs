//! Interactive line-oriented console.

use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, instrument, warn};

use super::command::{execute, Command};
use crate::error::Result;
use crate::ratelimit::{Clock, LimiterRegistry};

/// Counters reported when a console session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub commands: u64,
    pub errors: u64,
}

/// A console session over a limiter registry.
///
/// Reads one command per line and writes one JSON reply per line. Failed
/// commands produce `{"error": "..."}` and the session continues.
pub struct Console<C: Clock + Clone> {
    registry: Arc<LimiterRegistry<C>>,
}

impl<C: Clock + Clone> Console<C> {
    pub fn new(registry: Arc<LimiterRegistry<C>>) -> Self {
        Self { registry }
    }

    /// Serve commands until EOF or until `shutdown` resolves.
    #[instrument(skip_all)]
    pub async fn run<R, W, F>(&self, reader: R, mut writer: W, shutdown: F) -> Result<SessionStats>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        F: Future<Output = ()>,
    {
        let mut lines = reader.lines();
        let mut stats = SessionStats::default();
        tokio::pin!(shutdown);

        info!(limiters = ?self.registry.names(), "Console session started");

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, closing console session");
                    break;
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("Input closed, ending console session");
                        break;
                    };

                    let trimmed = line.trim();
                    if trimmed.is_empty() || trimmed.starts_with('#') {
                        continue;
                    }

                    stats.commands += 1;
                    let reply = match Command::parse(trimmed).and_then(|c| execute(&self.registry, c)) {
                        Ok(reply) => serde_json::to_string(&reply)?,
                        Err(e) => {
                            warn!(line = %trimmed, error = %e, "Command failed");
                            stats.errors += 1;
                            serde_json::json!({ "error": e.to_string() }).to_string()
                        }
                    };

                    writer.write_all(reply.as_bytes()).await?;
                    writer.write_all(b"\n").await?;
                    writer.flush().await?;
                }
            }
        }

        info!(
            commands = stats.commands,
            errors = stats.errors,
            "Console session ended"
        );
        Ok(stats)
    }
}

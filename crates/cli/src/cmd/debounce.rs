//! Debounce stdin lines
//!
//! Every input line restarts the quiet period. When the period elapses the
//! most recent line is written to stdout.

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

use crate::system_config::{self, SystemConfig};

/// Counts reported after the input closes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DebounceSummary {
    pub received: usize,
    pub emitted: usize,
}

pub async fn run(config_path: &Path, delay_ms: Option<i64>) -> Result<()> {
    let config = system_config::load_from(config_path)?;
    let delay = resolve_delay(config, delay_ms)?;

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let summary = debounce_lines(stdin, &mut stdout, delay).await?;

    info!(
        "Input closed: {} lines received, {} emitted (delay {:?})",
        summary.received, summary.emitted, delay
    );
    Ok(())
}

/// Apply a `--delay-ms` override and validate it like a configured value
pub fn resolve_delay(mut config: SystemConfig, delay_ms: Option<i64>) -> Result<Duration> {
    if let Some(ms) = delay_ms {
        config.debounce.delay_ms = ms;
    }
    config.validate().context("Invalid --delay-ms")?;
    config.delay()
}

/// Debounce `input` line by line, writing surviving lines to `output`
///
/// Returns once the input is exhausted and the last pending line (if any)
/// has been written.
pub async fn debounce_lines<R, W>(input: R, output: &mut W, delay: Duration) -> Result<DebounceSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let debounced = timing::debounce(
        move |line: String| {
            let _ = tx.send(line);
        },
        delay,
    )?;

    let mut lines = input.lines();
    let mut summary = DebounceSummary::default();

    loop {
        tokio::select! {
            line = lines.next_line() => match line.context("Failed to read input")? {
                Some(line) => {
                    summary.received += 1;
                    debounced.call(line);
                }
                None => break,
            },
            Some(line) = rx.recv() => {
                emit(output, &line).await?;
                summary.emitted += 1;
            }
        }
    }

    // The pending execution, if any, now holds the last sender
    drop(debounced);
    while let Some(line) = rx.recv().await {
        emit(output, &line).await?;
        summary.emitted += 1;
    }

    output.flush().await.context("Failed to flush output")?;
    Ok(summary)
}

async fn emit<W: AsyncWrite + Unpin>(output: &mut W, line: &str) -> Result<()> {
    output
        .write_all(format!("{}\n", line).as_bytes())
        .await
        .context("Failed to write output")?;
    output.flush().await.context("Failed to flush output")?;
    Ok(())
}

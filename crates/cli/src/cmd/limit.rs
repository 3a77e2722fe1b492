//! Rate limit stdin keys
//!
//! Each input line names a key (for example a client address). Every line
//! is answered with `allow <key>` or `deny <key>`.

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;
use timing::RateLimiter;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::system_config::{self, SystemConfig};

/// Lines processed between sweeps for idle buckets
pub const EVICT_EVERY_LINES: usize = 1024;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LimitSummary {
    pub allowed: usize,
    pub denied: usize,
    /// Buckets dropped after sitting idle for a full refill window
    pub evicted: usize,
}

pub async fn run(config_path: &Path, per_second: Option<f64>, burst: Option<u32>) -> Result<()> {
    let config = system_config::load_from(config_path)?;
    let limiter = build_limiter(config, per_second, burst)?;

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let summary = limit_lines(stdin, &mut stdout, &limiter).await?;

    info!(
        "Input closed: {} allowed, {} denied across {} keys ({} evicted)",
        summary.allowed,
        summary.denied,
        limiter.tracked_keys(),
        summary.evicted
    );
    Ok(())
}

/// Apply `--per-second` / `--burst` overrides and validate them like configured values
pub fn build_limiter(
    mut config: SystemConfig,
    per_second: Option<f64>,
    burst: Option<u32>,
) -> Result<RateLimiter<String>> {
    if let Some(per_second) = per_second {
        config.rate_limit.per_second = per_second;
    }
    if let Some(burst) = burst {
        config.rate_limit.burst = burst;
    }
    config.validate().context("Invalid rate limit override")?;
    config.limiter()
}

/// Answer each non-empty line of `input` with an allow/deny verdict
pub async fn limit_lines<R, W>(
    input: R,
    output: &mut W,
    limiter: &RateLimiter<String>,
) -> Result<LimitSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    limit_lines_evicting(input, output, limiter, EVICT_EVERY_LINES).await
}

/// Same as [`limit_lines`], sweeping idle buckets every `evict_every` keys
pub async fn limit_lines_evicting<R, W>(
    input: R,
    output: &mut W,
    limiter: &RateLimiter<String>,
    evict_every: usize,
) -> Result<LimitSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut summary = LimitSummary::default();
    let idle = limiter.refill_window();
    let mut since_sweep = 0usize;

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let key = line.trim();
        if key.is_empty() {
            continue;
        }

        since_sweep += 1;
        if since_sweep >= evict_every.max(1) {
            since_sweep = 0;
            let evicted = limiter.evict_idle(idle, Instant::now());
            if evicted > 0 {
                debug!("Evicted {} idle rate limit buckets", evicted);
            }
            summary.evicted += evicted;
        }

        let verdict = if limiter.allow(&key.to_string()) {
            summary.allowed += 1;
            "allow"
        } else {
            warn!("Rate limit exceeded for {}", key);
            summary.denied += 1;
            "deny"
        };

        output
            .write_all(format!("{} {}\n", verdict, key).as_bytes())
            .await
            .context("Failed to write output")?;
    }

    output.flush().await.context("Failed to flush output")?;
    Ok(summary)
}

//! Deterministic replay of a request trace against simulated time.
//!
//! A trace is a YAML list of steps:
//!
//! ```yaml
//! - { at_ms: 0, op: allow, limiter: portal, key: abc }
//! - { at_ms: 61000, op: status, limiter: portal, key: abc }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use super::command::{execute, Command, Op, Reply};
use crate::config::TourguardConfig;
use crate::error::{Result, TourguardError};
use crate::ratelimit::{LimiterRegistry, ManualClock};

/// One step of a trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStep {
    /// Simulated time of the step (ms since the Unix epoch)
    pub at_ms: u64,
    pub op: Op,
    #[serde(default)]
    pub limiter: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

/// The outcome of one replayed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayRecord {
    pub at_ms: u64,
    #[serde(flatten)]
    pub reply: Reply,
}

/// Parse a trace from YAML.
pub fn parse_trace(yaml: &str) -> Result<Vec<TraceStep>> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Read and parse a trace file.
pub fn load_trace<P: AsRef<Path>>(path: P) -> Result<Vec<TraceStep>> {
    let path = path.as_ref();
    info!(path = %path.display(), "Loading trace");
    parse_trace(&std::fs::read_to_string(path)?)
}

/// Replay `steps` against fresh limiters built from `config`.
///
/// Steps must be ordered by `at_ms`; the clock never moves backwards.
pub fn replay(config: &TourguardConfig, steps: &[TraceStep]) -> Result<Vec<ReplayRecord>> {
    let start = steps.first().map(|s| s.at_ms).unwrap_or(0);
    let clock = Arc::new(ManualClock::new(start));
    let registry = LimiterRegistry::with_clock(config, clock.clone())?;

    let mut records = Vec::with_capacity(steps.len());
    let mut last = start;

    for (index, step) in steps.iter().enumerate() {
        if step.at_ms < last {
            return Err(TourguardError::Command(format!(
                "step {} at {}ms is earlier than the previous step at {}ms",
                index, step.at_ms, last
            )));
        }
        last = step.at_ms;
        clock.set(step.at_ms);

        let command = Command::from_parts(step.op, step.limiter.as_deref(), step.key.as_deref())
            .map_err(|e| TourguardError::Command(format!("step {}: {}", index, e)))?;
        let reply = execute(&registry, command)
            .map_err(|e| TourguardError::Command(format!("step {}: {}", index, e)))?;

        debug!(step = index, at_ms = step.at_ms, "Replayed step");
        records.push(ReplayRecord {
            at_ms: step.at_ms,
            reply,
        });
    }

    info!(steps = records.len(), "Replay complete");
    Ok(records)
}

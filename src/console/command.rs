//! Operator commands and their execution against a limiter registry.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TourguardError};
use crate::ratelimit::{Clock, LimiterRegistry, RateLimitDecision, RateLimitStatus};

/// The operation a command performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Allow,
    Status,
    Reset,
    Cleanup,
    Limiters,
}

impl std::str::FromStr for Op {
    type Err = TourguardError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "allow" => Ok(Op::Allow),
            "status" => Ok(Op::Status),
            "reset" => Ok(Op::Reset),
            "cleanup" => Ok(Op::Cleanup),
            "limiters" => Ok(Op::Limiters),
            other => Err(TourguardError::Command(format!("unknown operation '{}'", other))),
        }
    }
}

/// A parsed operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Allow { limiter: String, key: String },
    Status { limiter: String, key: String },
    Reset { limiter: String, key: String },
    Cleanup,
    Limiters,
}

impl Command {
    /// Build a command from an operation and its optional arguments.
    pub fn from_parts(op: Op, limiter: Option<&str>, key: Option<&str>) -> Result<Self> {
        let targeted = |limiter: Option<&str>, key: Option<&str>| -> Result<(String, String)> {
            let limiter = limiter
                .filter(|l| !l.is_empty())
                .ok_or_else(|| TourguardError::Command(format!("{:?} requires a limiter name", op)))?;
            let key = key
                .filter(|k| !k.is_empty())
                .ok_or_else(|| TourguardError::Command(format!("{:?} requires a key", op)))?;
            Ok((limiter.to_string(), key.to_string()))
        };

        Ok(match op {
            Op::Allow => {
                let (limiter, key) = targeted(limiter, key)?;
                Command::Allow { limiter, key }
            }
            Op::Status => {
                let (limiter, key) = targeted(limiter, key)?;
                Command::Status { limiter, key }
            }
            Op::Reset => {
                let (limiter, key) = targeted(limiter, key)?;
                Command::Reset { limiter, key }
            }
            Op::Cleanup => Command::Cleanup,
            Op::Limiters => Command::Limiters,
        })
    }

    /// Parse a console line: `<op> [<limiter> <key>]`.
    ///
    /// The key is everything after the limiter name, so it may contain spaces.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (op, rest) = split_word(line);
        let (limiter, key) = split_word(rest);

        let op: Op = op.parse()?;
        Command::from_parts(op, Some(limiter), Some(key))
    }
}

fn split_word(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (s, ""),
    }
}

/// The result of executing a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Reply {
    Allow {
        limiter: String,
        key: String,
        decision: RateLimitDecision,
    },
    Status {
        limiter: String,
        key: String,
        status: RateLimitStatus,
    },
    Reset {
        limiter: String,
        key: String,
    },
    Cleanup {
        evicted: usize,
    },
    Limiters {
        names: Vec<String>,
    },
}

/// Run a command against the registry.
pub fn execute<C: Clock + Clone>(registry: &LimiterRegistry<C>, command: Command) -> Result<Reply> {
    debug!(command = ?command, "Executing command");

    let reply = match command {
        Command::Allow { limiter, key } => {
            let decision = registry.get(&limiter)?.is_allowed(&key);
            Reply::Allow { limiter, key, decision }
        }
        Command::Status { limiter, key } => {
            let status = registry.get(&limiter)?.status(&key);
            Reply::Status { limiter, key, status }
        }
        Command::Reset { limiter, key } => {
            registry.get(&limiter)?.reset(&key);
            Reply::Reset { limiter, key }
        }
        Command::Cleanup => Reply::Cleanup {
            evicted: registry.cleanup_all(),
        },
        Command::Limiters => Reply::Limiters {
            names: registry.names().into_iter().map(str::to_string).collect(),
        },
    };
    Ok(reply)
}

//! Operator surfaces over a limiter registry.
//!
//! `replay` runs a recorded trace against simulated time; `session` serves
//! commands interactively on the system clock.

mod command;
mod replay;
mod session;

pub use command::{execute, Command, Op, Reply};
pub use replay::{load_trace, parse_trace, replay, ReplayRecord, TraceStep};
pub use session::{Console, SessionStats};

//! Tourguard - client-side rate limiting for the TourCompanion portal
//!
//! This crate implements the fixed-window throttle that gates public portal
//! page loads and authentication attempts. Counters are process-local and
//! advisory: they reset on restart and are not shared between processes.

pub mod config;
pub mod console;
pub mod error;
pub mod ratelimit;

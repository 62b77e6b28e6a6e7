// src/redirect/sink.rs
//! Warning sinks for the redirect notice
//!
//! The factory writes its one-shot notice line by line into a sink. A sink
//! may fail; the factory logs the failure and keeps connecting.

use std::io::{self, Write};
use tracing::warn;

/// Destination for human-readable notice lines
pub trait WarningSink: Send + Sync {
    fn emit(&self, line: &str) -> io::Result<()>;
}

impl<F> WarningSink for F
where
    F: Fn(&str) -> io::Result<()> + Send + Sync,
{
    fn emit(&self, line: &str) -> io::Result<()> {
        self(line)
    }
}

/// Routes notice lines into `tracing` at warn level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn emit(&self, line: &str) -> io::Result<()> {
        warn!(target: "loopback_redirect::notice", "{}", line.trim_end());
        Ok(())
    }
}

/// Prints notice lines to stderr, optionally in blue
#[derive(Debug, Clone, Copy)]
pub struct StderrSink {
    colored: bool,
}

impl StderrSink {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }
}

impl Default for StderrSink {
    fn default() -> Self {
        Self::new(true)
    }
}

impl WarningSink for StderrSink {
    fn emit(&self, line: &str) -> io::Result<()> {
        let mut stderr = io::stderr().lock();
        if self.colored {
            writeln!(stderr, "\x1b[34m{}\x1b[0m", line)
        } else {
            writeln!(stderr, "{}", line)
        }
    }
}

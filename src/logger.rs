//! Leveled console logger.
//!
//! One line per call: UTC timestamp, level tag, `[area]`, message. The area
//! label names the subsystem that produced the line (`server`,
//! `server.context`, …) so grepping a deployment's output stays cheap.
//!
//! # Gating
//!
//! A call at severity `S` is emitted iff `S >= threshold`. A logger built
//! with **no** threshold emits nothing at any severity — this is not the
//! same as the INFO default the server applies to an absent `LOG_LEVEL`
//! ([`Config::from_env`](crate::Config::from_env)); the asymmetry is
//! deliberate and mirrors the severity contract exactly.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};

/// A log severity, drawn from the fixed value set the `LOG_LEVEL`
/// environment variable accepts.
///
/// `NotSet` (0) is a member of the set but is rejected as a *configured*
/// value — see [`Config::from_raw_level`](crate::Config::from_raw_level).
/// `Critical` exists as a threshold; the logger itself has no entry point
/// above [`error`](Logger::error).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Level {
    NotSet = 0,
    Debug = 10,
    Info = 20,
    Warning = 30,
    Error = 40,
    Critical = 50,
}

impl Level {
    /// Looks a level up by its numeric value. Anything outside the fixed set
    /// is `None`.
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::NotSet),
            10 => Some(Self::Debug),
            20 => Some(Self::Info),
            30 => Some(Self::Warning),
            40 => Some(Self::Error),
            50 => Some(Self::Critical),
            _ => None,
        }
    }

    /// The numeric value carried in `LOG_LEVEL`.
    pub fn value(self) -> u8 {
        self as u8
    }

    /// The fixed-width tag printed in every log line.
    pub fn tag(self) -> &'static str {
        match self {
            Self::NotSet => "____",
            Self::Debug => "DEB",
            Self::Info => "INFO",
            Self::Warning => "WARN",
            Self::Error => "ERR",
            Self::Critical => "CRIT",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ── Logger ────────────────────────────────────────────────────────────────────

/// The leveled log sink the request core writes to.
///
/// Cheap to clone — clones share the threshold and the sink, so the server,
/// every context, and the request-logging middleware all write to the same
/// place.
#[derive(Clone)]
pub struct Logger {
    threshold: Option<Level>,
    colors: bool,
    sink: Arc<Mutex<dyn Write + Send>>,
}

impl Logger {
    /// A logger writing to stdout, gated at `threshold`.
    ///
    /// `None` suppresses every call. Color is applied per level unless the
    /// `NO_COLOR` environment variable is set (checked once, here).
    pub fn new(threshold: Option<Level>) -> Self {
        Self {
            threshold,
            colors: std::env::var_os("NO_COLOR").is_none(),
            sink: Arc::new(Mutex::new(io::stdout())),
        }
    }

    /// A logger writing to `sink`, uncolored. This is the test seam: hand in
    /// a shared buffer and assert on the captured lines.
    pub fn with_sink(threshold: Option<Level>, sink: impl Write + Send + 'static) -> Self {
        Self {
            threshold,
            colors: false,
            sink: Arc::new(Mutex::new(sink)),
        }
    }

    /// The configured minimum severity, if any.
    pub fn threshold(&self) -> Option<Level> {
        self.threshold
    }

    pub fn debug(&self, area: &str, message: impl fmt::Display) {
        self.log(Level::Debug, area, &message);
    }

    pub fn info(&self, area: &str, message: impl fmt::Display) {
        self.log(Level::Info, area, &message);
    }

    pub fn warning(&self, area: &str, message: impl fmt::Display) {
        self.log(Level::Warning, area, &message);
    }

    pub fn error(&self, area: &str, message: impl fmt::Display) {
        self.log(Level::Error, area, &message);
    }

    fn log(&self, level: Level, area: &str, message: &dyn fmt::Display) {
        if !self.should_log(level) {
            return;
        }

        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut line = format!("{timestamp} {} [{area}] {message}", level.tag());
        if self.colors {
            line = paint(level, line);
        }

        // A full or broken sink must never take a request down with it.
        let mut sink = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        let _ = writeln!(sink, "{line}");
    }

    fn should_log(&self, level: Level) -> bool {
        match self.threshold {
            Some(threshold) => level >= threshold,
            None => false,
        }
    }
}

fn paint(level: Level, line: String) -> String {
    let code = match level {
        Level::Debug => 36,   // cyan
        Level::Warning => 33, // yellow
        Level::Error => 31,   // red
        _ => return line,
    };
    format!("\x1b[{code}m{line}\x1b[0m")
}

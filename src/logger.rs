//! The log router.
//!
//! Holds the enabled-level set and the registered transports. Each log call
//! is formatted once, written to the local stream, then fanned out to every
//! transport in registration order; each transport applies its own level
//! filter independently.

use crate::config::LoggerConfig;
use crate::domain::entry::{format_entry, LogValue};
use crate::domain::level::{Level, LevelSet};
use crate::port::{FlushScheduler, ObjectStore};
use crate::transport::{BufferedTransport, Transport};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, warn};

/// Local stdout/stderr destination for formatted entries.
///
/// The writers are injectable so tests can observe (or assert the absence
/// of) local output. Write errors are ignored: local logging must never
/// fail the caller.
pub struct LocalSink {
    out: Mutex<Box<dyn Write + Send>>,
    err: Mutex<Box<dyn Write + Send>>,
}

impl LocalSink {
    pub fn stdio() -> Self {
        Self::from_writers(Box::new(std::io::stdout()), Box::new(std::io::stderr()))
    }

    pub fn from_writers(out: Box<dyn Write + Send>, err: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            err: Mutex::new(err),
        }
    }

    fn write(&self, level: Level, entry: &str) {
        let mut writer = if level.uses_stderr() {
            self.err.lock()
        } else {
            self.out.lock()
        };
        let _ = writeln!(writer, "{entry}");
    }
}

impl Default for LocalSink {
    fn default() -> Self {
        Self::stdio()
    }
}

pub struct Logger {
    levels: RwLock<LevelSet>,
    transports: Vec<Arc<dyn Transport>>,
    sink: LocalSink,
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder {
            levels: LevelSet::all(),
            transports: Vec::new(),
            sink: None,
        }
    }

    /// Builds a router from the recognized option map.
    ///
    /// Unknown transport types are ignored. A malformed transport is
    /// omitted with a warning; it never fails the router as a whole.
    pub fn from_config(
        config: LoggerConfig,
        store: Arc<dyn ObjectStore>,
        scheduler: &dyn FlushScheduler,
    ) -> Self {
        let mut builder = Self::builder();
        if let Some(levels) = config.levels {
            builder = builder.levels(levels.into_iter().collect());
        }

        for transport_config in config.transports {
            if transport_config.kind != "s3" {
                debug!(kind = %transport_config.kind, "Ignoring unknown transport type");
                continue;
            }
            let built = transport_config.validate().and_then(|()| {
                let mut transport = BufferedTransport::builder(
                    transport_config.bucket.clone().unwrap_or_default(),
                    transport_config.key_prefix.clone().unwrap_or_default(),
                );
                if let Some(threshold) = transport_config.capacity_threshold {
                    transport = transport.threshold(threshold);
                }
                if let Some(levels) = transport_config.levels.clone() {
                    transport = transport.levels(levels.into_iter().collect());
                }
                if let Some(spec) = transport_config.flush_schedule.clone() {
                    transport = transport.schedule(spec);
                }
                transport.build(Arc::clone(&store), scheduler)
            });
            match built {
                Ok(transport) => builder = builder.transport(transport),
                Err(e) => warn!(error = %e, "Skipping malformed transport"),
            }
        }

        builder.build()
    }

    /// Enables a level. Idempotent.
    pub fn enable(&self, level: Level) {
        self.levels.write().insert(level);
    }

    /// Disables a level, removing every occurrence. Idempotent.
    pub fn disable(&self, level: Level) {
        self.levels.write().remove(level);
    }

    pub fn is_enabled(&self, level: Level) -> bool {
        self.levels.read().contains(level)
    }

    pub fn log<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.emit(Level::Log, values);
    }

    pub fn info<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.emit(Level::Info, values);
    }

    pub fn warn<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.emit(Level::Warn, values);
    }

    pub fn debug<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.emit(Level::Debug, values);
    }

    pub fn error<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.emit(Level::Error, values);
    }

    /// Routes an already-formatted access line, trimmed, verbatim.
    pub fn access(&self, line: &str) {
        if !self.is_enabled(Level::Access) {
            return;
        }
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        self.deliver(Level::Access, line);
    }

    /// Tears down every transport. Scheduled flushes stop; residual buffers
    /// drain best-effort.
    pub fn shutdown(&self) {
        for transport in &self.transports {
            transport.shutdown();
        }
    }

    fn emit<I>(&self, level: Level, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        // Disabled levels cost nothing: no formatting, no writes, no fan-out.
        if !self.is_enabled(level) {
            return;
        }
        let values: Vec<LogValue> = values.into_iter().map(Into::into).collect();
        let entry = format_entry(level, &values, Utc::now());
        self.deliver(level, &entry);
    }

    fn deliver(&self, level: Level, entry: &str) {
        self.sink.write(level, entry);
        for transport in &self.transports {
            transport.log(level, entry);
        }
    }
}

pub struct LoggerBuilder {
    levels: LevelSet,
    transports: Vec<Arc<dyn Transport>>,
    sink: Option<LocalSink>,
}

impl LoggerBuilder {
    pub fn levels(mut self, levels: LevelSet) -> Self {
        self.levels = levels;
        self
    }

    /// Registers a transport. Fan-out preserves registration order.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transports.push(transport);
        self
    }

    pub fn sink(mut self, sink: LocalSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn build(self) -> Logger {
        Logger {
            levels: RwLock::new(self.levels),
            transports: self.transports,
            sink: self.sink.unwrap_or_default(),
        }
    }
}

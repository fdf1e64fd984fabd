use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::trace;
use tracing::warn;

use crate::proto;

/// Location inside a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub source_id: u32,
    pub line: u32,
    pub col: u32,
}

/// Where each node of a decoded value was defined, shaped like the value.
///
/// Only filled when positions were asked for; otherwise every lookup yields
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PositionTree {
    pub(super) position: Option<Position>,
    pub(super) items: Vec<PositionTree>,
    pub(super) entries: BTreeMap<String, PositionTree>,
}

impl PositionTree {
    /// Position of the node itself
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// Positions of the map entry `key`
    pub fn get(
        &self,
        key: &str,
    ) -> Option<&PositionTree> {
        self.entries.get(key)
    }

    /// Positions of the sequence item at `index`
    pub fn item(
        &self,
        index: usize,
    ) -> Option<&PositionTree> {
        self.items.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.items.is_empty() && self.entries.is_empty()
    }
}

/// A server-side file that contributed to a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub id: u32,
    pub checksum: u32,
    pub path: String,
}

/// Severity of a server-emitted diagnostic, also used to ask the server how
/// verbose it should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Diagnostic attached to a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Log {
    pub level: LogLevel,
    pub message: String,
    /// Where the problem was found
    pub position: Option<Position>,
    /// Where the offending value was defined
    pub origin: Option<Position>,
}

impl fmt::Display for Position {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source_id, self.line, self.col)
    }
}

impl From<proto::Position> for Position {
    fn from(p: proto::Position) -> Self {
        Self {
            source_id: p.source_id,
            line: p.line,
            col: p.col,
        }
    }
}

impl From<&proto::Source> for Source {
    fn from(s: &proto::Source) -> Self {
        Self {
            id: s.id,
            checksum: s.checksum,
            path: s.path.clone(),
        }
    }
}

impl From<proto::LogLevel> for LogLevel {
    fn from(level: proto::LogLevel) -> Self {
        match level {
            proto::LogLevel::Error => LogLevel::Error,
            proto::LogLevel::Warn => LogLevel::Warn,
            proto::LogLevel::Info => LogLevel::Info,
            proto::LogLevel::Debug => LogLevel::Debug,
            proto::LogLevel::Trace => LogLevel::Trace,
        }
    }
}

impl From<LogLevel> for proto::LogLevel {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => proto::LogLevel::Error,
            LogLevel::Warn => proto::LogLevel::Warn,
            LogLevel::Info => proto::LogLevel::Info,
            LogLevel::Debug => proto::LogLevel::Debug,
            LogLevel::Trace => proto::LogLevel::Trace,
        }
    }
}

impl From<&proto::Log> for Log {
    fn from(log: &proto::Log) -> Self {
        // Unknown severities are reported as errors rather than dropped.
        let level = proto::LogLevel::try_from(log.level)
            .map(LogLevel::from)
            .unwrap_or(LogLevel::Error);
        Self {
            level,
            message: log.message.clone(),
            position: log.position.map(Position::from),
            origin: log.origin.map(Position::from),
        }
    }
}

impl Log {
    /// Re-emits the diagnostic through `tracing` at the matching level
    pub fn emit(
        &self,
        context: &str,
    ) {
        let position = self.position.map(|p| p.to_string()).unwrap_or_default();
        match self.level {
            LogLevel::Error => error!(%position, "[{context}] {}", self.message),
            LogLevel::Warn => warn!(%position, "[{context}] {}", self.message),
            LogLevel::Info => info!(%position, "[{context}] {}", self.message),
            LogLevel::Debug => debug!(%position, "[{context}] {}", self.message),
            LogLevel::Trace => trace!(%position, "[{context}] {}", self.message),
        }
    }
}

pub fn decode_logs(logs: &[proto::Log]) -> Vec<Log> {
    logs.iter().map(Log::from).collect()
}

pub fn decode_sources(sources: &[proto::Source]) -> HashMap<u32, Source> {
    sources.iter().map(|s| (s.id, Source::from(s))).collect()
}

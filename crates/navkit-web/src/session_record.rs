#![forbid(unsafe_code)]

//! Deterministic session recording and replay.
//!
//! [`SessionRecorder`] drives a [`NavController`] over a [`DomModel`] and
//! records every host input and clock step. [`replay`] feeds the same records
//! through a fresh controller and compares DOM checksums at each checkpoint.
//!
//! # Trace format
//!
//! One JSON object per line, tagged by `"type"`:
//!
//! - **header**: schema, initial width, scroll offset, config and layout.
//! - **input**: an event at a timestamp (ms since session start).
//! - **tick**: explicit clock advancement.
//! - **checkpoint**: DOM checksum plus FNV-1a chain over all checkpoints.
//! - **summary**: checkpoint count and final chain.
//!
//! # Determinism contract
//!
//! The controller only sees time through `set_time` and input through
//! `handle`, so identical records on the same build yield identical DOM
//! checksums.
//!
//! # Example
//!
//! ```ignore
//! let mut rec = SessionRecorder::new(layout, 375, 0, NavConfig::default())?;
//! rec.push_event(0, NavEvent::click(Node::Trigger));
//! rec.tick(350);
//! rec.checkpoint();
//! let trace = rec.finish();
//! assert!(replay(&trace)?.ok());
//! ```

use core::time::Duration;

use navkit_core::{NavConfig, NavController, NavError, NavEvent, NavLayout};
use serde::{Deserialize, Serialize};

use crate::dom_model::{DomModel, fnv1a64_pair};

/// Schema version for session traces.
pub const SCHEMA_VERSION: &str = "navkit-trace-v1";

/// A single record in a session trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceRecord {
    /// Session header (must be first).
    Header {
        schema: String,
        width: u32,
        #[serde(default)]
        scroll: i32,
        config: NavConfig,
        layout: NavLayout,
    },
    /// An input event at a timestamp.
    Input { ts_ms: u64, event: NavEvent },
    /// Explicit time advancement.
    Tick { ts_ms: u64 },
    /// DOM checkpoint.
    Checkpoint {
        idx: u64,
        ts_ms: u64,
        checksum: u64,
        checksum_chain: u64,
    },
    /// Trace summary (must be last).
    Summary {
        total_checkpoints: u64,
        final_checksum_chain: u64,
    },
}

impl TraceRecord {
    /// Encode as one JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A complete recorded session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionTrace {
    pub records: Vec<TraceRecord>,
}

impl SessionTrace {
    #[must_use]
    pub fn checkpoint_count(&self) -> u64 {
        self.records
            .iter()
            .filter(|r| matches!(r, TraceRecord::Checkpoint { .. }))
            .count() as u64
    }

    #[must_use]
    pub fn final_checksum_chain(&self) -> Option<u64> {
        self.records.iter().rev().find_map(|r| match r {
            TraceRecord::Summary {
                final_checksum_chain,
                ..
            } => Some(*final_checksum_chain),
            _ => None,
        })
    }

    /// Check structural invariants:
    /// - exactly one header, and it is first
    /// - exactly one summary, and it is last
    /// - checkpoint indices are contiguous from zero
    /// - timestamps never go backwards
    /// - summary totals match the checkpoints
    pub fn validate(&self) -> Result<(), TraceValidationError> {
        if self.records.is_empty() {
            return Err(TraceValidationError::EmptyTrace);
        }
        if !matches!(self.records.first(), Some(TraceRecord::Header { .. })) {
            return Err(TraceValidationError::HeaderNotFirst);
        }

        let last = self.records.len() - 1;
        let mut expected_idx: u64 = 0;
        let mut last_chain: u64 = 0;
        let mut last_ts: u64 = 0;
        let mut summary = None;

        for (idx, record) in self.records.iter().enumerate() {
            let ts = match record {
                TraceRecord::Header { .. } if idx > 0 => {
                    return Err(TraceValidationError::MultipleHeaders);
                }
                TraceRecord::Header { .. } => None,
                TraceRecord::Summary {
                    total_checkpoints,
                    final_checksum_chain,
                } => {
                    if idx != last {
                        return Err(TraceValidationError::SummaryNotLast { summary_index: idx });
                    }
                    summary = Some((*total_checkpoints, *final_checksum_chain));
                    None
                }
                TraceRecord::Checkpoint {
                    idx: checkpoint,
                    ts_ms,
                    checksum_chain,
                    ..
                } => {
                    if *checkpoint != expected_idx {
                        return Err(TraceValidationError::CheckpointIndexMismatch {
                            expected: expected_idx,
                            actual: *checkpoint,
                        });
                    }
                    expected_idx += 1;
                    last_chain = *checksum_chain;
                    Some(*ts_ms)
                }
                TraceRecord::Input { ts_ms, .. } | TraceRecord::Tick { ts_ms } => Some(*ts_ms),
            };
            if let Some(ts) = ts {
                if ts < last_ts {
                    return Err(TraceValidationError::TimeWentBackwards { record_index: idx });
                }
                last_ts = ts;
            }
        }

        let Some((total, chain)) = summary else {
            return Err(TraceValidationError::MissingSummary);
        };
        if total != expected_idx {
            return Err(TraceValidationError::SummaryCountMismatch {
                expected: expected_idx,
                actual: total,
            });
        }
        if chain != last_chain {
            return Err(TraceValidationError::SummaryChainMismatch {
                expected: last_chain,
                actual: chain,
            });
        }
        Ok(())
    }

    /// Encode as JSONL, one record per line.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&record.to_jsonl()?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Parse JSONL. Blank lines are skipped.
    pub fn from_jsonl(input: &str) -> Result<Self, TraceParseError> {
        let mut records = Vec::new();
        for (idx, line) in input.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record = serde_json::from_str(line).map_err(|e| TraceParseError {
                line: idx + 1,
                message: e.to_string(),
            })?;
            records.push(record);
        }
        Ok(Self { records })
    }

    /// Parse JSONL and validate the result.
    pub fn from_jsonl_validated(input: &str) -> Result<Self, TraceLoadError> {
        let trace = Self::from_jsonl(input)?;
        trace.validate()?;
        Ok(trace)
    }
}

/// Records a session for deterministic replay.
pub struct SessionRecorder {
    nav: NavController<DomModel>,
    records: Vec<TraceRecord>,
    checkpoints: u64,
    checksum_chain: u64,
    current_ts_ms: u64,
}

impl SessionRecorder {
    /// Attach a controller to a fresh [`DomModel`] and write the header.
    pub fn new(
        layout: NavLayout,
        width: u32,
        scroll: i32,
        config: NavConfig,
    ) -> Result<Self, NavError> {
        let header = TraceRecord::Header {
            schema: SCHEMA_VERSION.to_owned(),
            width,
            scroll,
            config: config.clone(),
            layout: layout.clone(),
        };
        let nav = NavController::attach(DomModel::new(layout, width).with_scroll(scroll), config)?;
        Ok(Self {
            nav,
            records: vec![header],
            checkpoints: 0,
            checksum_chain: 0,
            current_ts_ms: 0,
        })
    }

    /// Deliver an event at `ts_ms`. Earlier timestamps are clamped.
    pub fn push_event(&mut self, ts_ms: u64, event: NavEvent) {
        let ts_ms = ts_ms.max(self.current_ts_ms);
        self.current_ts_ms = ts_ms;
        self.records.push(TraceRecord::Input { ts_ms, event });
        if let NavEvent::Resize { width } | NavEvent::OrientationChange { width } = event {
            self.nav.surface_mut().set_viewport_width(width);
        }
        self.nav.set_time(Duration::from_millis(ts_ms));
        self.nav.handle(event);
    }

    /// Move the clock to `ts_ms`, firing due timers.
    pub fn tick(&mut self, ts_ms: u64) {
        let ts_ms = ts_ms.max(self.current_ts_ms);
        self.current_ts_ms = ts_ms;
        self.records.push(TraceRecord::Tick { ts_ms });
        self.nav.set_time(Duration::from_millis(ts_ms));
    }

    /// Record the current DOM checksum. Returns it.
    pub fn checkpoint(&mut self) -> u64 {
        let checksum = self.nav.surface().checksum();
        let chain = fnv1a64_pair(self.checksum_chain, checksum);
        self.records.push(TraceRecord::Checkpoint {
            idx: self.checkpoints,
            ts_ms: self.current_ts_ms,
            checksum,
            checksum_chain: chain,
        });
        self.checkpoints += 1;
        self.checksum_chain = chain;
        checksum
    }

    #[must_use]
    pub fn controller(&self) -> &NavController<DomModel> {
        &self.nav
    }

    /// Write the summary and return the trace.
    #[must_use]
    pub fn finish(mut self) -> SessionTrace {
        self.records.push(TraceRecord::Summary {
            total_checkpoints: self.checkpoints,
            final_checksum_chain: self.checksum_chain,
        });
        SessionTrace {
            records: self.records,
        }
    }
}

/// Result of replaying a trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayResult {
    pub total_checkpoints: u64,
    pub final_checksum_chain: u64,
    /// First checkpoint whose checksum differed, if any.
    pub first_mismatch: Option<ReplayMismatch>,
}

impl ReplayResult {
    /// Whether every checkpoint matched.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.first_mismatch.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayMismatch {
    pub idx: u64,
    pub expected: u64,
    pub actual: u64,
}

/// Errors that can occur during replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    MissingHeader,
    UnsupportedSchema(String),
    InvalidTrace(TraceValidationError),
    /// The recorded markup or config no longer attaches.
    Attach(NavError),
}

impl core::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "trace missing header record"),
            Self::UnsupportedSchema(s) => write!(f, "unsupported trace schema: {s}"),
            Self::InvalidTrace(e) => write!(f, "invalid trace: {e}"),
            Self::Attach(e) => write!(f, "attach failed: {e}"),
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidTrace(e) => Some(e),
            Self::Attach(e) => Some(e),
            _ => None,
        }
    }
}

impl From<NavError> for ReplayError {
    fn from(e: NavError) -> Self {
        Self::Attach(e)
    }
}

/// Replay a trace through a fresh controller and compare checksums.
pub fn replay(trace: &SessionTrace) -> Result<ReplayResult, ReplayError> {
    let Some(TraceRecord::Header {
        schema,
        width,
        scroll,
        config,
        layout,
    }) = trace.records.first()
    else {
        return Err(ReplayError::MissingHeader);
    };
    if schema != SCHEMA_VERSION {
        return Err(ReplayError::UnsupportedSchema(schema.clone()));
    }
    trace.validate().map_err(ReplayError::InvalidTrace)?;

    let dom = DomModel::new(layout.clone(), *width).with_scroll(*scroll);
    let mut nav = NavController::attach(dom, config.clone())?;

    let mut checkpoints: u64 = 0;
    let mut chain: u64 = 0;
    let mut first_mismatch = None;

    for record in &trace.records {
        match record {
            TraceRecord::Input { ts_ms, event } => {
                if let NavEvent::Resize { width } | NavEvent::OrientationChange { width } = *event
                {
                    nav.surface_mut().set_viewport_width(width);
                }
                nav.set_time(Duration::from_millis(*ts_ms));
                nav.handle(*event);
            }
            TraceRecord::Tick { ts_ms } => nav.set_time(Duration::from_millis(*ts_ms)),
            TraceRecord::Checkpoint {
                idx,
                checksum: expected,
                ..
            } => {
                let actual = nav.surface().checksum();
                chain = fnv1a64_pair(chain, actual);
                if actual != *expected && first_mismatch.is_none() {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(idx, expected, actual, "replay checkpoint mismatch");
                    first_mismatch = Some(ReplayMismatch {
                        idx: *idx,
                        expected: *expected,
                        actual,
                    });
                }
                checkpoints += 1;
            }
            TraceRecord::Header { .. } | TraceRecord::Summary { .. } => {}
        }
    }

    Ok(ReplayResult {
        total_checkpoints: checkpoints,
        final_checksum_chain: chain,
        first_mismatch,
    })
}

/// A JSONL line that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceParseError {
    pub line: usize,
    pub message: String,
}

impl core::fmt::Display for TraceParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for TraceParseError {}

/// Structural problems found by [`SessionTrace::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceValidationError {
    EmptyTrace,
    HeaderNotFirst,
    MultipleHeaders,
    MissingSummary,
    SummaryNotLast { summary_index: usize },
    CheckpointIndexMismatch { expected: u64, actual: u64 },
    TimeWentBackwards { record_index: usize },
    SummaryCountMismatch { expected: u64, actual: u64 },
    SummaryChainMismatch { expected: u64, actual: u64 },
}

impl core::fmt::Display for TraceValidationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptyTrace => write!(f, "trace is empty"),
            Self::HeaderNotFirst => write!(f, "first record is not a header"),
            Self::MultipleHeaders => write!(f, "trace has more than one header"),
            Self::MissingSummary => write!(f, "trace missing summary record"),
            Self::SummaryNotLast { summary_index } => {
                write!(f, "summary at record {summary_index} is not last")
            }
            Self::CheckpointIndexMismatch { expected, actual } => {
                write!(f, "checkpoint index {actual}, expected {expected}")
            }
            Self::TimeWentBackwards { record_index } => {
                write!(f, "timestamp decreases at record {record_index}")
            }
            Self::SummaryCountMismatch { expected, actual } => {
                write!(f, "summary counts {actual} checkpoints, trace has {expected}")
            }
            Self::SummaryChainMismatch { expected, actual } => write!(
                f,
                "summary chain {actual:#018x} does not match last checkpoint {expected:#018x}"
            ),
        }
    }
}

impl std::error::Error for TraceValidationError {}

/// Parse or validation failure when loading a trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceLoadError {
    Parse(TraceParseError),
    Invalid(TraceValidationError),
}

impl core::fmt::Display for TraceLoadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "parse error: {e}"),
            Self::Invalid(e) => write!(f, "invalid trace: {e}"),
        }
    }
}

impl std::error::Error for TraceLoadError {}

impl From<TraceParseError> for TraceLoadError {
    fn from(e: TraceParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<TraceValidationError> for TraceLoadError {
    fn from(e: TraceValidationError) -> Self {
        Self::Invalid(e)
    }
}

//! Reporting sink trait
//!
//! The reconciler never prints. Plan lines, diagnostics and per-action results
//! go through a [`ReportSink`] so the caller decides how they are shown.

use crate::planner::Action;
use crate::types::ApplyResult;

/// Receives everything a run wants the operator to see
pub trait ReportSink {
    /// One plan line (`create usergroup: eng`, `  + user alice`, ...)
    fn line(&mut self, line: &str);

    /// A non-fatal problem, e.g. an unresolved username
    fn diagnostic(&mut self, message: &str);

    /// Called after each executed action
    fn on_action_complete(&mut self, _action: &Action, _result: &ApplyResult) {}
}

/// Sink that discards everything
pub struct NoReport;

impl ReportSink for NoReport {
    fn line(&mut self, _line: &str) {}
    fn diagnostic(&mut self, _message: &str) {}
}

/// Sink that keeps everything in memory
#[derive(Debug, Default)]
pub struct BufferSink {
    pub lines: Vec<String>,
    pub diagnostics: Vec<String>,
    pub results: Vec<(String, ApplyResult)>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportSink for BufferSink {
    fn line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn diagnostic(&mut self, message: &str) {
        self.diagnostics.push(message.to_string());
    }

    fn on_action_complete(&mut self, action: &Action, result: &ApplyResult) {
        self.results.push((action.to_string(), result.clone()));
    }
}

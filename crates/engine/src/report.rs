//! Report values and the serialisable success/error payload.

use serde::{Deserialize, Serialize};

use market_report_core::{EngineError, ErrorKind};

use crate::profile::ProfileKind;

/// A rendered report. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub profile: ProfileKind,
    pub symbol: String,
    pub text: String,
}

/// Outcome of a report request with a distinct error channel.
///
/// Serialises as `{"status":"ok",...}` or
/// `{"status":"error","kind":...,"message":...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportPayload {
    Ok {
        profile: ProfileKind,
        symbol: String,
        report: String,
    },
    Error {
        kind: ErrorKind,
        message: String,
    },
}

impl ReportPayload {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// # Errors
    /// Propagates `serde_json` failures.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<Report> for ReportPayload {
    fn from(report: Report) -> Self {
        Self::Ok {
            profile: report.profile,
            symbol: report.symbol,
            report: report.text,
        }
    }
}

impl From<EngineError> for ReportPayload {
    fn from(error: EngineError) -> Self {
        Self::Error {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl From<Result<Report, EngineError>> for ReportPayload {
    fn from(result: Result<Report, EngineError>) -> Self {
        match result {
            Ok(report) => report.into(),
            Err(error) => error.into(),
        }
    }
}

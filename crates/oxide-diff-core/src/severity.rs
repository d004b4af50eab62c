//! Severity classification of a generated migration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Process exit code for a comparison that did not complete.
pub const FATAL_EXIT_CODE: u8 = 10;

/// How risky it is to apply a diff, from harmless to destructive.
///
/// The derive order is the risk order, so `max` aggregates.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Schemas are identical.
    #[default]
    NoChange,
    /// Only additive or metadata changes.
    Safe,
    /// Index removal or rebuild; queries may slow down.
    PerfRisk,
    /// Reserved: changes that break existing queries. No comparison rule
    /// produces it.
    BrokenRequest,
    /// A column type or collation changes; data may be reinterpreted.
    DataAlteration,
    /// A table or column is dropped.
    DataLoss,
}

impl Severity {
    /// All severities in ascending order.
    pub const ALL: [Self; 6] = [
        Self::NoChange,
        Self::Safe,
        Self::PerfRisk,
        Self::BrokenRequest,
        Self::DataAlteration,
        Self::DataLoss,
    ];

    /// Returns the process exit code for this severity.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::NoChange => 0,
            Self::Safe => 1,
            Self::PerfRisk => 2,
            Self::BrokenRequest => 3,
            Self::DataAlteration => 4,
            Self::DataLoss => 5,
        }
    }

    /// Returns the more severe of `self` and `other`.
    #[must_use]
    pub fn raise(self, other: Self) -> Self {
        self.max(other)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoChange => "no_change",
            Self::Safe => "safe",
            Self::PerfRisk => "perf_risk",
            Self::BrokenRequest => "broken_request",
            Self::DataAlteration => "data_alteration",
            Self::DataLoss => "data_loss",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

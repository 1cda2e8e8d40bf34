//! Log detail flags carried by request and response specifications.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A part of an exchange that may be logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogDetail {
    /// Resolved request URL.
    Uri,
    /// Request or response body.
    Body,
    /// Request headers.
    Headers,
    /// Response status line.
    Status,
    /// Everything above.
    All,
}

impl fmt::Display for LogDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uri => "uri",
            Self::Body => "body",
            Self::Headers => "headers",
            Self::Status => "status",
            Self::All => "all",
        };
        f.write_str(name)
    }
}

/// Set of [`LogDetail`]s. Composition only ever adds flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LogFlags(BTreeSet<LogDetail>);

impl LogFlags {
    /// No logging.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Log everything.
    #[must_use]
    pub fn all() -> Self {
        [LogDetail::All].into_iter().collect()
    }

    /// Returns a copy with `detail` added.
    #[must_use]
    pub fn with(mut self, detail: LogDetail) -> Self {
        self.0.insert(detail);
        self
    }

    /// Adds a detail.
    pub fn insert(&mut self, detail: LogDetail) {
        self.0.insert(detail);
    }

    /// Union of both sets.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self(self.0.union(&other.0).copied().collect())
    }

    /// Returns true if `detail` should be logged. `All` implies every detail.
    #[must_use]
    pub fn contains(&self, detail: LogDetail) -> bool {
        self.0.contains(&LogDetail::All) || self.0.contains(&detail)
    }

    /// Returns true if nothing is logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the flags as stored.
    pub fn iter(&self) -> impl Iterator<Item = LogDetail> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<LogDetail> for LogFlags {
    fn from_iter<I: IntoIterator<Item = LogDetail>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

//! Shared serializable value types used across the dispatcher layers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a backend worker instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(pub String);

impl WorkerId {
    /// Create a worker id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkerId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Opaque identifier of the collection a workload event belongs to.
///
/// Trace sources emit these as strings or integers; both are carried as an
/// opaque string and never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(pub String);

impl CollectionId {
    /// Create a collection id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CollectionId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for CollectionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Event urgency on the cluster-trace scale: 0 is the most urgent, 11 the
/// least. Batch processing orders events by ascending value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    /// Largest (least urgent) priority value accepted.
    pub const MAX_VALUE: u8 = 11;

    /// Most urgent priority (value 0).
    #[must_use]
    pub const fn highest() -> Self {
        Self(0)
    }

    /// Least urgent priority (value 11).
    #[must_use]
    pub const fn lowest() -> Self {
        Self(Self::MAX_VALUE)
    }

    /// Build a priority, rejecting values outside `0..=11`.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX_VALUE {
            Some(Self(value))
        } else {
            None
        }
    }

    /// The raw priority value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self(0)
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("priority {value} out of range 0..=11"))
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> Self {
        p.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resource request carried by a workload event: CPU and memory in the
/// trace's normalized units. Both components are non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequest {
    /// Requested CPU units.
    pub cpus: f64,
    /// Requested memory units.
    pub memory: f64,
}

impl ResourceRequest {
    /// Zero-sized request.
    pub const ZERO: Self = Self {
        cpus: 0.0,
        memory: 0.0,
    };

    /// Build a request, rejecting negative or non-finite components.
    #[must_use]
    pub fn new(cpus: f64, memory: f64) -> Option<Self> {
        if cpus.is_finite() && memory.is_finite() && cpus >= 0.0 && memory >= 0.0 {
            Some(Self { cpus, memory })
        } else {
            None
        }
    }
}

impl Default for ResourceRequest {
    fn default() -> Self {
        Self::ZERO
    }
}

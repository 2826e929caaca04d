use serde::Serialize;
use std::fmt;

/// 1-based queue identity, stable for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct QueueId(pub usize);

/// 1-based server identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ServerId(pub usize);

impl QueueId {
    pub fn from_index(index: usize) -> Self {
        Self(index + 1)
    }

    pub fn index(&self) -> usize {
        self.0 - 1
    }
}

impl ServerId {
    pub fn from_index(index: usize) -> Self {
        Self(index + 1)
    }

    pub fn index(&self) -> usize {
        self.0 - 1
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue {}", self.0)
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "server {}", self.0)
    }
}

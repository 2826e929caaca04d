use slot_lab_abstract::ConfigError;
use thiserror::Error;

use crate::ids::QueueId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    /// The scheduler tried to serve a queue with nothing pending.
    #[error("attempted to pop from empty {0}")]
    EmptyQueue(QueueId),
    #[error("cannot average over zero slots")]
    ZeroSlots,
    #[error("need at least {needed} samples for this statistic, have {have}")]
    TooFewSamples { needed: usize, have: usize },
}

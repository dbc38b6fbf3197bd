use crate::error::{Result, RetroError};
use serde::{Deserialize, Serialize};

/// Per-participant vote quota across a whole board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct VoteLimit(u32);

impl VoteLimit {
    /// Creates a quota; zero and negative values are rejected
    pub fn new(max: i64) -> Result<Self> {
        if max <= 0 {
            return Err(RetroError::bad_request(format!(
                "maxVotesPerPerson must be positive, got {}",
                max
            )));
        }
        u32::try_from(max)
            .map(Self)
            .map_err(|_| RetroError::bad_request(format!("maxVotesPerPerson too large: {}", max)))
    }

    pub fn max(&self) -> u32 {
        self.0
    }

    pub fn remaining(&self, used: u32) -> u32 {
        self.0.saturating_sub(used)
    }

    pub fn is_exceeded(&self, used: u32) -> bool {
        used >= self.0
    }
}

impl TryFrom<i64> for VoteLimit {
    type Error = RetroError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<VoteLimit> for u32 {
    fn from(limit: VoteLimit) -> Self {
        limit.0
    }
}

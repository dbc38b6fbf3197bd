use crate::{
    domain::event::DomainEvent,
    error::{Result, RetroError},
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Facilitator-controlled countdown shared by everyone on a board
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Timer {
    #[default]
    Idle,
    Running {
        duration_seconds: u32,
        ends_at: DateTime<Utc>,
    },
    Paused {
        duration_seconds: u32,
        remaining_seconds: u32,
    },
}

impl Timer {
    /// Starts (or restarts) the countdown
    pub fn start(&mut self, duration_seconds: u32, now: DateTime<Utc>) -> Result<DomainEvent> {
        if duration_seconds == 0 {
            return Err(RetroError::bad_request("Timer duration must be positive"));
        }
        let ends_at = now + Duration::seconds(i64::from(duration_seconds));
        *self = Self::Running {
            duration_seconds,
            ends_at,
        };
        Ok(DomainEvent::TimerStarted {
            duration_seconds,
            ends_at,
        })
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<DomainEvent> {
        match *self {
            Self::Running {
                duration_seconds, ..
            } => {
                let remaining_seconds = self.remaining_seconds(now).unwrap_or(0);
                *self = Self::Paused {
                    duration_seconds,
                    remaining_seconds,
                };
                Ok(DomainEvent::TimerPaused { remaining_seconds })
            }
            _ => Err(RetroError::bad_request("Timer is not running")),
        }
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<DomainEvent> {
        match *self {
            Self::Paused {
                duration_seconds,
                remaining_seconds,
            } => {
                let ends_at = now + Duration::seconds(i64::from(remaining_seconds));
                *self = Self::Running {
                    duration_seconds,
                    ends_at,
                };
                Ok(DomainEvent::TimerResumed {
                    remaining_seconds,
                    ends_at,
                })
            }
            _ => Err(RetroError::bad_request("Timer is not paused")),
        }
    }

    pub fn reset(&mut self) -> Result<DomainEvent> {
        if *self == Self::Idle {
            return Err(RetroError::bad_request("Timer is not set"));
        }
        *self = Self::Idle;
        Ok(DomainEvent::TimerReset {})
    }

    /// Seconds left, or `None` while idle
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> Option<u32> {
        match self {
            Self::Idle => None,
            Self::Running { ends_at, .. } => {
                let left = (*ends_at - now).num_seconds().max(0);
                Some(u32::try_from(left).unwrap_or(u32::MAX))
            }
            Self::Paused {
                remaining_seconds, ..
            } => Some(*remaining_seconds),
        }
    }
}

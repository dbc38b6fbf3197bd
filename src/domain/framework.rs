use crate::error::{Result, RetroError};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A fixed column template: name and display color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnTemplate {
    pub name: &'static str,
    pub color: &'static str,
}

const fn template(name: &'static str, color: &'static str) -> ColumnTemplate {
    ColumnTemplate { name, color }
}

const KPT: &[ColumnTemplate] = &[
    template("Keep", "#22c55e"),
    template("Problem", "#ef4444"),
    template("Try", "#3b82f6"),
];

const FUN_DONE_LEARN: &[ColumnTemplate] = &[
    template("Fun", "#f59e0b"),
    template("Done", "#22c55e"),
    template("Learn", "#3b82f6"),
];

const FOUR_LS: &[ColumnTemplate] = &[
    template("Liked", "#22c55e"),
    template("Learned", "#3b82f6"),
    template("Lacked", "#ef4444"),
    template("Longed For", "#a855f7"),
];

const START_STOP_CONTINUE: &[ColumnTemplate] = &[
    template("Start", "#22c55e"),
    template("Stop", "#ef4444"),
    template("Continue", "#3b82f6"),
];

/// Retrospective format; decides the board's columns at creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Framework {
    Kpt,
    FunDoneLearn,
    FourLs,
    StartStopContinue,
}

impl Framework {
    pub const ALL: [Framework; 4] = [
        Framework::Kpt,
        Framework::FunDoneLearn,
        Framework::FourLs,
        Framework::StartStopContinue,
    ];

    /// Ordered column templates; order and colors are part of the contract
    pub fn columns(self) -> &'static [ColumnTemplate] {
        match self {
            Self::Kpt => KPT,
            Self::FunDoneLearn => FUN_DONE_LEARN,
            Self::FourLs => FOUR_LS,
            Self::StartStopContinue => START_STOP_CONTINUE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kpt => "KPT",
            Self::FunDoneLearn => "FUN_DONE_LEARN",
            Self::FourLs => "FOUR_LS",
            Self::StartStopContinue => "START_STOP_CONTINUE",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Framework {
    type Err = RetroError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_uppercase();
        Framework::ALL
            .into_iter()
            .find(|framework| framework.as_str() == normalized)
            .ok_or_else(|| RetroError::bad_request(format!("Invalid framework '{}'", s)))
    }
}

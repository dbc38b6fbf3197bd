//! # Retroboard Core
//!
//! Collaboration engine for team retrospective boards.
//!
//! Boards move through a fixed sequence of phases (writing, voting,
//! discussion, action items, closed) under the control of a single
//! facilitator. Cards, votes, memos, the timer and action items are gated
//! by the current phase, and every committed change is published as a
//! domain event on a per-board topic for realtime clients.
//!
//! The crate has no transport of its own: a server wires a [`Storage`]
//! backend and an [`EventPublisher`] into a [`RetroService`] and forwards
//! [`realtime::BroadcastMessage`]s to its websocket sessions.

pub mod config;
pub mod domain;
pub mod error;
pub mod realtime;
pub mod service;
pub mod storage;
pub mod telemetry;

// Re-export commonly used types
pub use config::{Limits, RetroConfig};
pub use domain::{
    Board, BoardDraft, Card, Category, DomainEvent, EventEnvelope, Framework, Participant, Phase,
    Slug, VoteLimit,
};
pub use error::{ErrorKind, Result, RetroError};
pub use realtime::{ChannelPublisher, EventPublisher};
pub use service::{BoardSnapshot, RetroService};
pub use storage::Storage;

//! YogaFlow - Yoga Practice Tracking Backend
//!
//! An open-source, self-hosted backend for yoga practice applications.
//! Turns submitted practice sessions into experience points, levels,
//! streaks, achievements, daily challenges, and a leaderboard, persisted
//! in SQLite and exposed over a small HTTP API.

pub mod gamification;
pub mod server;
pub mod storage;

// Re-export commonly used types
pub use gamification::engine::ProgressEngine;
pub use gamification::types::{SessionSubmission, UserProgress};
pub use storage::database::Database;

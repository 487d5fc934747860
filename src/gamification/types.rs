//! Core data types for gamified progress tracking.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// A user's cumulative practice progress.
///
/// One record per user, created lazily on first access. `xp_total` and
/// `level` never decrease; `poses_practiced` only grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProgress {
    /// Opaque stable user identifier (assigned by the auth layer)
    pub user_id: String,
    /// Current level, 1..=10
    pub level: u8,
    /// Cumulative experience points
    pub xp_total: u32,
    /// Consecutive calendar days with at least one session
    pub current_streak_days: u32,
    /// Longest streak ever reached
    pub longest_streak_days: u32,
    /// Date of the most recent counted session
    pub last_practice_date: Option<NaiveDate>,
    /// Total number of submitted sessions
    pub sessions_completed: u32,
    /// Total practice time across all sessions
    pub total_practice_seconds: u64,
    /// Every pose name this user has ever logged
    pub poses_practiced: BTreeSet<String>,
    /// Record creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl UserProgress {
    /// Create a zero-state progress record for a new user.
    pub fn new(user_id: String, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            level: 1,
            xp_total: 0,
            current_streak_days: 0,
            longest_streak_days: 0,
            last_practice_date: None,
            sessions_completed: 0,
            total_practice_seconds: 0,
            poses_practiced: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Feedback counters collected during a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackCounts {
    pub positive: u32,
    pub negative: u32,
    pub neutral: u32,
}

/// An immutable record of one completed practice session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseSession {
    /// Unique identifier, assigned at submission time
    pub session_id: Uuid,
    pub user_id: String,
    pub pose_name: String,
    /// Session length in seconds, always > 0
    pub duration_seconds: u32,
    /// Classifier accuracy for the session, in [0, 1]
    pub accuracy: f64,
    pub feedback_counts: FeedbackCounts,
    pub recorded_at: DateTime<Utc>,
}

/// Session facts submitted by the caller after classification has happened.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSubmission {
    pub user_id: String,
    pub pose_name: String,
    pub duration_seconds: u32,
    pub accuracy: f64,
    #[serde(default)]
    pub feedback_counts: FeedbackCounts,
}

/// Result of submitting a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionOutcome {
    pub session_id: Uuid,
    pub progress_after: UserProgress,
    pub xp_gained: u32,
    pub xp_breakdown: crate::gamification::xp::XpBreakdown,
    pub leveled_up: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_level: Option<u8>,
    pub achievements_unlocked: Vec<String>,
}

/// Result of completing a daily challenge.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChallengeOutcome {
    /// True when this (user, date) pair had already been recorded
    pub already_completed: bool,
    /// XP granted by this call; zero on repeat completions
    pub reward_xp_granted: u32,
}

/// An achievement unlocked by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAchievement {
    pub user_id: String,
    pub achievement_id: String,
    pub unlocked_at: DateTime<Utc>,
}

/// The challenge active for one calendar date, shared across all users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyChallenge {
    pub challenge_date: NaiveDate,
    pub name: String,
    pub description: String,
    pub target_pose: String,
    pub target_minutes: u32,
    pub reward_xp: u32,
}

/// Aggregated statistics for one user.
#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub progress: UserProgress,
    /// Mean accuracy over recent sessions, rounded to 2 decimals
    pub average_accuracy: f64,
    /// Most practiced pose, if any sessions exist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite_pose: Option<String>,
    pub sessions_this_week: u32,
    pub minutes_this_week: u64,
    pub level_title: String,
    pub level_description: String,
    /// XP remaining until the next level; absent at the ceiling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_level_xp: Option<u32>,
    pub achievements_unlocked: u32,
    pub achievements_available: u32,
}

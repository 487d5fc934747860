//! XP and streak calculation.
//!
//! Pure functions only: given the submitted session facts and the user's
//! prior progress, compute the XP delta and the updated streak counters.
//! The engine applies the result; nothing here touches storage.

use chrono::NaiveDate;
use serde::Serialize;

use super::types::UserProgress;

/// Base XP awarded for every session.
const BASE_XP: u32 = 10;
/// Maximum XP from the accuracy bonus.
const ACCURACY_BONUS_CAP: u32 = 20;
/// Maximum XP from the streak bonus.
const STREAK_BONUS_CAP: u32 = 20;
/// XP awarded the first time a user logs a pose.
const NEW_POSE_XP: u32 = 25;

/// Per-component XP awarded for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct XpBreakdown {
    pub base: u32,
    pub duration_bonus: u32,
    pub accuracy_bonus: u32,
    pub streak_bonus: u32,
    pub new_pose_bonus: u32,
}

impl XpBreakdown {
    /// Total XP delta for the session.
    pub fn total(&self) -> u32 {
        self.base + self.duration_bonus + self.accuracy_bonus + self.streak_bonus
            + self.new_pose_bonus
    }
}

/// Everything a session earns: XP components plus updated streak state.
#[derive(Debug, Clone, Copy)]
pub struct SessionCredit {
    pub breakdown: XpBreakdown,
    pub current_streak_days: u32,
    pub longest_streak_days: u32,
    pub last_practice_date: NaiveDate,
    /// True when this is the first time the user logged this pose
    pub first_time_pose: bool,
}

/// Evaluate a session against the user's prior progress.
///
/// The streak is advanced for `session_date` first; the streak bonus is
/// then computed from the post-update value, so the first day of a new
/// streak earns the minimum bonus.
pub fn evaluate_session(
    prior: &UserProgress,
    pose_name: &str,
    duration_seconds: u32,
    accuracy: f64,
    session_date: NaiveDate,
) -> SessionCredit {
    let current_streak_days = advance_streak(
        prior.last_practice_date,
        prior.current_streak_days,
        session_date,
    );
    let longest_streak_days = prior.longest_streak_days.max(current_streak_days);

    let first_time_pose = !prior.poses_practiced.contains(pose_name);

    let breakdown = XpBreakdown {
        base: BASE_XP,
        duration_bonus: duration_seconds / 60,
        accuracy_bonus: accuracy_bonus(accuracy),
        streak_bonus: STREAK_BONUS_CAP.min(2 * current_streak_days),
        new_pose_bonus: if first_time_pose { NEW_POSE_XP } else { 0 },
    };

    SessionCredit {
        breakdown,
        current_streak_days,
        longest_streak_days,
        last_practice_date: session_date,
        first_time_pose,
    }
}

/// Advance the streak counter for a session on `session_date`.
///
/// Consecutive day: increment. Same day: unchanged. Gap of two or more
/// days, or first ever session: reset to 1.
fn advance_streak(
    last_practice_date: Option<NaiveDate>,
    current_streak_days: u32,
    session_date: NaiveDate,
) -> u32 {
    match last_practice_date {
        Some(last) => {
            let days_diff = (session_date - last).num_days();
            if days_diff == 0 {
                current_streak_days
            } else if days_diff == 1 {
                current_streak_days + 1
            } else {
                1
            }
        }
        None => 1,
    }
}

/// Accuracy bonus: clamp to [0, 1], scale to 20, round half away from zero.
fn accuracy_bonus(accuracy: f64) -> u32 {
    let clamped = accuracy.clamp(0.0, 1.0);
    (ACCURACY_BONUS_CAP as f64 * clamped).round() as u32
}

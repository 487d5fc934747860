//! Daily challenge generation.
//!
//! The challenge for a date is a pure function of the date, so every
//! caller (and every concurrent creator racing on first access) derives
//! the identical challenge.

use chrono::{Datelike, NaiveDate};

use super::types::DailyChallenge;

/// Pose pool challenges rotate through.
const CHALLENGE_POSES: &[&str] = &[
    "Mountain Pose",
    "Downward Dog",
    "Tree Pose",
    "Warrior II",
    "Triangle Pose",
    "Cobra Pose",
    "Child's Pose",
    "Bridge Pose",
    "Cat-Cow",
    "Seated Forward Bend",
];

/// Practice-minute targets, cycled alongside the pose pool.
const TARGET_MINUTES: &[u32] = &[5, 10, 15];

/// Derive the challenge for a calendar date.
pub fn challenge_for_date(date: NaiveDate) -> DailyChallenge {
    let ordinal = date.num_days_from_ce() as usize;
    let pose = CHALLENGE_POSES[ordinal % CHALLENGE_POSES.len()];
    let target_minutes = TARGET_MINUTES[ordinal % TARGET_MINUTES.len()];

    DailyChallenge {
        challenge_date: date,
        name: format!("Daily Focus: {}", pose),
        description: format!(
            "Practice {} for a total of {} minutes today",
            pose, target_minutes
        ),
        target_pose: pose.to_string(),
        target_minutes,
        reward_xp: 40 + 2 * target_minutes,
    }
}

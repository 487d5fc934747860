//! Achievement catalog and unlock predicates.
//!
//! The catalog is static at runtime. Predicates are re-evaluated on every
//! submission against the user's current cumulative progress, so catalog
//! additions take effect retroactively for users who already qualify.

use serde::{Deserialize, Serialize};

use super::types::UserProgress;

/// Achievement category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    /// Session-count achievements
    Practice,
    /// Pose-variety achievements
    Pose,
    /// Accumulated practice-time achievements
    Time,
    /// Consistency achievements
    Streak,
}

/// What a user must reach for an achievement to unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "target")]
pub enum Requirement {
    /// Total submitted sessions
    SessionsCompleted(u32),
    /// Current streak length in days
    StreakDays(u32),
    /// Number of distinct poses ever logged
    PosesPracticed(u32),
    /// Total practice time in minutes
    PracticeMinutes(u32),
}

impl Requirement {
    /// Check the requirement against current cumulative progress.
    pub fn is_met(&self, progress: &UserProgress) -> bool {
        match *self {
            Requirement::SessionsCompleted(target) => progress.sessions_completed >= target,
            Requirement::StreakDays(target) => progress.current_streak_days >= target,
            Requirement::PosesPracticed(target) => {
                progress.poses_practiced.len() as u32 >= target
            }
            Requirement::PracticeMinutes(target) => {
                progress.total_practice_seconds / 60 >= u64::from(target)
            }
        }
    }
}

/// Achievement definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    /// Short stable identifier
    pub achievement_id: String,
    /// Display name
    pub name: String,
    /// Description
    pub description: String,
    /// Category
    pub category: AchievementCategory,
    /// Unlock requirement
    pub requirement: Requirement,
    /// XP value shown alongside the achievement
    pub reward_xp: u32,
    /// Icon name
    pub icon: String,
}

impl Achievement {
    /// Create a new achievement definition.
    pub fn new(
        id: &str,
        name: &str,
        description: &str,
        category: AchievementCategory,
        requirement: Requirement,
        reward_xp: u32,
    ) -> Self {
        Self {
            achievement_id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            category,
            requirement,
            reward_xp,
            icon: format!("achievement_{}", id),
        }
    }
}

/// Get all achievement definitions.
pub fn all_achievements() -> Vec<Achievement> {
    let mut achievements = Vec::new();

    achievements.extend(practice_achievements());
    achievements.extend(streak_achievements());
    achievements.extend(pose_achievements());
    achievements.extend(time_achievements());

    achievements
}

fn practice_achievements() -> Vec<Achievement> {
    vec![
        Achievement::new(
            "first_session",
            "First Steps",
            "Complete your first yoga session",
            AchievementCategory::Practice,
            Requirement::SessionsCompleted(1),
            50,
        ),
        Achievement::new(
            "sessions_10",
            "Finding Rhythm",
            "Complete 10 yoga sessions",
            AchievementCategory::Practice,
            Requirement::SessionsCompleted(10),
            100,
        ),
        Achievement::new(
            "sessions_50",
            "Devoted Yogi",
            "Complete 50 yoga sessions",
            AchievementCategory::Practice,
            Requirement::SessionsCompleted(50),
            250,
        ),
        Achievement::new(
            "sessions_100",
            "Century of Practice",
            "Complete 100 yoga sessions",
            AchievementCategory::Practice,
            Requirement::SessionsCompleted(100),
            500,
        ),
    ]
}

fn streak_achievements() -> Vec<Achievement> {
    vec![
        Achievement::new(
            "streak_3",
            "Three in a Row",
            "Practice for 3 days in a row",
            AchievementCategory::Streak,
            Requirement::StreakDays(3),
            75,
        ),
        Achievement::new(
            "week_streak",
            "Consistent Practice",
            "Practice for 7 days in a row",
            AchievementCategory::Streak,
            Requirement::StreakDays(7),
            200,
        ),
        Achievement::new(
            "streak_30",
            "Monthly Devotion",
            "Practice for 30 days in a row",
            AchievementCategory::Streak,
            Requirement::StreakDays(30),
            500,
        ),
    ]
}

fn pose_achievements() -> Vec<Achievement> {
    vec![
        Achievement::new(
            "pose_explorer",
            "Pose Explorer",
            "Try 5 different poses",
            AchievementCategory::Pose,
            Requirement::PosesPracticed(5),
            100,
        ),
        Achievement::new(
            "pose_master",
            "Pose Master",
            "Master 10 different poses",
            AchievementCategory::Pose,
            Requirement::PosesPracticed(10),
            300,
        ),
        Achievement::new(
            "pose_collector",
            "Pose Collector",
            "Try 20 different poses",
            AchievementCategory::Pose,
            Requirement::PosesPracticed(20),
            500,
        ),
    ]
}

fn time_achievements() -> Vec<Achievement> {
    vec![
        Achievement::new(
            "hour_practice",
            "Hour of Power",
            "Practice for a total of 60 minutes",
            AchievementCategory::Time,
            Requirement::PracticeMinutes(60),
            150,
        ),
        Achievement::new(
            "time_5h",
            "Five Hour Flow",
            "Practice for a total of 5 hours",
            AchievementCategory::Time,
            Requirement::PracticeMinutes(300),
            300,
        ),
        Achievement::new(
            "time_20h",
            "Deep Practice",
            "Practice for a total of 20 hours",
            AchievementCategory::Time,
            Requirement::PracticeMinutes(1200),
            750,
        ),
    ]
}

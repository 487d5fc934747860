//! Gamified progress tracking: XP, levels, streaks, achievements,
//! daily challenges, and the leaderboard.

pub mod achievements;
pub mod challenge;
pub mod engine;
pub mod leaderboard;
pub mod levels;
pub mod types;
pub mod xp;

pub use achievements::{Achievement, AchievementCategory, Requirement};
pub use engine::{GamificationError, ProgressEngine};
pub use leaderboard::LeaderboardEntry;
pub use types::{
    ChallengeOutcome, DailyChallenge, FeedbackCounts, PoseSession, SessionOutcome,
    SessionSubmission, UserAchievement, UserProgress, UserStats,
};

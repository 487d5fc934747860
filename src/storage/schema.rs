//! Database schema definitions for YogaFlow.

/// SQL schema for creating all database tables.
pub const SCHEMA: &str = r#"
-- User progress table (one row per user, created lazily)
CREATE TABLE IF NOT EXISTS user_progress (
    user_id TEXT PRIMARY KEY,
    level INTEGER NOT NULL DEFAULT 1,
    xp_total INTEGER NOT NULL DEFAULT 0,
    current_streak_days INTEGER NOT NULL DEFAULT 0,
    longest_streak_days INTEGER NOT NULL DEFAULT 0,
    last_practice_date TEXT,
    sessions_completed INTEGER NOT NULL DEFAULT 0,
    total_practice_seconds INTEGER NOT NULL DEFAULT 0,
    poses_json TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Pose sessions table (append-only)
CREATE TABLE IF NOT EXISTS pose_sessions (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES user_progress(user_id),
    pose_name TEXT NOT NULL,
    duration_seconds INTEGER NOT NULL,
    accuracy REAL NOT NULL,
    feedback_json TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_pose_sessions_user_id ON pose_sessions(user_id);
CREATE INDEX IF NOT EXISTS idx_pose_sessions_recorded_at ON pose_sessions(recorded_at);

-- Unlocked achievements (at most one row per user/achievement pair)
CREATE TABLE IF NOT EXISTS user_achievements (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    achievement_id TEXT NOT NULL,
    unlocked_at TEXT NOT NULL,
    UNIQUE(user_id, achievement_id)
);

-- Daily challenges (one row per calendar date, fixed once written)
CREATE TABLE IF NOT EXISTS daily_challenges (
    challenge_date TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    target_pose TEXT NOT NULL,
    target_minutes INTEGER NOT NULL,
    reward_xp INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

-- Challenge completions (at most one row per user/date pair)
CREATE TABLE IF NOT EXISTS challenge_completions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    challenge_date TEXT NOT NULL REFERENCES daily_challenges(challenge_date),
    completed_at TEXT NOT NULL,
    UNIQUE(user_id, challenge_date)
);
"#;

/// SQL for creating the schema version tracking table.
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version.
pub const CURRENT_VERSION: i32 = 1;

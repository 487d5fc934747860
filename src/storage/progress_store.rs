//! Persistence for gamification data.
//!
//! Provides CRUD over the five logical collections:
//! - User progress snapshots
//! - Pose sessions (append-only)
//! - Unlocked achievements
//! - Daily challenges
//! - Challenge completions
//!
//! Uniqueness of (user_id, achievement_id) and (user_id, challenge_date)
//! is enforced by the schema; the insert helpers report whether a row was
//! actually created so double-grants are structurally impossible.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::gamification::types::{
    DailyChallenge, FeedbackCounts, PoseSession, UserAchievement, UserProgress,
};
use crate::storage::database::DatabaseError;

/// Store for persisting gamification data.
pub struct ProgressStore<'a> {
    conn: &'a Connection,
}

impl<'a> ProgressStore<'a> {
    /// Create a new store with the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    // ========== User Progress Operations ==========

    /// Get a user's progress snapshot.
    pub fn get_progress(&self, user_id: &str) -> Result<Option<UserProgress>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, level, xp_total, current_streak_days, longest_streak_days,
                    last_practice_date, sessions_completed, total_practice_seconds,
                    poses_json, created_at, updated_at
             FROM user_progress WHERE user_id = ?1",
        )?;

        let row = stmt
            .query_row(params![user_id], |row| {
                Ok(ProgressRow {
                    user_id: row.get(0)?,
                    level: row.get(1)?,
                    xp_total: row.get(2)?,
                    current_streak_days: row.get(3)?,
                    longest_streak_days: row.get(4)?,
                    last_practice_date: row.get(5)?,
                    sessions_completed: row.get(6)?,
                    total_practice_seconds: row.get(7)?,
                    poses_json: row.get(8)?,
                    created_at: row.get(9)?,
                    updated_at: row.get(10)?,
                })
            })
            .optional()?;

        row.map(ProgressRow::into_progress).transpose()
    }

    /// Insert or replace a user's progress snapshot.
    pub fn upsert_progress(&self, progress: &UserProgress) -> Result<(), DatabaseError> {
        let poses_json = serde_json::to_string(&progress.poses_practiced)?;

        self.conn.execute(
            "INSERT OR REPLACE INTO user_progress
             (user_id, level, xp_total, current_streak_days, longest_streak_days,
              last_practice_date, sessions_completed, total_practice_seconds,
              poses_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                progress.user_id,
                progress.level,
                progress.xp_total,
                progress.current_streak_days,
                progress.longest_streak_days,
                progress.last_practice_date.map(|d| d.to_string()),
                progress.sessions_completed,
                progress.total_practice_seconds as i64,
                poses_json,
                progress.created_at.to_rfc3339(),
                progress.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Get all progress snapshots (for leaderboard derivation).
    pub fn all_progress(&self) -> Result<Vec<UserProgress>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, level, xp_total, current_streak_days, longest_streak_days,
                    last_practice_date, sessions_completed, total_practice_seconds,
                    poses_json, created_at, updated_at
             FROM user_progress",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(ProgressRow {
                user_id: row.get(0)?,
                level: row.get(1)?,
                xp_total: row.get(2)?,
                current_streak_days: row.get(3)?,
                longest_streak_days: row.get(4)?,
                last_practice_date: row.get(5)?,
                sessions_completed: row.get(6)?,
                total_practice_seconds: row.get(7)?,
                poses_json: row.get(8)?,
                created_at: row.get(9)?,
                updated_at: row.get(10)?,
            })
        })?;

        let mut snapshots = Vec::new();
        for row in rows {
            snapshots.push(row?.into_progress()?);
        }

        Ok(snapshots)
    }

    // ========== Pose Session Operations ==========

    /// Append an immutable session record.
    pub fn insert_session(&self, session: &PoseSession) -> Result<(), DatabaseError> {
        let feedback_json = serde_json::to_string(&session.feedback_counts)?;

        self.conn.execute(
            "INSERT INTO pose_sessions
             (id, user_id, pose_name, duration_seconds, accuracy, feedback_json, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                session.session_id.to_string(),
                session.user_id,
                session.pose_name,
                session.duration_seconds,
                session.accuracy,
                feedback_json,
                session.recorded_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Get a user's sessions, newest first.
    pub fn recent_sessions(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<PoseSession>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, pose_name, duration_seconds, accuracy, feedback_json, recorded_at
             FROM pose_sessions
             WHERE user_id = ?1 ORDER BY recorded_at DESC LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![user_id, limit], |row| {
            Ok(SessionRow {
                id: row.get(0)?,
                user_id: row.get(1)?,
                pose_name: row.get(2)?,
                duration_seconds: row.get(3)?,
                accuracy: row.get(4)?,
                feedback_json: row.get(5)?,
                recorded_at: row.get(6)?,
            })
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?.into_session()?);
        }

        Ok(sessions)
    }

    // ========== Achievement Operations ==========

    /// Get the achievements a user has unlocked, oldest first.
    pub fn unlocked_achievements(
        &self,
        user_id: &str,
    ) -> Result<Vec<UserAchievement>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, achievement_id, unlocked_at
             FROM user_achievements WHERE user_id = ?1 ORDER BY unlocked_at ASC, id ASC",
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut achievements = Vec::new();
        for row in rows {
            let (user_id, achievement_id, unlocked_at) = row?;
            achievements.push(UserAchievement {
                user_id,
                achievement_id,
                unlocked_at: parse_timestamp(&unlocked_at)?,
            });
        }

        Ok(achievements)
    }

    /// Record an achievement unlock.
    ///
    /// Returns false when the (user, achievement) pair already exists;
    /// the unique key guarantees at most one row per pair.
    pub fn record_achievement(
        &self,
        user_id: &str,
        achievement_id: &str,
        unlocked_at: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO user_achievements (user_id, achievement_id, unlocked_at)
             VALUES (?1, ?2, ?3)",
            params![user_id, achievement_id, unlocked_at.to_rfc3339()],
        )?;

        Ok(inserted > 0)
    }

    // ========== Daily Challenge Operations ==========

    /// Get the challenge stored for a date.
    pub fn get_challenge(&self, date: NaiveDate) -> Result<Option<DailyChallenge>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT challenge_date, name, description, target_pose, target_minutes, reward_xp
             FROM daily_challenges WHERE challenge_date = ?1",
        )?;

        let row = stmt
            .query_row(params![date.to_string()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, u32>(4)?,
                    row.get::<_, u32>(5)?,
                ))
            })
            .optional()?;

        row.map(
            |(date_str, name, description, target_pose, target_minutes, reward_xp)| {
                Ok(DailyChallenge {
                    challenge_date: parse_date(&date_str)?,
                    name,
                    description,
                    target_pose,
                    target_minutes,
                    reward_xp,
                })
            },
        )
        .transpose()
    }

    /// Materialize a challenge for its date.
    ///
    /// First writer wins; concurrent creators derive the same challenge
    /// deterministically, so converging on the stored row is safe.
    pub fn insert_challenge(
        &self,
        challenge: &DailyChallenge,
        created_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO daily_challenges
             (challenge_date, name, description, target_pose, target_minutes, reward_xp, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                challenge.challenge_date.to_string(),
                challenge.name,
                challenge.description,
                challenge.target_pose,
                challenge.target_minutes,
                challenge.reward_xp,
                created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Record a challenge completion.
    ///
    /// Returns false when the (user, date) pair was already recorded.
    pub fn record_completion(
        &self,
        user_id: &str,
        date: NaiveDate,
        completed_at: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO challenge_completions (user_id, challenge_date, completed_at)
             VALUES (?1, ?2, ?3)",
            params![user_id, date.to_string(), completed_at.to_rfc3339()],
        )?;

        Ok(inserted > 0)
    }
}

/// Intermediate struct for reading progress rows from database.
struct ProgressRow {
    user_id: String,
    level: u8,
    xp_total: u32,
    current_streak_days: u32,
    longest_streak_days: u32,
    last_practice_date: Option<String>,
    sessions_completed: u32,
    total_practice_seconds: i64,
    poses_json: String,
    created_at: String,
    updated_at: String,
}

impl ProgressRow {
    fn into_progress(self) -> Result<UserProgress, DatabaseError> {
        let poses_practiced: BTreeSet<String> = serde_json::from_str(&self.poses_json)
            .map_err(|e| {
                DatabaseError::DeserializationError(format!("Invalid poses JSON: {}", e))
            })?;

        let last_practice_date = self
            .last_practice_date
            .as_deref()
            .map(parse_date)
            .transpose()?;

        Ok(UserProgress {
            user_id: self.user_id,
            level: self.level,
            xp_total: self.xp_total,
            current_streak_days: self.current_streak_days,
            longest_streak_days: self.longest_streak_days,
            last_practice_date,
            sessions_completed: self.sessions_completed,
            total_practice_seconds: self.total_practice_seconds as u64,
            poses_practiced,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

/// Intermediate struct for reading session rows from database.
struct SessionRow {
    id: String,
    user_id: String,
    pose_name: String,
    duration_seconds: u32,
    accuracy: f64,
    feedback_json: String,
    recorded_at: String,
}

impl SessionRow {
    fn into_session(self) -> Result<PoseSession, DatabaseError> {
        let session_id = Uuid::parse_str(&self.id)
            .map_err(|e| DatabaseError::DeserializationError(format!("Invalid UUID: {}", e)))?;

        let feedback_counts: FeedbackCounts =
            serde_json::from_str(&self.feedback_json).map_err(|e| {
                DatabaseError::DeserializationError(format!("Invalid feedback JSON: {}", e))
            })?;

        Ok(PoseSession {
            session_id,
            user_id: self.user_id,
            pose_name: self.pose_name,
            duration_seconds: self.duration_seconds,
            accuracy: self.accuracy,
            feedback_counts,
            recorded_at: parse_timestamp(&self.recorded_at)?,
        })
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::DeserializationError(format!("Invalid timestamp: {}", e)))
}

fn parse_date(s: &str) -> Result<NaiveDate, DatabaseError> {
    s.parse()
        .map_err(|e| DatabaseError::DeserializationError(format!("Invalid date: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::Database;

    fn session(user_id: &str, pose: &str, recorded_at: &str) -> PoseSession {
        PoseSession {
            session_id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            pose_name: pose.to_string(),
            duration_seconds: 300,
            accuracy: 0.8,
            feedback_counts: FeedbackCounts {
                positive: 3,
                negative: 1,
                neutral: 0,
            },
            recorded_at: DateTime::parse_from_rfc3339(recorded_at)
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn test_progress_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let store = ProgressStore::new(db.connection());

        let mut progress = UserProgress::new("yogi-1".to_string(), Utc::now());
        progress.level = 3;
        progress.xp_total = 420;
        progress.current_streak_days = 4;
        progress.longest_streak_days = 9;
        progress.last_practice_date = Some("2025-06-01".parse().unwrap());
        progress.sessions_completed = 17;
        progress.total_practice_seconds = 5400;
        progress.poses_practiced.insert("Tree Pose".to_string());
        progress.poses_practiced.insert("Cobra Pose".to_string());

        store.upsert_progress(&progress).unwrap();
        let loaded = store.get_progress("yogi-1").unwrap().unwrap();

        assert_eq!(loaded.level, 3);
        assert_eq!(loaded.xp_total, 420);
        assert_eq!(loaded.current_streak_days, 4);
        assert_eq!(loaded.longest_streak_days, 9);
        assert_eq!(loaded.last_practice_date, progress.last_practice_date);
        assert_eq!(loaded.sessions_completed, 17);
        assert_eq!(loaded.total_practice_seconds, 5400);
        assert_eq!(loaded.poses_practiced.len(), 2);
        assert!(loaded.poses_practiced.contains("Tree Pose"));
    }

    #[test]
    fn test_get_progress_missing_user() {
        let db = Database::open_in_memory().unwrap();
        let store = ProgressStore::new(db.connection());
        assert!(store.get_progress("nobody").unwrap().is_none());
    }

    #[test]
    fn test_recent_sessions_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let store = ProgressStore::new(db.connection());

        // pose_sessions.user_id references user_progress(user_id); create the
        // parent rows every production caller establishes before inserting.
        store
            .upsert_progress(&UserProgress::new("yogi-1".to_string(), Utc::now()))
            .unwrap();
        store
            .upsert_progress(&UserProgress::new("yogi-2".to_string(), Utc::now()))
            .unwrap();

        store
            .insert_session(&session("yogi-1", "Tree Pose", "2025-06-01T08:00:00Z"))
            .unwrap();
        store
            .insert_session(&session("yogi-1", "Cobra Pose", "2025-06-03T08:00:00Z"))
            .unwrap();
        store
            .insert_session(&session("yogi-1", "Warrior II", "2025-06-02T08:00:00Z"))
            .unwrap();
        store
            .insert_session(&session("yogi-2", "Tree Pose", "2025-06-04T08:00:00Z"))
            .unwrap();

        let sessions = store.recent_sessions("yogi-1", 2).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].pose_name, "Cobra Pose");
        assert_eq!(sessions[1].pose_name, "Warrior II");
    }

    #[test]
    fn test_achievement_unlock_is_unique() {
        let db = Database::open_in_memory().unwrap();
        let store = ProgressStore::new(db.connection());
        let now = Utc::now();

        assert!(store.record_achievement("yogi-1", "first_session", now).unwrap());
        assert!(!store.record_achievement("yogi-1", "first_session", now).unwrap());
        // A different user is unaffected
        assert!(store.record_achievement("yogi-2", "first_session", now).unwrap());

        let unlocked = store.unlocked_achievements("yogi-1").unwrap();
        assert_eq!(unlocked.len(), 1);
        assert_eq!(unlocked[0].achievement_id, "first_session");
    }

    #[test]
    fn test_challenge_first_writer_wins() {
        let db = Database::open_in_memory().unwrap();
        let store = ProgressStore::new(db.connection());
        let date: NaiveDate = "2025-06-01".parse().unwrap();

        let mut first = crate::gamification::challenge::challenge_for_date(date);
        store.insert_challenge(&first, Utc::now()).unwrap();

        // A second writer with different content must not replace the row
        first.reward_xp = 9999;
        store.insert_challenge(&first, Utc::now()).unwrap();

        let stored = store.get_challenge(date).unwrap().unwrap();
        assert_ne!(stored.reward_xp, 9999);
    }

    #[test]
    fn test_completion_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let store = ProgressStore::new(db.connection());
        let date: NaiveDate = "2025-06-01".parse().unwrap();

        // challenge_completions.challenge_date references daily_challenges;
        // materialize the parent challenge row as the engine does first.
        let challenge = crate::gamification::challenge::challenge_for_date(date);
        store.insert_challenge(&challenge, Utc::now()).unwrap();

        assert!(store.record_completion("yogi-1", date, Utc::now()).unwrap());
        assert!(!store.record_completion("yogi-1", date, Utc::now()).unwrap());
    }
}

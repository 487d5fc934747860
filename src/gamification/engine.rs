//! Progress engine orchestration.
//!
//! The only component with business-rule authority: consumes the stores,
//! the achievement catalog, and the XP calculator, and exposes the public
//! gamification operations.
//!
//! Mutation of a single user's progress is serialized through a per-user
//! lock registry, and each submission runs as one database transaction,
//! so the read-compute-write sequence is atomic per user and a session
//! record is never persisted without its progress update.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uuid::Uuid;

use super::achievements::{self, Achievement};
use super::challenge;
use super::leaderboard::{self, LeaderboardEntry};
use super::levels;
use super::types::{
    ChallengeOutcome, DailyChallenge, PoseSession, SessionOutcome, SessionSubmission,
    UserAchievement, UserProgress, UserStats,
};
use super::xp;
use crate::storage::database::{Database, DatabaseError};
use crate::storage::progress_store::ProgressStore;

/// Gamification errors.
#[derive(Debug, Error)]
pub enum GamificationError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
}

/// Orchestrator for all gamified progress operations.
pub struct ProgressEngine {
    db: Mutex<Database>,
    catalog: Vec<Achievement>,
    user_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ProgressEngine {
    /// Create an engine over an opened database.
    pub fn new(db: Database) -> Self {
        Self {
            db: Mutex::new(db),
            catalog: achievements::all_achievements(),
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Get (or create) the mutual-exclusion scope for one user.
    fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().unwrap();
        locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Submit a completed practice session.
    pub fn submit_session(
        &self,
        submission: SessionSubmission,
    ) -> Result<SessionOutcome, GamificationError> {
        self.submit_session_at(submission, Utc::now())
    }

    /// Submit a completed practice session with an explicit clock.
    pub fn submit_session_at(
        &self,
        submission: SessionSubmission,
        now: DateTime<Utc>,
    ) -> Result<SessionOutcome, GamificationError> {
        let user_id = validate_user_id(&submission.user_id)?;
        let pose_name = submission.pose_name.trim();
        if pose_name.is_empty() {
            return Err(GamificationError::Validation(
                "pose_name must not be empty".to_string(),
            ));
        }
        if submission.duration_seconds == 0 {
            return Err(GamificationError::Validation(
                "duration_seconds must be positive".to_string(),
            ));
        }
        // Defensive normalization, not a hard failure
        let accuracy = submission.accuracy.clamp(0.0, 1.0);

        let lock = self.user_lock(user_id);
        let _guard = lock.lock().unwrap();

        let mut db = self.db.lock().unwrap();
        let tx = db.transaction()?;

        let outcome = {
            let store = ProgressStore::new(&tx);

            let mut progress = match store.get_progress(user_id)? {
                Some(progress) => progress,
                None => UserProgress::new(user_id.to_string(), now),
            };
            let level_before = progress.level;

            let credit = xp::evaluate_session(
                &progress,
                pose_name,
                submission.duration_seconds,
                accuracy,
                now.date_naive(),
            );
            let xp_gained = credit.breakdown.total();

            progress.xp_total += xp_gained;
            // The stored level never decreases, even if the table changes
            progress.level = progress.level.max(levels::level_for_xp(progress.xp_total));
            progress.current_streak_days = credit.current_streak_days;
            progress.longest_streak_days = credit.longest_streak_days;
            progress.last_practice_date = Some(credit.last_practice_date);
            progress.sessions_completed += 1;
            progress.total_practice_seconds += u64::from(submission.duration_seconds);
            if credit.first_time_pose {
                progress.poses_practiced.insert(pose_name.to_string());
            }
            progress.updated_at = now;

            let achievements_unlocked = self.unlock_qualifying(&store, &progress, now)?;

            let session = PoseSession {
                session_id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                pose_name: pose_name.to_string(),
                duration_seconds: submission.duration_seconds,
                accuracy,
                feedback_counts: submission.feedback_counts,
                recorded_at: now,
            };

            store.upsert_progress(&progress)?;
            store.insert_session(&session)?;

            let leveled_up = progress.level > level_before;
            SessionOutcome {
                session_id: session.session_id,
                xp_gained,
                xp_breakdown: credit.breakdown,
                leveled_up,
                new_level: if leveled_up { Some(progress.level) } else { None },
                achievements_unlocked,
                progress_after: progress,
            }
        };

        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        tracing::debug!(
            user_id,
            xp_gained = outcome.xp_gained,
            leveled_up = outcome.leveled_up,
            "session processed"
        );

        Ok(outcome)
    }

    /// Evaluate every not-yet-unlocked achievement against updated state.
    ///
    /// Predicates run against the current cumulative snapshot, so catalog
    /// changes take effect retroactively. The unique key on the store
    /// makes a double unlock impossible even if two evaluations race.
    fn unlock_qualifying(
        &self,
        store: &ProgressStore,
        progress: &UserProgress,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, GamificationError> {
        let unlocked: HashSet<String> = store
            .unlocked_achievements(&progress.user_id)?
            .into_iter()
            .map(|a| a.achievement_id)
            .collect();

        let mut newly_unlocked = Vec::new();
        for achievement in &self.catalog {
            if unlocked.contains(&achievement.achievement_id) {
                continue;
            }
            if achievement.requirement.is_met(progress)
                && store.record_achievement(&progress.user_id, &achievement.achievement_id, now)?
            {
                tracing::info!(
                    user_id = %progress.user_id,
                    achievement = %achievement.achievement_id,
                    "achievement unlocked"
                );
                newly_unlocked.push(achievement.achievement_id.clone());
            }
        }

        Ok(newly_unlocked)
    }

    /// Get a user's progress, creating a zero-state record on first access.
    pub fn get_progress(&self, user_id: &str) -> Result<UserProgress, GamificationError> {
        let user_id = validate_user_id(user_id)?;

        let lock = self.user_lock(user_id);
        let _guard = lock.lock().unwrap();

        let db = self.db.lock().unwrap();
        let store = ProgressStore::new(db.connection());

        if let Some(progress) = store.get_progress(user_id)? {
            return Ok(progress);
        }

        let progress = UserProgress::new(user_id.to_string(), Utc::now());
        store.upsert_progress(&progress)?;
        Ok(progress)
    }

    /// Get aggregated statistics for a user.
    pub fn get_user_stats(&self, user_id: &str) -> Result<UserStats, GamificationError> {
        self.get_user_stats_at(user_id, Utc::now())
    }

    /// Get aggregated statistics for a user with an explicit clock.
    pub fn get_user_stats_at(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<UserStats, GamificationError> {
        let progress = self.get_progress(user_id)?;

        let db = self.db.lock().unwrap();
        let store = ProgressStore::new(db.connection());
        let sessions = store.recent_sessions(&progress.user_id, 100)?;
        let unlocked = store.unlocked_achievements(&progress.user_id)?;

        let average_accuracy = if sessions.is_empty() {
            0.0
        } else {
            let sum: f64 = sessions.iter().map(|s| s.accuracy).sum();
            (sum / sessions.len() as f64 * 100.0).round() / 100.0
        };

        let favorite_pose = favorite_pose(&sessions);

        let week_start = now - chrono::Duration::days(7);
        let this_week: Vec<_> = sessions
            .iter()
            .filter(|s| s.recorded_at >= week_start)
            .collect();
        let minutes_this_week = this_week
            .iter()
            .map(|s| u64::from(s.duration_seconds))
            .sum::<u64>()
            / 60;

        let info = levels::level_info(progress.level);

        Ok(UserStats {
            average_accuracy,
            favorite_pose,
            sessions_this_week: this_week.len() as u32,
            minutes_this_week,
            level_title: info.map(|i| i.title.to_string()).unwrap_or_default(),
            level_description: info.map(|i| i.description.to_string()).unwrap_or_default(),
            next_level_xp: levels::next_level_xp(progress.xp_total),
            achievements_unlocked: unlocked.len() as u32,
            achievements_available: self.catalog.len() as u32,
            progress,
        })
    }

    /// Get a user's sessions, newest first.
    pub fn get_recent_sessions(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<PoseSession>, GamificationError> {
        let user_id = validate_user_id(user_id)?;

        let db = self.db.lock().unwrap();
        let store = ProgressStore::new(db.connection());
        Ok(store.recent_sessions(user_id, limit)?)
    }

    /// Get all achievement definitions.
    pub fn get_achievements_catalog(&self) -> &[Achievement] {
        &self.catalog
    }

    /// Get the achievements a user has unlocked.
    pub fn get_user_achievements(
        &self,
        user_id: &str,
    ) -> Result<Vec<UserAchievement>, GamificationError> {
        let user_id = validate_user_id(user_id)?;

        let db = self.db.lock().unwrap();
        let store = ProgressStore::new(db.connection());
        Ok(store.unlocked_achievements(user_id)?)
    }

    /// Derive the leaderboard from the current progress snapshot.
    pub fn get_leaderboard(&self, top_n: usize) -> Result<Vec<LeaderboardEntry>, GamificationError> {
        let db = self.db.lock().unwrap();
        let store = ProgressStore::new(db.connection());
        let snapshot = store.all_progress()?;
        Ok(leaderboard::rank_users(snapshot, top_n))
    }

    /// Get the challenge for a date, materializing it on first access.
    pub fn get_daily_challenge(
        &self,
        date: NaiveDate,
    ) -> Result<DailyChallenge, GamificationError> {
        let db = self.db.lock().unwrap();
        let store = ProgressStore::new(db.connection());
        self.materialize_challenge(&store, date)
    }

    fn materialize_challenge(
        &self,
        store: &ProgressStore,
        date: NaiveDate,
    ) -> Result<DailyChallenge, GamificationError> {
        if let Some(challenge) = store.get_challenge(date)? {
            return Ok(challenge);
        }

        // First writer wins; losers converge on the stored row below
        let generated = challenge::challenge_for_date(date);
        store.insert_challenge(&generated, Utc::now())?;

        store
            .get_challenge(date)?
            .ok_or_else(|| GamificationError::NotFound(format!("challenge for {}", date)))
    }

    /// Record a challenge completion and grant its reward once.
    pub fn complete_daily_challenge(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<ChallengeOutcome, GamificationError> {
        self.complete_daily_challenge_at(user_id, date, Utc::now())
    }

    /// Record a challenge completion with an explicit clock.
    pub fn complete_daily_challenge_at(
        &self,
        user_id: &str,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<ChallengeOutcome, GamificationError> {
        let user_id = validate_user_id(user_id)?;

        let lock = self.user_lock(user_id);
        let _guard = lock.lock().unwrap();

        let mut db = self.db.lock().unwrap();
        let tx = db.transaction()?;

        let outcome = {
            let store = ProgressStore::new(&tx);
            let challenge = self.materialize_challenge(&store, date)?;

            if !store.record_completion(user_id, date, now)? {
                ChallengeOutcome {
                    already_completed: true,
                    reward_xp_granted: 0,
                }
            } else {
                let mut progress = match store.get_progress(user_id)? {
                    Some(progress) => progress,
                    None => UserProgress::new(user_id.to_string(), now),
                };

                progress.xp_total += challenge.reward_xp;
                progress.level = progress.level.max(levels::level_for_xp(progress.xp_total));
                progress.updated_at = now;
                store.upsert_progress(&progress)?;

                tracing::debug!(user_id, reward_xp = challenge.reward_xp, "challenge completed");

                ChallengeOutcome {
                    already_completed: false,
                    reward_xp_granted: challenge.reward_xp,
                }
            }
        };

        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        Ok(outcome)
    }
}

/// Most practiced pose across the given sessions, ties to the
/// alphabetically first name.
fn favorite_pose(sessions: &[PoseSession]) -> Option<String> {
    let mut counts: std::collections::BTreeMap<&str, u32> = std::collections::BTreeMap::new();
    for session in sessions {
        *counts.entry(session.pose_name.as_str()).or_insert(0) += 1;
    }

    let mut best: Option<(&str, u32)> = None;
    for (pose, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((pose, count));
        }
    }

    best.map(|(pose, _)| pose.to_string())
}

/// Reject empty or blank user ids before any mutation.
fn validate_user_id(user_id: &str) -> Result<&str, GamificationError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(GamificationError::Validation(
            "user_id must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

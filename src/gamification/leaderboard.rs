//! Leaderboard derivation.
//!
//! Pure ranking over a snapshot of user progress; no independent state.

use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;

use super::types::UserProgress;

/// One ranked leaderboard row.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: String,
    pub level: u8,
    pub xp_total: u32,
    pub current_streak_days: u32,
    pub last_practice_date: Option<NaiveDate>,
}

/// Rank users by XP descending; ties go to the earlier-active user.
///
/// Users with no practice date sort after dated users at equal XP, then
/// by user id for a stable order.
pub fn rank_users(mut snapshot: Vec<UserProgress>, top_n: usize) -> Vec<LeaderboardEntry> {
    snapshot.sort_by(compare);

    snapshot
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, p)| LeaderboardEntry {
            rank: i as u32 + 1,
            user_id: p.user_id,
            level: p.level,
            xp_total: p.xp_total,
            current_streak_days: p.current_streak_days,
            last_practice_date: p.last_practice_date,
        })
        .collect()
}

fn compare(a: &UserProgress, b: &UserProgress) -> Ordering {
    b.xp_total
        .cmp(&a.xp_total)
        .then_with(|| match (a.last_practice_date, b.last_practice_date) {
            (Some(da), Some(db)) => da.cmp(&db),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.user_id.cmp(&b.user_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: &str, xp: u32, last: Option<&str>) -> UserProgress {
        let mut p = UserProgress::new(id.to_string(), Utc::now());
        p.xp_total = xp;
        p.last_practice_date = last.map(|s| s.parse().unwrap());
        p
    }

    #[test]
    fn test_orders_by_xp_descending() {
        let entries = rank_users(
            vec![
                user("a", 100, Some("2025-06-01")),
                user("b", 300, Some("2025-06-01")),
                user("c", 200, Some("2025-06-01")),
            ],
            10,
        );

        let ids: Vec<_> = entries.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[2].rank, 3);
    }

    #[test]
    fn test_ties_broken_by_earlier_practice_date() {
        let entries = rank_users(
            vec![
                user("late", 100, Some("2025-06-20")),
                user("early", 100, Some("2025-01-05")),
            ],
            10,
        );

        assert_eq!(entries[0].user_id, "early");
        assert_eq!(entries[1].user_id, "late");
    }

    #[test]
    fn test_undated_users_rank_last_among_ties() {
        let entries = rank_users(
            vec![
                user("fresh", 0, None),
                user("dated", 0, Some("2025-06-01")),
            ],
            10,
        );

        assert_eq!(entries[0].user_id, "dated");
    }

    #[test]
    fn test_top_n_truncates() {
        let entries = rank_users(
            vec![
                user("a", 3, Some("2025-06-01")),
                user("b", 2, Some("2025-06-01")),
                user("c", 1, Some("2025-06-01")),
            ],
            2,
        );
        assert_eq!(entries.len(), 2);
    }
}

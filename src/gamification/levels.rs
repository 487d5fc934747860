//! Level threshold table and XP-to-level derivation.

/// One level definition.
#[derive(Debug, Clone, Copy)]
pub struct Level {
    pub level: u8,
    /// Minimum cumulative XP required to hold this level
    pub required_xp: u32,
    pub title: &'static str,
    pub description: &'static str,
}

/// Ordered level table. Level 10 is the ceiling; XP keeps accruing past it.
pub static LEVELS: &[Level] = &[
    Level {
        level: 1,
        required_xp: 0,
        title: "Beginner",
        description: "Starting your yoga journey",
    },
    Level {
        level: 2,
        required_xp: 100,
        title: "Novice",
        description: "Getting the hang of it",
    },
    Level {
        level: 3,
        required_xp: 300,
        title: "Apprentice",
        description: "Building your practice",
    },
    Level {
        level: 4,
        required_xp: 600,
        title: "Practitioner",
        description: "Regular practice",
    },
    Level {
        level: 5,
        required_xp: 1000,
        title: "Dedicated",
        description: "Committed to yoga",
    },
    Level {
        level: 6,
        required_xp: 1500,
        title: "Advanced",
        description: "Advanced practitioner",
    },
    Level {
        level: 7,
        required_xp: 2200,
        title: "Expert",
        description: "Yoga expert",
    },
    Level {
        level: 8,
        required_xp: 3000,
        title: "Master",
        description: "Yoga master",
    },
    Level {
        level: 9,
        required_xp: 4000,
        title: "Guru",
        description: "Yoga guru",
    },
    Level {
        level: 10,
        required_xp: 5000,
        title: "Enlightened",
        description: "Enlightened being",
    },
];

/// Derive the level for a cumulative XP total.
pub fn level_for_xp(xp_total: u32) -> u8 {
    LEVELS
        .iter()
        .rev()
        .find(|l| xp_total >= l.required_xp)
        .map(|l| l.level)
        .unwrap_or(1)
}

/// Look up a level definition by number.
pub fn level_info(level: u8) -> Option<&'static Level> {
    LEVELS.iter().find(|l| l.level == level)
}

/// XP remaining until the next level, or `None` at the ceiling.
pub fn next_level_xp(xp_total: u32) -> Option<u32> {
    let current = level_for_xp(xp_total);
    LEVELS
        .iter()
        .find(|l| l.level == current + 1)
        .map(|next| next.required_xp.saturating_sub(xp_total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted_and_complete() {
        assert_eq!(LEVELS.len(), 10);
        for pair in LEVELS.windows(2) {
            assert!(pair[0].required_xp < pair[1].required_xp);
            assert_eq!(pair[0].level + 1, pair[1].level);
        }
    }

    #[test]
    fn test_level_for_xp_thresholds() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(299), 2);
        assert_eq!(level_for_xp(300), 3);
        assert_eq!(level_for_xp(1000), 5);
        assert_eq!(level_for_xp(4999), 9);
        assert_eq!(level_for_xp(5000), 10);
    }

    #[test]
    fn test_level_ten_is_ceiling() {
        assert_eq!(level_for_xp(5001), 10);
        assert_eq!(level_for_xp(u32::MAX), 10);
        assert_eq!(next_level_xp(5000), None);
        assert_eq!(next_level_xp(999_999), None);
    }

    #[test]
    fn test_next_level_xp() {
        assert_eq!(next_level_xp(0), Some(100));
        assert_eq!(next_level_xp(59), Some(41));
        assert_eq!(next_level_xp(100), Some(200));
        assert_eq!(next_level_xp(4500), Some(500));
    }
}

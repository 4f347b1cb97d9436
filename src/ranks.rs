//! Rank table and the XP → level calculation.
//!
//! Everything here is pure; callers recompute a [`Progress`] whenever they
//! need one instead of storing it.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rank {
    pub level: u32,
    pub title: &'static str,
    pub xp_required: u64,
    pub color: &'static str,
    pub icon: &'static str,
}

/// Sorted ascending by `xp_required`; the first entry starts at 0.
pub static RANKS: [Rank; 15] = [
    entry(1, "Beginner", 0, "#9ca3af", "🌱"),
    entry(2, "Learner", 500, "#10b981", "🌿"),
    entry(3, "Novice", 1200, "#10b981", "🍀"),
    entry(4, "Apprentice", 2000, "#3b82f6", "⭐"),
    entry(5, "Skilled", 3000, "#3b82f6", "✨"),
    entry(6, "Adept", 4500, "#8b5cf6", "💫"),
    entry(7, "Expert", 6500, "#8b5cf6", "🌟"),
    entry(8, "Master", 9000, "#f59e0b", "🏆"),
    entry(9, "Champion", 12000, "#f59e0b", "👑"),
    entry(10, "Legend", 16000, "#ef4444", "🔥"),
    entry(11, "Mythic", 21000, "#ef4444", "⚡"),
    entry(12, "Divine", 27000, "#ec4899", "💎"),
    entry(13, "Supreme", 35000, "#ec4899", "🌠"),
    entry(14, "Ultimate", 45000, "#a855f7", "🎯"),
    entry(15, "Transcendent", 60000, "#a855f7", "🌌"),
];

const fn entry(
    level: u32,
    title: &'static str,
    xp_required: u64,
    color: &'static str,
    icon: &'static str,
) -> Rank {
    Rank {
        level,
        title,
        xp_required,
        color,
        icon,
    }
}

/// Where a given XP total sits on the rank ladder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    pub current_rank: &'static Rank,
    pub next_rank: Option<&'static Rank>,
    pub xp_in_current_level: u64,
    pub xp_needed_for_next: u64,
    pub progress_percentage: f64,
}

pub fn level_for(xp: u64) -> Progress {
    let index = RANKS
        .iter()
        .rposition(|rank| rank.xp_required <= xp)
        .unwrap_or(0);
    let current_rank = &RANKS[index];
    let next_rank = RANKS.get(index + 1);

    let xp_in_current_level = xp - current_rank.xp_required;
    let xp_needed_for_next = next_rank
        .map(|next| next.xp_required - current_rank.xp_required)
        .unwrap_or(0);
    let progress_percentage = match next_rank {
        Some(_) => xp_in_current_level as f64 / xp_needed_for_next as f64 * 100.0,
        None => 100.0,
    };

    Progress {
        current_rank,
        next_rank,
        xp_in_current_level,
        xp_needed_for_next,
        progress_percentage,
    }
}

/// Returns the newly reached rank when moving from `old_xp` to `new_xp`
/// crosses into a strictly higher level.
pub fn level_up(old_xp: u64, new_xp: u64) -> Option<&'static Rank> {
    let before = level_for(old_xp).current_rank;
    let after = level_for(new_xp).current_rank;
    (after.level > before.level).then_some(after)
}

pub fn rank(level: u32) -> Option<&'static Rank> {
    RANKS.iter().find(|rank| rank.level == level)
}

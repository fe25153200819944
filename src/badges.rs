use crate::models::Meta;
use serde::{Deserialize, Serialize};

/// One-shot achievement flags. Earned once, never revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BadgeId {
    #[serde(rename = "FIRST_CHECK")]
    FirstCheck,
    #[serde(rename = "FIRST_100")]
    First100,
    #[serde(rename = "STREAK_3")]
    Streak3,
    #[serde(rename = "STREAK_7")]
    Streak7,
    #[serde(rename = "HALFWAY")]
    Halfway,
    #[serde(rename = "GOAL_DONE")]
    GoalDone,
}

pub struct BadgeDef {
    pub id: BadgeId,
    pub name: &'static str,
    pub tip: &'static str,
}

/// Catalog in display order.
pub const ALL_BADGES: [BadgeDef; 6] = [
    BadgeDef {
        id: BadgeId::FirstCheck,
        name: "First Check ✅",
        tip: "You checked a task!",
    },
    BadgeDef {
        id: BadgeId::First100,
        name: "First 100% Day 💯",
        tip: "Completed all tasks in one day",
    },
    BadgeDef {
        id: BadgeId::Streak3,
        name: "3-Day Streak 🔥",
        tip: "Three days in a row",
    },
    BadgeDef {
        id: BadgeId::Streak7,
        name: "7-Day Streak 🚀",
        tip: "Seven days in a row",
    },
    BadgeDef {
        id: BadgeId::Halfway,
        name: "Halfway ⭐",
        tip: "You passed 50% of your total days",
    },
    BadgeDef {
        id: BadgeId::GoalDone,
        name: "Deadline Crusher 🏁",
        tip: "Marked the goal complete",
    },
];

/// Adds `id` to the earned set. Awarding twice is a no-op.
pub fn award(meta: &mut Meta, id: BadgeId) {
    meta.badges.insert(id);
}

pub fn earned(meta: &Meta) -> Vec<BadgeId> {
    ALL_BADGES
        .iter()
        .map(|def| def.id)
        .filter(|id| meta.badges.contains(id))
        .collect()
}

use crate::badges::BadgeId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The single active goal. Saving the setup form again replaces it in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub title: String,
    pub tasks: Vec<String>,
    pub start_date: String,
    pub deadline: String,
    pub completed: bool,
}

/// Completion state for one calendar day, keyed by canonical date.
///
/// `total_count` is a snapshot of the task count when the record was created;
/// editing the goal later does not rewrite past records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: String,
    pub completed_count: u32,
    pub total_count: u32,
    #[serde(default)]
    pub checked_indices: BTreeSet<u32>,
    pub all_done: bool,
}

impl DailyRecord {
    pub fn empty(date: String, total_count: u32) -> Self {
        Self {
            date,
            completed_count: 0,
            total_count,
            checked_indices: BTreeSet::new(),
            all_done: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Meta {
    pub streak: u32,
    pub badges: BTreeSet<BadgeId>,
}

/// Everything the app persists: the three store collections in one file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    pub goal: Option<Goal>,
    pub history: BTreeMap<String, DailyRecord>,
    pub meta: Meta,
}

impl AppData {
    /// The goal currently being tracked, if any.
    pub fn active_goal(&self) -> Option<&Goal> {
        self.goal.as_ref().filter(|goal| !goal.completed)
    }
}

#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    pub title: String,
    pub tasks: Vec<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    pub deadline: String,
}

#[derive(Debug, Deserialize)]
pub struct GoalForm {
    pub title: String,
    /// One task label per line, as typed into the setup textarea.
    pub tasks: String,
    #[serde(default)]
    pub start_date: String,
    pub deadline: String,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub task_index: u32,
    pub checked: bool,
    /// Optional guard: when present it must name today, since past records
    /// are immutable once created.
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub index: u32,
    pub checked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallMetrics {
    pub total_days: u32,
    pub done_days: u32,
    pub percent: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskView {
    pub index: u32,
    pub label: String,
    pub checked: bool,
}

/// Bundle returned to the presentation layer after every tracking action.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrackingResponse {
    pub date: String,
    pub title: String,
    pub deadline_display: String,
    pub tasks: Vec<TaskView>,
    pub today: DailyRecord,
    pub today_percent: u32,
    pub overall: OverallMetrics,
    pub streak: u32,
    pub badges: Vec<BadgeId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: String,
    pub display_date: String,
    pub completed_count: u32,
    pub total_count: u32,
    pub percent: u32,
    pub all_done: bool,
}

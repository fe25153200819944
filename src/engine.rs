use crate::badges::{self, BadgeId};
use crate::dates;
use crate::errors::AppError;
use crate::models::{
    AppData, DailyRecord, Goal, GoalRequest, HistoryEntry, OverallMetrics, TaskView,
    TrackingResponse,
};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// Validates and stores the goal from the setup form. Re-submitting replaces
/// the previous goal; today's record is reconciled with the new task list.
pub fn save_goal(
    data: &mut AppData,
    today: NaiveDate,
    req: GoalRequest,
) -> Result<Goal, AppError> {
    let title = req.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::bad_request("goal title must not be empty"));
    }

    let tasks: Vec<String> = req
        .tasks
        .iter()
        .map(|task| task.trim().to_string())
        .filter(|task| !task.is_empty())
        .collect();
    if tasks.is_empty() {
        return Err(AppError::bad_request("at least one task is required"));
    }

    let Some(deadline) = dates::parse_key(req.deadline.trim()) else {
        return Err(AppError::bad_request(
            "deadline must be a valid YYYY-MM-DD date",
        ));
    };
    let start = match req
        .start_date
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        Some(value) => dates::parse_key(value).ok_or_else(|| {
            AppError::bad_request("start date must be a valid YYYY-MM-DD date")
        })?,
        None => today,
    };
    if start > deadline {
        return Err(AppError::bad_request(
            "start date must be on or before the deadline",
        ));
    }

    let goal = Goal {
        title,
        tasks,
        start_date: dates::canonical_key(start),
        deadline: dates::canonical_key(deadline),
        completed: false,
    };
    data.goal = Some(goal.clone());
    reconcile_today_record(data, today);
    Ok(goal)
}

/// Editing the task list changes what the indices in today's record point at.
/// Keep only checks that still reference a task, and snapshot the new count.
/// Past records are history and keep the counts they were created with.
fn reconcile_today_record(data: &mut AppData, today: NaiveDate) {
    let Some(total) = data.goal.as_ref().map(|goal| goal.tasks.len() as u32) else {
        return;
    };
    let key = dates::canonical_key(today);
    let record = data
        .history
        .entry(key.clone())
        .or_insert_with(|| DailyRecord::empty(key, total));
    record.checked_indices.retain(|&index| index < total);
    record.total_count = total;
    record.completed_count = record.checked_indices.len() as u32;
    record.all_done = record.completed_count == record.total_count;
}

/// Backfills a zero-progress record for every day in
/// `[start_date, min(today, deadline))` that was never visited. Never touches
/// an existing record and never creates today's.
pub fn ensure_missed_days_marked(data: &mut AppData, today: NaiveDate) {
    let Some(goal) = data.goal.as_ref() else {
        return;
    };
    let total = goal.tasks.len() as u32;
    let today_key = dates::canonical_key(today);
    let end = if today_key < goal.deadline {
        today_key.clone()
    } else {
        goal.deadline.clone()
    };
    let start = goal.start_date.clone();
    for day in dates::sequence(&start, &end) {
        if day >= today_key {
            break;
        }
        if !data.history.contains_key(&day) {
            data.history
                .insert(day.clone(), DailyRecord::empty(day, total));
        }
    }
}

/// Creates today's record on first view, with an empty checked set.
pub fn ensure_today_record(data: &mut AppData, today: NaiveDate) -> Option<DailyRecord> {
    let goal = data.goal.as_ref()?;
    let total = goal.tasks.len() as u32;
    let key = dates::canonical_key(today);
    let record = data
        .history
        .entry(key.clone())
        .or_insert_with(|| DailyRecord::empty(key, total));
    Some(record.clone())
}

/// Checks or unchecks one task on today's record. Pure record mutation;
/// toggling to the state a task is already in is a no-op. Badge evaluation
/// happens downstream in [`apply_toggle`].
pub fn toggle_task(
    data: &mut AppData,
    today: NaiveDate,
    task_index: u32,
    checked: bool,
) -> Result<DailyRecord, AppError> {
    let Some(goal) = data.active_goal() else {
        return Err(AppError::bad_request("no active goal"));
    };
    if task_index as usize >= goal.tasks.len() {
        return Err(AppError::bad_request("task index out of range"));
    }
    let total = goal.tasks.len() as u32;

    let key = dates::canonical_key(today);
    let record = data
        .history
        .entry(key.clone())
        .or_insert_with(|| DailyRecord::empty(key, total));
    if checked {
        record.checked_indices.insert(task_index);
    } else {
        record.checked_indices.remove(&task_index);
    }
    record.completed_count = record.checked_indices.len() as u32;
    record.all_done = record.completed_count == record.total_count;
    Ok(record.clone())
}

/// Checks every task on today's record in one step. Pure record mutation,
/// like [`toggle_task`].
pub fn mark_all_done(data: &mut AppData, today: NaiveDate) -> Result<DailyRecord, AppError> {
    let Some(goal) = data.active_goal() else {
        return Err(AppError::bad_request("no active goal"));
    };
    let total = goal.tasks.len() as u32;

    let key = dates::canonical_key(today);
    let record = data
        .history
        .entry(key.clone())
        .or_insert_with(|| DailyRecord::empty(key, total));
    record.checked_indices = (0..record.total_count).collect();
    record.completed_count = record.total_count;
    record.all_done = true;
    Ok(record.clone())
}

/// The toggle user action: mutate the record, then evaluate badges in order.
pub fn apply_toggle(
    data: &mut AppData,
    today: NaiveDate,
    task_index: u32,
    checked: bool,
) -> Result<DailyRecord, AppError> {
    let record = toggle_task(data, today, task_index, checked)?;
    evaluate_after_action(data, today, checked);
    Ok(record)
}

/// The mark-all user action.
pub fn apply_mark_all(data: &mut AppData, today: NaiveDate) -> Result<DailyRecord, AppError> {
    let record = mark_all_done(data, today)?;
    evaluate_after_action(data, today, record.total_count > 0);
    Ok(record)
}

/// Marks the goal complete. One-way: there is no way back to active.
pub fn complete_goal(data: &mut AppData) -> Result<Goal, AppError> {
    let Some(goal) = data.goal.as_mut() else {
        return Err(AppError::bad_request("no goal to complete"));
    };
    goal.completed = true;
    let updated = goal.clone();
    badges::award(&mut data.meta, BadgeId::GoalDone);
    Ok(updated)
}

/// Post-action badge pipeline, in evaluation order: first-check and
/// first-100 from the mutated record, then streak, then overall/halfway.
fn evaluate_after_action(data: &mut AppData, today: NaiveDate, checked_now: bool) {
    if checked_now {
        badges::award(&mut data.meta, BadgeId::FirstCheck);
    }
    let today_done = data
        .history
        .get(&dates::canonical_key(today))
        .is_some_and(|record| record.all_done);
    if today_done {
        badges::award(&mut data.meta, BadgeId::First100);
    }
    refresh_metrics(data, today);
}

/// Recomputes and stores the streak, recomputes overall progress, and awards
/// any threshold badges that now qualify. Safe to run on every view.
pub fn refresh_metrics(data: &mut AppData, today: NaiveDate) -> (u32, OverallMetrics) {
    let streak = compute_streak(&data.history, today);
    data.meta.streak = streak;
    if streak >= 3 {
        badges::award(&mut data.meta, BadgeId::Streak3);
    }
    if streak >= 7 {
        badges::award(&mut data.meta, BadgeId::Streak7);
    }

    let overall = match data.goal.as_ref() {
        Some(goal) => overall_progress(goal, &data.history),
        None => OverallMetrics {
            total_days: 0,
            done_days: 0,
            percent: 0,
        },
    };
    if overall.total_days > 0 && overall.done_days * 2 >= overall.total_days {
        badges::award(&mut data.meta, BadgeId::Halfway);
    }
    (streak, overall)
}

/// Consecutive fully-completed days ending today, or yesterday when today is
/// not (yet) done. A miss before that stops the count.
pub fn compute_streak(history: &BTreeMap<String, DailyRecord>, today: NaiveDate) -> u32 {
    let done = |day: NaiveDate| {
        history
            .get(&dates::canonical_key(day))
            .is_some_and(|record| record.all_done)
    };
    let mut day = if done(today) {
        today
    } else {
        today - Duration::days(1)
    };
    let mut count = 0;
    while done(day) {
        count += 1;
        day -= Duration::days(1);
    }
    count
}

fn percent(part: u32, whole: u32) -> u32 {
    (f64::from(part) / f64::from(whole.max(1)) * 100.0).round() as u32
}

pub fn today_percent(record: &DailyRecord) -> u32 {
    percent(record.completed_count, record.total_count)
}

pub fn overall_progress(goal: &Goal, history: &BTreeMap<String, DailyRecord>) -> OverallMetrics {
    let total_days = dates::sequence(&goal.start_date, &goal.deadline).len() as u32;
    let done_days = history
        .values()
        .filter(|record| {
            record.all_done && record.date >= goal.start_date && record.date <= goal.deadline
        })
        .count() as u32;
    OverallMetrics {
        total_days,
        done_days,
        percent: percent(done_days, total_days),
    }
}

/// Records within the goal range, newest first.
pub fn history_newest_first(data: &AppData) -> Vec<HistoryEntry> {
    data.history
        .values()
        .rev()
        .filter(|record| match data.goal.as_ref() {
            Some(goal) => record.date >= goal.start_date && record.date <= goal.deadline,
            None => true,
        })
        .map(|record| HistoryEntry {
            date: record.date.clone(),
            display_date: dates::display_key(&record.date),
            completed_count: record.completed_count,
            total_count: record.total_count,
            percent: today_percent(record),
            all_done: record.all_done,
        })
        .collect()
}

/// The full tracking bundle the presentation layer renders from. Viewing is
/// not read-only: it backfills missed days, creates today's record, and
/// refreshes streak/overall state.
pub fn tracking_view(data: &mut AppData, today: NaiveDate) -> Result<TrackingResponse, AppError> {
    let Some(goal) = data.active_goal().cloned() else {
        return Err(AppError::bad_request("no active goal"));
    };
    ensure_missed_days_marked(data, today);
    let record = ensure_today_record(data, today)
        .ok_or_else(|| AppError::bad_request("no active goal"))?;
    let (streak, overall) = refresh_metrics(data, today);

    let tasks = goal
        .tasks
        .iter()
        .enumerate()
        .map(|(index, label)| TaskView {
            index: index as u32,
            label: label.clone(),
            checked: record.checked_indices.contains(&(index as u32)),
        })
        .collect();

    Ok(TrackingResponse {
        date: record.date.clone(),
        title: goal.title.clone(),
        deadline_display: dates::display_key(&goal.deadline),
        tasks,
        today_percent: today_percent(&record),
        today: record,
        overall,
        streak,
        badges: badges::earned(&data.meta),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(title: &str, tasks: &[&str], start: &str, deadline: &str) -> GoalRequest {
        GoalRequest {
            title: title.to_string(),
            tasks: tasks.iter().map(|t| t.to_string()).collect(),
            start_date: Some(start.to_string()),
            deadline: deadline.to_string(),
        }
    }

    fn data_with_goal(today: NaiveDate) -> AppData {
        let mut data = AppData::default();
        save_goal(
            &mut data,
            today,
            request("Ship it", &["Write", "Review"], "2024-01-01", "2024-01-10"),
        )
        .unwrap();
        data
    }

    fn done_record(key: &str, total: u32) -> DailyRecord {
        DailyRecord {
            date: key.to_string(),
            completed_count: total,
            total_count: total,
            checked_indices: (0..total).collect(),
            all_done: true,
        }
    }

    #[test]
    fn save_goal_rejects_invalid_input_without_mutating() {
        let today = day(2024, 1, 1);
        let cases = [
            request("  ", &["a"], "2024-01-01", "2024-01-10"),
            request("Goal", &[], "2024-01-01", "2024-01-10"),
            request("Goal", &["  ", ""], "2024-01-01", "2024-01-10"),
            request("Goal", &["a"], "2024-01-01", "someday"),
            request("Goal", &["a"], "2024-01-10", "2024-01-01"),
        ];
        for req in cases {
            let mut data = AppData::default();
            assert!(save_goal(&mut data, today, req).is_err());
            assert!(data.goal.is_none());
            assert!(data.history.is_empty());
        }
    }

    #[test]
    fn save_goal_defaults_start_to_today() {
        let today = day(2024, 1, 3);
        let mut data = AppData::default();
        let goal = save_goal(
            &mut data,
            today,
            GoalRequest {
                title: "Goal".to_string(),
                tasks: vec!["a".to_string()],
                start_date: None,
                deadline: "2024-01-10".to_string(),
            },
        )
        .unwrap();
        assert_eq!(goal.start_date, "2024-01-03");
        assert!(!goal.completed);
    }

    #[test]
    fn gap_fill_creates_only_missing_past_days() {
        let today = day(2024, 1, 6);
        let mut data = data_with_goal(today);
        data.history.clear();

        ensure_missed_days_marked(&mut data, today);

        assert_eq!(data.history.len(), 5);
        for key in ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05"] {
            let record = &data.history[key];
            assert_eq!(record.completed_count, 0);
            assert_eq!(record.total_count, 2);
            assert!(!record.all_done);
        }
        assert!(!data.history.contains_key("2024-01-06"));
    }

    #[test]
    fn gap_fill_is_idempotent_and_preserves_completed_days() {
        let today = day(2024, 1, 6);
        let mut data = data_with_goal(today);
        data.history.clear();
        data.history
            .insert("2024-01-03".to_string(), done_record("2024-01-03", 2));

        ensure_missed_days_marked(&mut data, today);
        let first_pass = data.history.clone();
        ensure_missed_days_marked(&mut data, today);

        assert_eq!(
            serde_json::to_value(&data.history).unwrap(),
            serde_json::to_value(&first_pass).unwrap()
        );
        assert!(data.history["2024-01-03"].all_done);
    }

    #[test]
    fn gap_fill_stops_at_deadline() {
        let today = day(2024, 2, 1);
        let mut data = data_with_goal(today);
        data.history.clear();

        ensure_missed_days_marked(&mut data, today);

        assert_eq!(data.history.len(), 10);
        assert!(!data.history.contains_key("2024-01-11"));
    }

    #[test]
    fn first_day_both_tasks_checked() {
        let today = day(2024, 1, 1);
        let mut data = data_with_goal(today);

        apply_toggle(&mut data, today, 0, true).unwrap();
        let record = apply_toggle(&mut data, today, 1, true).unwrap();

        assert_eq!(record.completed_count, 2);
        assert_eq!(record.total_count, 2);
        assert!(record.all_done);
        assert!(data.meta.badges.contains(&BadgeId::FirstCheck));
        assert!(data.meta.badges.contains(&BadgeId::First100));
        assert_eq!(data.meta.streak, 1);
        assert!(!data.meta.badges.contains(&BadgeId::Streak3));
    }

    #[test]
    fn toggle_off_reverts_state_but_not_badges() {
        let today = day(2024, 1, 1);
        let mut data = data_with_goal(today);

        apply_toggle(&mut data, today, 0, true).unwrap();
        let badges_after_check = data.meta.badges.clone();
        let record = apply_toggle(&mut data, today, 0, false).unwrap();

        assert!(record.checked_indices.is_empty());
        assert_eq!(record.completed_count, 0);
        assert!(!record.all_done);
        assert_eq!(data.meta.badges, badges_after_check);
        assert!(data.meta.badges.contains(&BadgeId::FirstCheck));
        assert!(!data.meta.badges.contains(&BadgeId::First100));
    }

    #[test]
    fn toggle_same_state_twice_is_idempotent() {
        let today = day(2024, 1, 1);
        let mut data = data_with_goal(today);

        let once = toggle_task(&mut data, today, 1, true).unwrap();
        let twice = toggle_task(&mut data, today, 1, true).unwrap();

        assert_eq!(once.completed_count, twice.completed_count);
        assert_eq!(once.checked_indices, twice.checked_indices);
    }

    #[test]
    fn toggle_rejects_out_of_range_index() {
        let today = day(2024, 1, 1);
        let mut data = data_with_goal(today);
        assert!(toggle_task(&mut data, today, 2, true).is_err());
    }

    #[test]
    fn all_done_tracks_counts_through_mutations() {
        let today = day(2024, 1, 1);
        let mut data = data_with_goal(today);
        for (index, checked) in [(0, true), (1, true), (0, false), (0, true)] {
            let record = toggle_task(&mut data, today, index, checked).unwrap();
            assert_eq!(record.all_done, record.completed_count == record.total_count);
            assert_eq!(record.completed_count, record.checked_indices.len() as u32);
        }
    }

    #[test]
    fn mark_all_checks_everything() {
        let today = day(2024, 1, 1);
        let mut data = data_with_goal(today);

        let record = apply_mark_all(&mut data, today).unwrap();

        assert_eq!(
            record.checked_indices,
            (0u32..2).collect::<std::collections::BTreeSet<_>>()
        );
        assert_eq!(record.completed_count, 2);
        assert!(record.all_done);
        assert!(data.meta.badges.contains(&BadgeId::FirstCheck));
        assert!(data.meta.badges.contains(&BadgeId::First100));
    }

    #[test]
    fn streak_counts_back_from_today_when_done() {
        let today = day(2024, 1, 7);
        let mut data = data_with_goal(today);
        data.history.clear();
        for d in 1..=7 {
            let key = format!("2024-01-{d:02}");
            data.history.insert(key.clone(), done_record(&key, 2));
        }

        let (streak, _) = refresh_metrics(&mut data, today);

        assert_eq!(streak, 7);
        assert!(data.meta.badges.contains(&BadgeId::Streak3));
        assert!(data.meta.badges.contains(&BadgeId::Streak7));
    }

    #[test]
    fn streak_counts_from_yesterday_when_today_pending() {
        let today = day(2024, 1, 7);
        let mut data = data_with_goal(today);
        data.history.clear();
        for d in 4..=6 {
            let key = format!("2024-01-{d:02}");
            data.history.insert(key.clone(), done_record(&key, 2));
        }
        data.history.insert(
            "2024-01-07".to_string(),
            DailyRecord::empty("2024-01-07".to_string(), 2),
        );

        assert_eq!(compute_streak(&data.history, today), 3);
    }

    #[test]
    fn streak_breaks_at_first_gap() {
        let today = day(2024, 1, 7);
        let mut data = data_with_goal(today);
        data.history.clear();
        for key in ["2024-01-07", "2024-01-06", "2024-01-04"] {
            data.history.insert(key.to_string(), done_record(key, 2));
        }
        assert_eq!(compute_streak(&data.history, today), 2);
    }

    #[test]
    fn streak_zero_when_nothing_done() {
        let data = data_with_goal(day(2024, 1, 7));
        assert_eq!(compute_streak(&data.history, day(2024, 1, 7)), 0);
    }

    #[test]
    fn overall_progress_counts_done_days_in_range() {
        let today = day(2024, 1, 6);
        let mut data = data_with_goal(today);
        data.history.clear();
        for d in 1..=5 {
            let key = format!("2024-01-{d:02}");
            data.history.insert(key.clone(), done_record(&key, 2));
        }
        // outside the goal range, must not count
        data.history
            .insert("2024-02-01".to_string(), done_record("2024-02-01", 2));

        let (_, overall) = refresh_metrics(&mut data, today);

        assert_eq!(overall.total_days, 10);
        assert_eq!(overall.done_days, 5);
        assert_eq!(overall.percent, 50);
        assert!(data.meta.badges.contains(&BadgeId::Halfway));
    }

    #[test]
    fn halfway_not_awarded_below_threshold() {
        let today = day(2024, 1, 6);
        let mut data = data_with_goal(today);
        data.history.clear();
        for d in 1..=4 {
            let key = format!("2024-01-{d:02}");
            data.history.insert(key.clone(), done_record(&key, 2));
        }
        refresh_metrics(&mut data, today);
        assert!(!data.meta.badges.contains(&BadgeId::Halfway));
    }

    #[test]
    fn today_percent_guards_zero_tasks() {
        let record = DailyRecord::empty("2024-01-01".to_string(), 0);
        assert_eq!(today_percent(&record), 0);
    }

    #[test]
    fn today_percent_rounds() {
        let mut record = DailyRecord::empty("2024-01-01".to_string(), 3);
        record.checked_indices.insert(0);
        record.completed_count = 1;
        assert_eq!(today_percent(&record), 33);
        record.checked_indices.insert(1);
        record.completed_count = 2;
        assert_eq!(today_percent(&record), 67);
    }

    #[test]
    fn complete_goal_is_one_way_and_awards_badge() {
        let today = day(2024, 1, 1);
        let mut data = data_with_goal(today);

        let goal = complete_goal(&mut data).unwrap();

        assert!(goal.completed);
        assert!(data.active_goal().is_none());
        assert!(data.meta.badges.contains(&BadgeId::GoalDone));
    }

    #[test]
    fn resaving_goal_prunes_stale_indices_from_today_only() {
        let today = day(2024, 1, 5);
        let mut data = AppData::default();
        save_goal(
            &mut data,
            today,
            request("Goal", &["a", "b", "c"], "2024-01-01", "2024-01-10"),
        )
        .unwrap();
        data.history
            .insert("2024-01-04".to_string(), done_record("2024-01-04", 3));
        toggle_task(&mut data, today, 2, true).unwrap();

        save_goal(
            &mut data,
            today,
            request("Goal", &["a", "b"], "2024-01-01", "2024-01-10"),
        )
        .unwrap();

        let record = &data.history["2024-01-05"];
        assert_eq!(record.total_count, 2);
        assert!(record.checked_indices.is_empty());
        assert_eq!(record.completed_count, 0);
        assert!(!record.all_done);
        // yesterday keeps its snapshot
        assert_eq!(data.history["2024-01-04"].total_count, 3);
        assert!(data.history["2024-01-04"].all_done);
    }

    #[test]
    fn history_is_filtered_and_newest_first() {
        let today = day(2024, 1, 6);
        let mut data = data_with_goal(today);
        data.history.clear();
        ensure_missed_days_marked(&mut data, today);
        data.history
            .insert("2023-12-25".to_string(), done_record("2023-12-25", 2));

        let entries = history_newest_first(&data);

        assert_eq!(entries.len(), 5);
        assert_eq!(entries.first().unwrap().date, "2024-01-05");
        assert_eq!(entries.last().unwrap().date, "2024-01-01");
        assert_eq!(entries.first().unwrap().display_date, "05/01/2024");
    }

    #[test]
    fn tracking_view_builds_full_bundle() {
        let today = day(2024, 1, 6);
        let mut data = data_with_goal(today);
        data.history.clear();
        apply_toggle(&mut data, today, 0, true).unwrap();

        let view = tracking_view(&mut data, today).unwrap();

        assert_eq!(view.date, "2024-01-06");
        assert_eq!(view.title, "Ship it");
        assert_eq!(view.deadline_display, "10/01/2024");
        assert_eq!(view.tasks.len(), 2);
        assert!(view.tasks[0].checked);
        assert!(!view.tasks[1].checked);
        assert_eq!(view.today_percent, 50);
        assert_eq!(view.overall.total_days, 10);
        // viewing backfilled the five missed days
        assert!(data.history.contains_key("2024-01-01"));
        assert!(view.badges.contains(&BadgeId::FirstCheck));
    }

    #[test]
    fn tracking_view_requires_active_goal() {
        let mut data = AppData::default();
        assert!(tracking_view(&mut data, day(2024, 1, 1)).is_err());
        complete_goal(&mut data).unwrap_err();
    }
}

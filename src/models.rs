use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub color: String,
}

/// habit id -> date key -> completed
pub type CompletionLog = BTreeMap<String, BTreeMap<String, bool>>;

/// date key -> hours slept
pub type SleepLog = BTreeMap<String, f64>;

/// Read-only view of everything the store owns.
#[derive(Debug, Clone, Default)]
pub struct TrackerData {
    pub habits: Vec<Habit>,
    pub logs: CompletionLog,
    pub sleep: SleepLog,
}

impl TrackerData {
    pub fn is_completed(&self, habit_id: &str, date_key: &str) -> bool {
        self.logs
            .get(habit_id)
            .and_then(|days| days.get(date_key))
            .copied()
            .unwrap_or(false)
    }

    pub fn sleep_hours(&self, date_key: &str) -> f64 {
        self.sleep.get(date_key).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NewHabitRequest {
    pub name: Option<String>,
    pub emoji: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateHabitRequest {
    pub name: String,
    pub emoji: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoveHabitQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub habit_id: String,
    pub date: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub habit_id: String,
    pub date: String,
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct SleepRequest {
    pub hours: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct SleepMonthQuery {
    pub month: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub year: i32,
    pub months: Vec<crate::calendar::CalendarMonth>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SleepDay {
    pub day: u32,
    pub date: String,
    pub weekday: String,
    pub hours: f64,
}

#[derive(Debug, Serialize)]
pub struct SleepMonthResponse {
    pub month: usize,
    pub name: String,
    pub days: Vec<SleepDay>,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyPoint {
    pub name: String,
    pub completed: u32,
    pub possible: u32,
    pub accuracy: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyPoint {
    pub week: String,
    pub number: u32,
    pub completed: u32,
    pub possible: u32,
    pub percentage: u32,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub monthly: Vec<MonthlyPoint>,
    pub weekly: Vec<WeeklyPoint>,
    pub yearly_accuracy: u32,
    pub total_completed: u32,
    pub top_performer: Option<String>,
}

//! Owner of habits, the completion log and the sleep log.
//!
//! Every mutation rewrites the affected collection under its own key before
//! returning. The three collections are written independently; there is no
//! atomicity across them.

use crate::errors::{TrackerError, TrackerResult};
use crate::models::{CompletionLog, Habit, SleepLog, TrackerData};
use crate::palette::{self, DEFAULT_HABIT_EMOJI, DEFAULT_HABIT_NAME, RandomSource};
use crate::storage::{self, HABITS_KEY, KeyValueStore, LOGS_KEY, SLEEP_KEY};
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};
use uuid::Uuid;

pub struct HabitStore {
    backend: Box<dyn KeyValueStore>,
    rng: Box<dyn RandomSource>,
    data: TrackerData,
}

impl HabitStore {
    /// Loads each collection from `backend`, falling back to its default when
    /// the entry is missing, unreadable or corrupt.
    pub fn open(backend: impl KeyValueStore + 'static, rng: impl RandomSource + 'static) -> Self {
        let backend: Box<dyn KeyValueStore> = Box::new(backend);
        let habits = load_or(&*backend, HABITS_KEY, palette::starter_habits);
        let logs: CompletionLog = load_or(&*backend, LOGS_KEY, CompletionLog::new);
        let sleep: SleepLog = load_or(&*backend, SLEEP_KEY, SleepLog::new);
        info!(
            habits = habits.len(),
            logged_habits = logs.len(),
            sleep_entries = sleep.len(),
            "tracker state loaded"
        );

        Self {
            backend,
            rng: Box::new(rng),
            data: TrackerData {
                habits,
                logs,
                sleep,
            },
        }
    }

    pub fn data(&self) -> &TrackerData {
        &self.data
    }

    pub fn habits(&self) -> &[Habit] {
        &self.data.habits
    }

    pub fn logs(&self) -> &CompletionLog {
        &self.data.logs
    }

    pub fn sleep_logs(&self) -> &SleepLog {
        &self.data.sleep
    }

    pub fn habit(&self, id: &str) -> TrackerResult<&Habit> {
        self.data
            .habits
            .iter()
            .find(|habit| habit.id == id)
            .ok_or_else(|| TrackerError::NotFound(id.to_string()))
    }

    /// Appends a habit. If the write fails the habit is dropped again.
    pub fn add_habit(
        &mut self,
        name: Option<String>,
        emoji: Option<String>,
    ) -> TrackerResult<Habit> {
        let habit = Habit {
            id: Uuid::new_v4().to_string(),
            name: name.unwrap_or_else(|| DEFAULT_HABIT_NAME.to_string()),
            emoji: emoji.unwrap_or_else(|| DEFAULT_HABIT_EMOJI.to_string()),
            color: palette::pick_color(self.rng.as_mut()).to_string(),
        };
        self.data.habits.push(habit.clone());
        if let Err(err) = self.persist_habits() {
            self.data.habits.pop();
            return Err(err);
        }
        info!(id = %habit.id, color = %habit.color, "habit added");
        Ok(habit)
    }

    /// Replaces name and emoji in place. Unknown ids are a silent no-op and
    /// return `None` without touching the backend.
    pub fn update_habit(
        &mut self,
        id: &str,
        name: impl Into<String>,
        emoji: impl Into<String>,
    ) -> TrackerResult<Option<Habit>> {
        let Some(index) = self.data.habits.iter().position(|habit| habit.id == id) else {
            return Ok(None);
        };
        let habit = &mut self.data.habits[index];
        let previous = (
            std::mem::replace(&mut habit.name, name.into()),
            std::mem::replace(&mut habit.emoji, emoji.into()),
        );
        let updated = habit.clone();
        if let Err(err) = self.persist_habits() {
            let habit = &mut self.data.habits[index];
            (habit.name, habit.emoji) = previous;
            return Err(err);
        }
        info!(id, "habit updated");
        Ok(Some(updated))
    }

    /// Drops the habit and every completion entry recorded under `id`,
    /// including entries left behind for ids that are no longer habits.
    /// Returns `false` when there was nothing to drop; nothing is written in
    /// that case. A failed write puts both collections back as they were, so
    /// the call can be retried.
    pub fn remove_habit(&mut self, id: &str) -> TrackerResult<bool> {
        let position = self.data.habits.iter().position(|habit| habit.id == id);
        let removed_habit = position.map(|index| (index, self.data.habits.remove(index)));
        let removed_logs = self.data.logs.remove(id);
        if removed_habit.is_none() && removed_logs.is_none() {
            return Ok(false);
        }

        let mut written = Ok(());
        if removed_habit.is_some() {
            written = self.persist_habits();
        }
        if written.is_ok() && removed_logs.is_some() {
            written = self.persist_logs();
        }
        if let Err(err) = written {
            if let Some((index, habit)) = removed_habit {
                self.data.habits.insert(index, habit);
            }
            if let Some(days) = removed_logs {
                self.data.logs.insert(id.to_string(), days);
            }
            return Err(err);
        }
        info!(id, "habit removed");
        Ok(true)
    }

    /// Flips the flag for `(habit_id, date_key)` and returns the new value.
    /// Neither argument is validated.
    pub fn toggle_completion(&mut self, habit_id: &str, date_key: &str) -> TrackerResult<bool> {
        let flag = self
            .data
            .logs
            .entry(habit_id.to_string())
            .or_default()
            .entry(date_key.to_string())
            .or_default();
        *flag = !*flag;
        let completed = *flag;
        if let Err(err) = self.persist_logs() {
            if let Some(flag) = self
                .data
                .logs
                .get_mut(habit_id)
                .and_then(|days| days.get_mut(date_key))
            {
                *flag = !completed;
            }
            return Err(err);
        }
        Ok(completed)
    }

    /// Overwrites the hours for `date_key`. Any finite value is accepted;
    /// NaN and infinities are refused because JSON cannot carry them back.
    pub fn set_sleep_hours(&mut self, date_key: &str, hours: f64) -> TrackerResult<()> {
        if !hours.is_finite() {
            return Err(TrackerError::InvalidHours(hours));
        }
        let previous = self.data.sleep.insert(date_key.to_string(), hours);
        if let Err(err) = self.persist_sleep() {
            match previous {
                Some(hours) => self.data.sleep.insert(date_key.to_string(), hours),
                None => self.data.sleep.remove(date_key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn persist_habits(&mut self) -> TrackerResult<()> {
        storage::persist_collection(self.backend.as_mut(), HABITS_KEY, &self.data.habits)
    }

    fn persist_logs(&mut self) -> TrackerResult<()> {
        storage::persist_collection(self.backend.as_mut(), LOGS_KEY, &self.data.logs)
    }

    fn persist_sleep(&mut self) -> TrackerResult<()> {
        storage::persist_collection(self.backend.as_mut(), SLEEP_KEY, &self.data.sleep)
    }
}

fn load_or<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
    default: impl FnOnce() -> T,
) -> T {
    match storage::load_collection(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => default(),
        Err(err @ TrackerError::CorruptState { .. }) => {
            warn!("{err}; using defaults");
            default()
        }
        Err(err) => {
            error!("failed to read '{key}': {err}");
            default()
        }
    }
}

use crate::calendar::{self, month_table};
use crate::errors::TrackerResult;
use crate::models::{AnalyticsResponse, MonthlyPoint, SleepDay, TrackerData, WeeklyPoint};
use std::collections::BTreeMap;

const WEEK_LIMIT: usize = 52;

pub fn build_analytics(data: &TrackerData) -> AnalyticsResponse {
    let monthly = monthly_summary(data);
    AnalyticsResponse {
        weekly: weekly_summary(data),
        yearly_accuracy: yearly_accuracy(&monthly),
        total_completed: total_yearly_completions(&monthly),
        top_performer: top_performer(data),
        monthly,
    }
}

/// Completion per month over the current habits only; log entries for
/// removed habits are ignored.
pub fn monthly_summary(data: &TrackerData) -> Vec<MonthlyPoint> {
    let habit_count = data.habits.len() as u32;
    month_table()
        .iter()
        .enumerate()
        .map(|(month_index, month)| {
            let completed: u32 = data
                .habits
                .iter()
                .map(|habit| {
                    (1..=month.day_count)
                        .filter(|&day| {
                            data.is_completed(&habit.id, &calendar::format_key(month_index, day))
                        })
                        .count() as u32
                })
                .sum();
            let possible = month.day_count * habit_count;
            MonthlyPoint {
                name: month.short_name().to_string(),
                completed,
                possible,
                accuracy: percent(completed, possible),
            }
        })
        .collect()
}

/// Tally per ISO week, ascending by week number, capped at 52 buckets.
pub fn weekly_summary(data: &TrackerData) -> Vec<WeeklyPoint> {
    let mut weeks: BTreeMap<u32, (u32, u32)> = BTreeMap::new();
    for habit in &data.habits {
        for (month_index, day) in calendar::year_days() {
            let Ok(week) = calendar::iso_week_number(month_index, day) else {
                continue;
            };
            let bucket = weeks.entry(week).or_default();
            if data.is_completed(&habit.id, &calendar::format_key(month_index, day)) {
                bucket.0 += 1;
            }
            bucket.1 += 1;
        }
    }

    weeks
        .into_iter()
        .take(WEEK_LIMIT)
        .map(|(number, (completed, possible))| WeeklyPoint {
            week: format!("W{number}"),
            number,
            completed,
            possible,
            percentage: percent(completed, possible),
        })
        .collect()
}

/// Mean of the monthly percentages, so every month weighs the same
/// regardless of its length.
pub fn yearly_accuracy(monthly: &[MonthlyPoint]) -> u32 {
    if monthly.is_empty() {
        return 0;
    }
    let sum: u32 = monthly.iter().map(|point| point.accuracy).sum();
    (f64::from(sum) / monthly.len() as f64).round() as u32
}

pub fn total_yearly_completions(monthly: &[MonthlyPoint]) -> u32 {
    monthly.iter().map(|point| point.completed).sum()
}

/// Mean of the month's non-zero entries; 0.0 when the month has none.
pub fn monthly_sleep_average(data: &TrackerData, month_index: usize) -> TrackerResult<f64> {
    let logged: Vec<f64> = month_sleep_series(data, month_index)?
        .into_iter()
        .map(|day| day.hours)
        .filter(|hours| *hours > 0.0)
        .collect();
    if logged.is_empty() {
        return Ok(0.0);
    }
    Ok(logged.iter().sum::<f64>() / logged.len() as f64)
}

/// One decimal place, the precision sleep averages are shown with.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn month_sleep_series(
    data: &TrackerData,
    month_index: usize,
) -> TrackerResult<Vec<SleepDay>> {
    let month = calendar::month(month_index)?;
    (1..=month.day_count)
        .map(|day| {
            let date = calendar::date_key(month_index, day)?;
            Ok(SleepDay {
                day,
                weekday: calendar::weekday_label(month_index, day)?,
                hours: data.sleep_hours(&date),
                date,
            })
        })
        .collect()
}

pub fn top_performer(data: &TrackerData) -> Option<String> {
    data.habits.first().map(|habit| habit.name.clone())
}

fn percent(completed: u32, possible: u32) -> u32 {
    if possible == 0 {
        return 0;
    }
    (f64::from(completed) * 100.0 / f64::from(possible)).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TrackerError;
    use crate::models::Habit;

    fn habit(id: &str) -> Habit {
        Habit {
            id: id.to_string(),
            name: format!("habit {id}"),
            emoji: "✨".to_string(),
            color: "#BDE0FE".to_string(),
        }
    }

    fn mark(data: &mut TrackerData, habit_id: &str, date: &str) {
        data.logs
            .entry(habit_id.to_string())
            .or_default()
            .insert(date.to_string(), true);
    }

    #[test]
    fn no_habits_means_zero_accuracy_everywhere() {
        let data = TrackerData::default();
        let monthly = monthly_summary(&data);
        assert_eq!(monthly.len(), 12);
        assert!(monthly.iter().all(|m| m.accuracy == 0 && m.possible == 0));
        assert_eq!(yearly_accuracy(&monthly), 0);
        assert!(weekly_summary(&data).is_empty());
        assert_eq!(top_performer(&data), None);
    }

    #[test]
    fn single_march_completion() {
        let mut data = TrackerData {
            habits: vec![habit("a")],
            ..Default::default()
        };
        mark(&mut data, "a", "2026-03-15");

        let march = &monthly_summary(&data)[2];
        assert_eq!(march.name, "Mar");
        assert_eq!((march.completed, march.possible, march.accuracy), (1, 31, 3));

        let analytics = build_analytics(&data);
        assert_eq!(analytics.total_completed, 1);
        assert_eq!(analytics.top_performer.as_deref(), Some("habit a"));
    }

    #[test]
    fn false_flags_and_stale_habits_do_not_count() {
        let mut data = TrackerData {
            habits: vec![habit("a")],
            ..Default::default()
        };
        mark(&mut data, "gone", "2026-01-10");
        data.logs
            .entry("a".to_string())
            .or_default()
            .insert("2026-01-11".to_string(), false);

        let january = &monthly_summary(&data)[0];
        assert_eq!((january.completed, january.possible), (0, 31));
    }

    #[test]
    fn removing_a_habit_shrinks_possible_counts() {
        let mut data = TrackerData {
            habits: vec![habit("a"), habit("b")],
            ..Default::default()
        };
        mark(&mut data, "b", "2026-07-04");
        let before = monthly_summary(&data);

        data.habits.retain(|h| h.id != "b");
        data.logs.remove("b");
        let after = monthly_summary(&data);

        for (old, new) in before.iter().zip(&after) {
            assert_eq!(new.possible * 2, old.possible);
            assert_eq!(new.completed, 0);
        }
        assert_eq!(before[6].completed, 1);
    }

    #[test]
    fn yearly_accuracy_averages_monthly_percentages() {
        let mut data = TrackerData {
            habits: vec![habit("a")],
            ..Default::default()
        };
        // Every day of February: 100% for a 28-day month.
        for day in 1..=28 {
            mark(&mut data, "a", &format!("2026-02-{day:02}"));
        }
        let monthly = monthly_summary(&data);
        assert_eq!(monthly[1].accuracy, 100);
        // A global ratio would give round(29 / 365 * 100) = 8.
        mark(&mut data, "a", "2026-01-01");
        let monthly = monthly_summary(&data);
        assert_eq!(monthly[0].accuracy, 3);
        assert_eq!(yearly_accuracy(&monthly), 9);
        assert_eq!(total_yearly_completions(&monthly), 29);
    }

    #[test]
    fn weekly_summary_caps_at_52_iso_weeks() {
        let mut data = TrackerData {
            habits: vec![habit("a"), habit("b")],
            ..Default::default()
        };
        mark(&mut data, "a", "2026-01-01");
        mark(&mut data, "b", "2026-01-04");
        mark(&mut data, "a", "2026-01-05");

        let weekly = weekly_summary(&data);
        assert_eq!(weekly.len(), 52);
        assert_eq!(weekly[0].week, "W1");
        // Week 1 of 2026 holds Jan 1..4 only inside the tracked year.
        assert_eq!((weekly[0].completed, weekly[0].possible), (2, 8));
        assert_eq!(weekly[0].percentage, 25);
        assert_eq!((weekly[1].completed, weekly[1].possible), (1, 14));
        assert_eq!(weekly[1].percentage, 7);
        assert_eq!(weekly.last().map(|w| w.number), Some(52));
    }

    #[test]
    fn sleep_average_skips_zero_entries() {
        let mut data = TrackerData::default();
        data.sleep.insert("2026-06-01".to_string(), 7.5);
        data.sleep.insert("2026-06-02".to_string(), 8.5);
        data.sleep.insert("2026-06-03".to_string(), 0.0);
        data.sleep.insert("2026-07-01".to_string(), 4.0);
        assert_eq!(monthly_sleep_average(&data, 5).unwrap(), 8.0);
    }

    #[test]
    fn sleep_average_rounds_to_one_decimal_for_display() {
        let mut data = TrackerData::default();
        for (date, hours) in [
            ("2026-03-01", 7.0),
            ("2026-03-02", 7.0),
            ("2026-03-03", 8.0),
        ] {
            data.sleep.insert(date.to_string(), hours);
        }
        let average = monthly_sleep_average(&data, 2).unwrap();
        assert!((average - 22.0 / 3.0).abs() < 1e-9);
        assert_eq!(round_to_tenth(average), 7.3);
        assert_eq!(round_to_tenth(8.0), 8.0);
        assert_eq!(round_to_tenth(6.25), 6.3);
        assert_eq!(round_to_tenth(0.0), 0.0);
    }

    #[test]
    fn sleep_average_without_entries_is_zero() {
        let data = TrackerData::default();
        assert_eq!(monthly_sleep_average(&data, 0).unwrap(), 0.0);
        assert!(matches!(
            monthly_sleep_average(&data, 12),
            Err(TrackerError::InvalidDate(_))
        ));
    }

    #[test]
    fn sleep_series_covers_every_day() {
        let mut data = TrackerData::default();
        data.sleep.insert("2026-02-14".to_string(), 9.0);
        let series = month_sleep_series(&data, 1).unwrap();
        assert_eq!(series.len(), 28);
        assert_eq!(series[13].date, "2026-02-14");
        assert_eq!(series[13].weekday, "Sat");
        assert_eq!(series[13].hours, 9.0);
        assert_eq!(series[0].hours, 0.0);
    }
}

// ABOUTME: Daily check-in reminder schedule and the loop that announces each prompt.
// ABOUTME: Runs outside the record store; it only tells the user when to record.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime, NaiveTime};
use thiserror::Error;

pub const REMINDER_TITLE: &str = "Experience Sampling";
pub const REMINDER_BODY: &str = "Time to record how you're feeling!";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("invalid reminder time {0:?}, expected HH:MM")]
    InvalidTime(String),

    #[error("at least one reminder time is required")]
    Empty,
}

/// Local times of day at which the user is prompted, sorted and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderSchedule {
    times: Vec<NaiveTime>,
}

impl ReminderSchedule {
    pub fn new(mut times: Vec<NaiveTime>) -> Result<Self, ScheduleError> {
        if times.is_empty() {
            return Err(ScheduleError::Empty);
        }
        times.sort();
        times.dedup();
        Ok(Self { times })
    }

    pub fn times(&self) -> &[NaiveTime] {
        &self.times
    }

    /// The first prompt strictly after `now`, rolling over to tomorrow's first slot.
    pub fn next_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date();
        if let Some(time) = self.times.iter().find(|t| today.and_time(**t) > now) {
            return today.and_time(*time);
        }
        let tomorrow = today.succ_opt().unwrap_or(today);
        tomorrow.and_time(self.times[0])
    }

    /// The next `count` prompts after `now`, in order.
    pub fn upcoming(&self, now: NaiveDateTime, count: usize) -> Vec<NaiveDateTime> {
        std::iter::successors(Some(self.next_after(now)), |prev| {
            Some(self.next_after(*prev))
        })
        .take(count)
        .collect()
    }
}

impl Default for ReminderSchedule {
    /// Three prompts a day: 09:00, 14:00 and 20:00.
    fn default() -> Self {
        let times = [(9, 0), (14, 0), (20, 0)]
            .into_iter()
            .filter_map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0))
            .collect();
        Self { times }
    }
}

impl FromStr for ReminderSchedule {
    type Err = ScheduleError;

    /// Parse a comma-separated list such as `09:00,14:00,20:00`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let times = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                NaiveTime::parse_from_str(part, "%H:%M")
                    .map_err(|_| ScheduleError::InvalidTime(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(times)
    }
}

impl fmt::Display for ReminderSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .times
            .iter()
            .map(|t| t.format("%H:%M").to_string())
            .collect();
        f.write_str(&parts.join(","))
    }
}

/// Announce each scheduled prompt on stdout until Ctrl-C.
pub async fn run_reminders(schedule: &ReminderSchedule) -> anyhow::Result<()> {
    tracing::info!(%schedule, "reminder loop started");
    loop {
        let now = Local::now().naive_local();
        let next = schedule.next_after(now);
        let wait = (next - now).to_std().unwrap_or_default();
        tracing::debug!(%next, wait_secs = wait.as_secs(), "waiting for next reminder");

        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                println!("[{}] {REMINDER_TITLE}: {REMINDER_BODY}", next.format("%Y-%m-%d %H:%M"));
                tracing::info!(%next, "reminder fired");
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                tracing::info!("reminder loop stopped");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn default_is_three_daily_prompts() {
        assert_eq!(ReminderSchedule::default().to_string(), "09:00,14:00,20:00");
    }

    #[test]
    fn next_after_picks_later_slot_today() {
        let schedule = ReminderSchedule::default();
        assert_eq!(schedule.next_after(at(8, 30)), at(9, 0));
        assert_eq!(schedule.next_after(at(9, 0)), at(14, 0));
        assert_eq!(schedule.next_after(at(19, 59)), at(20, 0));
    }

    #[test]
    fn next_after_rolls_over_to_tomorrow() {
        let schedule = ReminderSchedule::default();
        let next = schedule.next_after(at(21, 0));
        assert_eq!(
            next,
            NaiveDate::from_ymd_opt(2024, 3, 11)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn upcoming_walks_the_schedule() {
        let schedule = ReminderSchedule::default();
        let upcoming = schedule.upcoming(at(12, 0), 4);
        assert_eq!(upcoming.len(), 4);
        assert_eq!(upcoming[0], at(14, 0));
        assert_eq!(upcoming[1], at(20, 0));
        assert_eq!(upcoming[2].time(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(upcoming[3].time(), NaiveTime::from_hms_opt(14, 0, 0).unwrap());
    }

    #[test]
    fn parse_sorts_and_dedups() {
        let schedule: ReminderSchedule = "20:00, 09:30,20:00".parse().unwrap();
        assert_eq!(schedule.to_string(), "09:30,20:00");
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!(
            "25:00".parse::<ReminderSchedule>(),
            Err(ScheduleError::InvalidTime("25:00".to_string()))
        );
        assert_eq!("".parse::<ReminderSchedule>(), Err(ScheduleError::Empty));
        assert_eq!(" , ".parse::<ReminderSchedule>(), Err(ScheduleError::Empty));
    }
}

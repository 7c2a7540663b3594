use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Timelike};
use tracing::warn;
use wizard_config::SchedulingDefaults;

use super::{recurrence::weekday_code, DurationParts};

/// Organisation rules for proposing the next recording slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotProperties {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: u32,
    pub interval_minutes: u32,
}

impl Default for SlotProperties {
    fn default() -> Self {
        Self::from_defaults(&SchedulingDefaults::default())
    }
}

impl SlotProperties {
    pub fn from_defaults(defaults: &SchedulingDefaults) -> Self {
        Self {
            start_time: parse_time(&defaults.start_time, 8),
            end_time: parse_time(&defaults.end_time, 20),
            duration_minutes: defaults.duration_minutes,
            interval_minutes: defaults.interval_minutes.max(1),
        }
    }

    /// Next slot on the interval grid anchored at `start_time`. A slot that
    /// would begin at or after `end_time` moves to tomorrow's `start_time`.
    pub fn next_slot(&self, now: NaiveDateTime) -> ProposedSlot {
        let today = now.date();
        let mut start = today.and_time(self.start_time);
        let cutoff = today.and_time(self.end_time);
        let elapsed = (now - start).num_seconds();

        if elapsed > 0 {
            let interval = i64::from(self.interval_minutes.max(1)) * 60;
            let steps = (elapsed + interval - 1) / interval;
            start += Duration::seconds(steps * interval);
            if start >= cutoff {
                start = today.and_time(self.start_time) + Duration::days(1);
            }
        }

        ProposedSlot {
            start,
            end: start + Duration::minutes(i64::from(self.duration_minutes)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposedSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ProposedSlot {
    /// Field suggestions for the event source form.
    pub fn suggestions(&self) -> BTreeMap<String, String> {
        let duration = DurationParts::from_minutes((self.end - self.start).num_minutes());
        let mut values = BTreeMap::new();
        values.insert("start_date".into(), self.start.format("%Y-%m-%d").to_string());
        values.insert("start_hour".into(), self.start.hour().to_string());
        values.insert("start_minute".into(), self.start.minute().to_string());
        values.insert(
            "duration_hour".into(),
            duration.hour.unwrap_or_default().to_string(),
        );
        values.insert(
            "duration_minute".into(),
            duration.minute.unwrap_or_default().to_string(),
        );
        values.insert("end_date".into(), self.end.format("%Y-%m-%d").to_string());
        values.insert("end_hour".into(), self.end.hour().to_string());
        values.insert("end_minute".into(), self.end.minute().to_string());
        values.insert(
            "weekdays".into(),
            weekday_code(self.start.weekday()).to_string(),
        );
        values
    }
}

fn parse_time(raw: &str, fallback_hour: u32) -> NaiveTime {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").unwrap_or_else(|_| {
        warn!(value = raw, "invalid scheduling time, using default");
        NaiveTime::from_hms_opt(fallback_hour, 0, 0).unwrap_or(NaiveTime::MIN)
    })
}

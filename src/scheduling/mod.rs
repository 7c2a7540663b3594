//! Scheduling arithmetic shared by the event source step and the conflict
//! checkers: start/duration/end bookkeeping, recurrence rules and default
//! recording slots.

pub mod recurrence;
pub mod slots;

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub use recurrence::{occurrences, parse_weekday, weekday_code, weekly_rrule};
pub use slots::{ProposedSlot, SlotProperties};

const AGENT_ROLE_PREFIX: &str = "ROLE_CAPTURE_AGENT_";

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// A date plus wall-clock time, each part filled independently by the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimePoint {
    pub date: Option<NaiveDate>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
}

impl TimePoint {
    pub fn time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour?, self.minute?, 0)
    }

    pub fn at(&self) -> Option<NaiveDateTime> {
        Some(self.date?.and_time(self.time()?))
    }

    pub fn set(&mut self, at: NaiveDateTime) {
        self.date = Some(at.date());
        self.set_time(at.time());
    }

    pub fn set_time(&mut self, time: NaiveTime) {
        self.hour = Some(time.hour());
        self.minute = Some(time.minute());
    }

    fn is_complete(&self) -> bool {
        self.date.is_some() && self.hour.is_some() && self.minute.is_some()
    }

    fn to_json(self) -> Value {
        json!({
            "date": self.date.map(|date| date.format("%Y-%m-%d").to_string()),
            "hour": self.hour,
            "minute": self.minute,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationParts {
    pub hour: Option<u32>,
    pub minute: Option<u32>,
}

impl DurationParts {
    pub fn from_minutes(minutes: i64) -> Self {
        let minutes = minutes.max(0);
        Self {
            hour: u32::try_from(minutes / 60).ok(),
            minute: u32::try_from(minutes % 60).ok(),
        }
    }

    pub fn minutes(&self) -> Option<i64> {
        Some(i64::from(self.hour?) * 60 + i64::from(self.minute?))
    }

    /// `HH:MM`, zero padded.
    pub fn formatted(&self) -> Option<String> {
        Some(format!("{:02}:{:02}", self.hour?, self.minute?))
    }
}

/// Which part of the schedule the user just edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalField {
    Start,
    Duration,
    End,
}

/// Schedule of a single recording or of a weekly recurring series.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleSettings {
    pub start: TimePoint,
    pub duration: DurationParts,
    pub end: TimePoint,
    pub device: Option<String>,
    pub input_methods: BTreeSet<String>,
    weekdays: BTreeSet<u32>,
}

impl ScheduleSettings {
    pub fn weekdays(&self) -> Vec<Weekday> {
        self.weekdays
            .iter()
            .filter_map(|idx| WEEK.get(*idx as usize).copied())
            .collect()
    }

    pub fn set_weekdays(&mut self, days: impl IntoIterator<Item = Weekday>) {
        self.weekdays = days
            .into_iter()
            .map(|day| day.num_days_from_monday())
            .collect();
    }

    pub fn toggle_weekday(&mut self, day: Weekday) {
        let idx = day.num_days_from_monday();
        if !self.weekdays.remove(&idx) {
            self.weekdays.insert(idx);
        }
    }

    pub fn has_weekday(&self) -> bool {
        !self.weekdays.is_empty()
    }

    pub fn start_at(&self) -> Option<NaiveDateTime> {
        self.start.at()
    }

    /// End of the first occurrence.
    pub fn first_end_at(&self) -> Option<NaiveDateTime> {
        Some(self.start_at()? + Duration::minutes(self.duration.minutes()?))
    }

    /// Every form field filled in; recurring schedules also need a weekday.
    pub fn is_complete(&self, recurring: bool) -> bool {
        let base = self.start.is_complete()
            && self.duration.minutes().is_some()
            && self.end.is_complete()
            && self.device.as_deref().is_some_and(|device| !device.is_empty());
        if recurring {
            base && self.has_weekday()
        } else {
            base
        }
    }

    pub fn to_json(&self, recurring: bool) -> Value {
        let rrule = if recurring {
            ConflictQuery::from_settings(self, true).and_then(|query| query.rrule)
        } else {
            None
        };
        json!({
            "start": self.start.to_json(),
            "duration": {
                "hour": self.duration.hour,
                "minute": self.duration.minute,
            },
            "end": self.end.to_json(),
            "device": self.device,
            "inputMethods": self.input_methods.iter().collect::<Vec<_>>(),
            "weekdays": self.weekdays().into_iter().map(weekday_code).collect::<Vec<_>>(),
            "rrule": rrule,
        })
    }
}

/// Keeps start, duration and end consistent after one of them changed.
///
/// Editing the start or the duration moves the end; editing the end time
/// recomputes the duration, wrapping past midnight when the end time is
/// earlier than the start time. A single recording's end date always follows
/// the computed end; a recurring series keeps its own end date unless it falls
/// before the start date.
pub fn apply_temporal_change(settings: &mut ScheduleSettings, changed: TemporalField, single: bool) {
    let Some(start) = settings.start_at() else {
        return;
    };

    match changed {
        TemporalField::Start | TemporalField::Duration => {
            let Some(minutes) = settings.duration.minutes() else {
                return;
            };
            let end = start + Duration::minutes(minutes);
            settings.end.set_time(end.time());
            if single {
                settings.end.date = Some(end.date());
            }
        }
        TemporalField::End => {
            let Some(end_time) = settings.end.time() else {
                return;
            };
            let mut end = start.date().and_time(end_time);
            if end < start {
                end += Duration::days(1);
            }
            settings.duration = DurationParts::from_minutes((end - start).num_minutes());
            if single {
                settings.end.date = Some(end.date());
            }
        }
    }

    if !single {
        if let (Some(start_date), Some(end_date)) = (settings.start.date, settings.end.date) {
            if end_date < start_date {
                settings.end.date = Some(start_date);
            }
        }
    }
}

/// The first occurrence finishes before `now`.
pub fn already_ended(settings: &ScheduleSettings, now: NaiveDateTime) -> bool {
    settings.first_end_at().is_some_and(|end| end < now)
}

pub fn end_before_start(settings: &ScheduleSettings) -> bool {
    matches!(
        (settings.start.date, settings.end.date),
        (Some(start), Some(end)) if end < start
    )
}

/// Request sent to a conflict checker for one proposed schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictQuery {
    pub device: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_minutes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rrule: Option<String>,
    #[serde(skip)]
    pub weekdays: Vec<Weekday>,
}

impl ConflictQuery {
    /// Builds the query once enough of the schedule is known to poll for
    /// conflicts; `None` otherwise.
    pub fn from_settings(settings: &ScheduleSettings, recurring: bool) -> Option<Self> {
        let device = settings.device.clone().filter(|device| !device.is_empty())?;
        let start = settings.start_at()?;
        let duration_minutes = settings.duration.minutes()?;
        let first_end = start + Duration::minutes(duration_minutes);

        if !recurring {
            return Some(Self {
                device,
                start,
                end: first_end,
                duration_minutes,
                rrule: None,
                weekdays: Vec::new(),
            });
        }

        let last_date = settings.end.date?;
        if !settings.has_weekday() {
            return None;
        }
        let weekdays = settings.weekdays();
        let end = last_date.and_time(start.time()) + Duration::minutes(duration_minutes);
        Some(Self {
            device,
            start,
            end,
            duration_minutes,
            rrule: Some(weekly_rrule(&weekdays, start.hour(), start.minute())),
            weekdays,
        })
    }

    pub fn is_recurring(&self) -> bool {
        self.rrule.is_some()
    }
}

/// An existing reservation of a capture device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub title: String,
    pub device: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Booking {
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start < end && start < self.end
    }
}

/// Role granting access to schedule on a capture agent.
pub fn agent_capability_role(agent_id: &str) -> String {
    let normalized: String = agent_id
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .map(|ch| ch.to_ascii_uppercase())
        .collect();
    format!("{AGENT_ROLE_PREFIX}{normalized}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn single_at(hour: u32, minute: u32, duration: i64) -> ScheduleSettings {
        let mut settings = ScheduleSettings::default();
        settings.start = TimePoint {
            date: Some(date(2026, 10, 20)),
            hour: Some(hour),
            minute: Some(minute),
        };
        settings.duration = DurationParts::from_minutes(duration);
        settings.device = Some("room-1".into());
        settings
    }

    #[test]
    fn start_change_moves_end() {
        let mut settings = single_at(9, 30, 90);
        apply_temporal_change(&mut settings, TemporalField::Start, true);

        assert_eq!(settings.end.date, Some(date(2026, 10, 20)));
        assert_eq!(settings.end.hour, Some(11));
        assert_eq!(settings.end.minute, Some(0));
    }

    #[test]
    fn end_change_recomputes_duration_across_midnight() {
        let mut settings = single_at(23, 0, 30);
        settings.end.hour = Some(0);
        settings.end.minute = Some(45);
        apply_temporal_change(&mut settings, TemporalField::End, true);

        assert_eq!(settings.duration.minutes(), Some(105));
        assert_eq!(settings.end.date, Some(date(2026, 10, 21)));
    }

    #[test]
    fn recurring_end_date_is_kept() {
        let mut settings = single_at(10, 0, 60);
        settings.end.date = Some(date(2026, 12, 18));
        apply_temporal_change(&mut settings, TemporalField::Duration, false);

        assert_eq!(settings.end.date, Some(date(2026, 12, 18)));
        assert_eq!(settings.end.hour, Some(11));
    }

    #[test]
    fn past_and_inverted_schedules_are_flagged() {
        let mut settings = single_at(9, 0, 60);
        let now = date(2026, 10, 20).and_hms_opt(10, 30, 0).unwrap();
        assert!(already_ended(&settings, now));
        assert!(!already_ended(&settings, now - Duration::hours(2)));

        settings.end.date = Some(date(2026, 10, 19));
        assert!(end_before_start(&settings));
    }

    #[test]
    fn recurring_query_needs_weekday_and_end_date() {
        let mut settings = single_at(9, 0, 60);
        assert!(ConflictQuery::from_settings(&settings, true).is_none());

        settings.end.date = Some(date(2026, 11, 20));
        settings.set_weekdays([Weekday::Wed, Weekday::Mon]);
        let query = ConflictQuery::from_settings(&settings, true).expect("query");

        assert_eq!(
            query.rrule.as_deref(),
            Some("FREQ=WEEKLY;BYDAY=MO,WE;BYHOUR=9;BYMINUTE=0")
        );
        assert_eq!(query.end, date(2026, 11, 20).and_hms_opt(10, 0, 0).unwrap());
    }

    #[test]
    fn agent_roles_are_normalized() {
        assert_eq!(agent_capability_role("room-1.a"), "ROLE_CAPTURE_AGENT_ROOM1A");
    }
}

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::collaborators::{Clock, OptionItem, OptionsKind};
use crate::errors::{CollaboratorError, FieldError};
use crate::scheduling::{
    already_ended, apply_temporal_change, end_before_start, parse_weekday, weekday_code, Booking,
    ConflictQuery, DurationParts, ScheduleSettings, SlotProperties, TemporalField,
};
use crate::wizard::{FieldDescriptor, FieldKind, Notice, StepState, WizardDraft};

pub const CONFLICT_DETECTED: &str = "CONFLICT_DETECTED";
pub const CONFLICT_ALREADY_ENDED: &str = "CONFLICT_ALREADY_ENDED";
pub const CONFLICT_END_BEFORE_START: &str = "CONFLICT_END_BEFORE_START";
pub const CONFLICT_CHECK_FAILED: &str = "CONFLICT_CHECK_FAILED";

const DEFAULT_FLAVOR: &str = "presenter/source";
const MAX_DURATION_HOURS: u32 = 24 * 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceKind {
    #[default]
    Upload,
    ScheduleSingle,
    ScheduleMultiple,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [
        SourceKind::Upload,
        SourceKind::ScheduleSingle,
        SourceKind::ScheduleMultiple,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Upload => "UPLOAD",
            SourceKind::ScheduleSingle => "SCHEDULE_SINGLE",
            SourceKind::ScheduleMultiple => "SCHEDULE_MULTIPLE",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(raw.trim()))
    }

    pub fn is_scheduled(&self) -> bool {
        !matches!(self, SourceKind::Upload)
    }

    pub fn is_recurring(&self) -> bool {
        matches!(self, SourceKind::ScheduleMultiple)
    }
}

/// Result of the latest conflict check for the current schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConflictStatus {
    #[default]
    Unknown,
    Pending,
    Clear,
    Conflicting(Vec<Booking>),
    Failed(String),
}

impl ConflictStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictStatus::Unknown => "unknown",
            ConflictStatus::Pending => "pending",
            ConflictStatus::Clear => "clear",
            ConflictStatus::Conflicting(_) => "conflicting",
            ConflictStatus::Failed(_) => "failed",
        }
    }
}

/// A media file attached to an uploaded event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub flavor: String,
    pub file: String,
}

/// Where the recording comes from: uploaded files, or a single or weekly
/// scheduled capture on an agent.
pub struct SourceStep {
    kind: SourceKind,
    /// Set when the wizard only edits schedules and the kind cannot change.
    fixed: Option<SourceKind>,
    tracks: Vec<Track>,
    schedule: ScheduleSettings,
    conflicts: ConflictStatus,
    agents: Vec<OptionItem>,
    clock: Arc<dyn Clock>,
    slot: SlotProperties,
}

impl SourceStep {
    pub fn new(clock: Arc<dyn Clock>, slot: SlotProperties) -> Self {
        Self {
            kind: SourceKind::default(),
            fixed: None,
            tracks: Vec::new(),
            schedule: ScheduleSettings::default(),
            conflicts: ConflictStatus::default(),
            agents: Vec::new(),
            clock,
            slot,
        }
    }

    /// A single scheduled recording whose kind cannot be changed, as used
    /// when editing already scheduled events.
    pub fn scheduled(clock: Arc<dyn Clock>, slot: SlotProperties) -> Self {
        let mut step = Self::new(clock, slot);
        step.kind = SourceKind::ScheduleSingle;
        step.fixed = Some(SourceKind::ScheduleSingle);
        step
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn schedule(&self) -> &ScheduleSettings {
        &self.schedule
    }

    pub fn conflicts(&self) -> &ConflictStatus {
        &self.conflicts
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Timing mistakes that make a schedule unusable regardless of bookings.
    pub fn timing_problems(&self) -> Vec<&'static str> {
        let mut problems = Vec::new();
        if !self.kind.is_scheduled() {
            return problems;
        }
        if already_ended(&self.schedule, self.clock.now()) {
            problems.push(CONFLICT_ALREADY_ENDED);
        }
        if end_before_start(&self.schedule) {
            problems.push(CONFLICT_END_BEFORE_START);
        }
        problems
    }

    fn status(&self) -> &'static str {
        if !self.kind.is_scheduled() {
            "not_required"
        } else if !self.timing_problems().is_empty() {
            "conflicting"
        } else {
            self.conflicts.as_str()
        }
    }

    /// Seeds an empty schedule with the next free slot.
    fn prefill(&mut self) {
        if self.schedule.start.date.is_some() {
            return;
        }
        let proposal = self.slot.next_slot(self.clock.now());
        self.schedule.start.set(proposal.start);
        self.schedule.duration =
            DurationParts::from_minutes((proposal.end - proposal.start).num_minutes());
        self.schedule.end.set(proposal.end);
        if !self.schedule.has_weekday() {
            self.schedule.set_weekdays([proposal.start.weekday()]);
        }
    }

    fn set_schedule_field(&mut self, field: &str, value: &Value) -> Result<(), FieldError> {
        let single = self.kind == SourceKind::ScheduleSingle;
        let changed = match field {
            "start_date" => {
                self.schedule.start.date = date(value)?;
                Some(TemporalField::Start)
            }
            "start_hour" => {
                self.schedule.start.hour = number(value, 23, "Hour")?;
                Some(TemporalField::Start)
            }
            "start_minute" => {
                self.schedule.start.minute = number(value, 59, "Minute")?;
                Some(TemporalField::Start)
            }
            "duration_hour" => {
                self.schedule.duration.hour = number(value, MAX_DURATION_HOURS, "Hours")?;
                Some(TemporalField::Duration)
            }
            "duration_minute" => {
                self.schedule.duration.minute = number(value, 59, "Minutes")?;
                Some(TemporalField::Duration)
            }
            "end_date" => {
                self.schedule.end.date = date(value)?;
                None
            }
            "end_hour" => {
                self.schedule.end.hour = number(value, 23, "Hour")?;
                Some(TemporalField::End)
            }
            "end_minute" => {
                self.schedule.end.minute = number(value, 59, "Minute")?;
                Some(TemporalField::End)
            }
            "device" => {
                let device = match value {
                    Value::Null => None,
                    Value::String(id) if id.trim().is_empty() => None,
                    Value::String(id) => Some(id.trim().to_string()),
                    _ => return Err(FieldError::new("Expected a capture agent id")),
                };
                if let Some(id) = &device {
                    if !self.agents.is_empty() && !self.agents.iter().any(|agent| &agent.value == id) {
                        return Err(FieldError::new(format!("Unknown capture agent `{id}`")));
                    }
                }
                if device != self.schedule.device {
                    self.schedule.input_methods.clear();
                }
                self.schedule.device = device;
                None
            }
            "input_methods" => {
                self.schedule.input_methods = strings(value)?.into_iter().collect();
                None
            }
            "weekdays" => {
                let days = strings(value)?
                    .iter()
                    .map(|raw| {
                        parse_weekday(raw)
                            .ok_or_else(|| FieldError::new(format!("Unknown weekday `{raw}`")))
                    })
                    .collect::<Result<Vec<Weekday>, _>>()?;
                self.schedule.set_weekdays(days);
                None
            }
            other => return Err(FieldError::new(format!("Unknown field `{other}`"))),
        };
        if let Some(changed) = changed {
            apply_temporal_change(&mut self.schedule, changed, single);
        }
        Ok(())
    }
}

fn number(value: &Value, max: u32, label: &str) -> Result<Option<u32>, FieldError> {
    let parsed = match value {
        Value::Null => return Ok(None),
        Value::Number(number) => number.as_u64(),
        Value::String(raw) => raw.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed
        .and_then(|number| u32::try_from(number).ok())
        .filter(|number| *number <= max)
        .map(Some)
        .ok_or_else(|| FieldError::new(format!("{label} must be between 0 and {max}")))
}

fn date(value: &Value) -> Result<Option<NaiveDate>, FieldError> {
    match value {
        Value::Null => Ok(None),
        Value::String(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| FieldError::new("Use YYYY-MM-DD format")),
        _ => Err(FieldError::new("Use YYYY-MM-DD format")),
    }
}

/// A JSON list of strings, or a single comma separated string.
fn strings(value: &Value) -> Result<Vec<String>, FieldError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(raw) => Ok(raw
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| FieldError::new("Expected a list of strings"))
            })
            .collect(),
        _ => Err(FieldError::new("Expected a list of strings")),
    }
}

fn tracks(value: &Value) -> Result<Vec<Track>, FieldError> {
    let Value::Array(items) = value else {
        return strings(value).map(|files| {
            files
                .into_iter()
                .map(|file| Track {
                    flavor: DEFAULT_FLAVOR.into(),
                    file,
                })
                .collect()
        });
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(file) => Ok(Track {
                flavor: DEFAULT_FLAVOR.into(),
                file: file.clone(),
            }),
            other => serde_json::from_value(other.clone())
                .map_err(|_| FieldError::new("Tracks need a flavor and a file")),
        })
        .collect()
}

impl StepState for SourceStep {
    fn draft(&self) -> Value {
        let items = match &self.conflicts {
            ConflictStatus::Conflicting(bookings) => bookings.clone(),
            _ => Vec::new(),
        };
        let schedule = if self.kind.is_scheduled() {
            self.schedule.to_json(self.kind.is_recurring())
        } else {
            Value::Null
        };
        json!({
            "type": self.kind.as_str(),
            "tracks": self.tracks,
            "schedule": schedule,
            "conflicts": {
                "status": self.status(),
                "items": items,
                "reasons": self.timing_problems(),
            },
        })
    }

    fn is_valid(&self, _snapshot: &WizardDraft) -> bool {
        match self.kind {
            SourceKind::Upload => !self.tracks.is_empty(),
            kind => {
                self.schedule.is_complete(kind.is_recurring())
                    && self.timing_problems().is_empty()
                    && self.conflicts == ConflictStatus::Clear
            }
        }
    }

    fn reset(&mut self) {
        self.kind = self.fixed.unwrap_or_default();
        self.tracks.clear();
        self.schedule = ScheduleSettings::default();
        self.conflicts = ConflictStatus::Unknown;
        self.agents.clear();
    }

    fn reload(&mut self, _snapshot: &WizardDraft) {
        // a check dispatched during an earlier visit can no longer land
        if self.conflicts == ConflictStatus::Pending {
            self.conflicts = ConflictStatus::Unknown;
        }
        if self.kind.is_scheduled() {
            self.prefill();
        }
    }

    fn fields(&self) -> Vec<FieldDescriptor> {
        let kinds = SourceKind::ALL
            .iter()
            .map(|kind| kind.as_str().to_string())
            .collect();
        let mut fields = Vec::new();
        if self.fixed.is_none() {
            fields.push(FieldDescriptor::new("type", "Source", FieldKind::Choice(kinds)));
        }
        if !self.kind.is_scheduled() {
            fields.push(
                FieldDescriptor::new("tracks", "Media files", FieldKind::List)
                    .with_help("Comma separated file paths"),
            );
            return fields;
        }

        fields.push(FieldDescriptor::new("start_date", "Start date", FieldKind::Date));
        fields.push(FieldDescriptor::new("start_hour", "Start hour", FieldKind::Integer));
        fields.push(FieldDescriptor::new("start_minute", "Start minute", FieldKind::Integer));
        fields.push(FieldDescriptor::new("duration_hour", "Duration hours", FieldKind::Integer));
        fields.push(FieldDescriptor::new(
            "duration_minute",
            "Duration minutes",
            FieldKind::Integer,
        ));
        if self.kind.is_recurring() {
            fields.push(
                FieldDescriptor::new("end_date", "Last recording date", FieldKind::Date),
            );
            fields.push(
                FieldDescriptor::new("weekdays", "Weekdays", FieldKind::List)
                    .with_help("Comma separated, e.g. MO,WE,FR"),
            );
        }
        let device_kind = if self.agents.is_empty() {
            FieldKind::Text
        } else {
            FieldKind::Choice(self.agents.iter().map(|agent| agent.value.clone()).collect())
        };
        fields.push(FieldDescriptor::new("device", "Capture agent", device_kind));
        fields.push(
            FieldDescriptor::new("input_methods", "Inputs", FieldKind::List).with_optional(),
        );
        fields
    }

    fn set_field(&mut self, field: &str, value: Value) -> Result<(), FieldError> {
        match field {
            "type" => {
                let kind = value
                    .as_str()
                    .and_then(SourceKind::parse)
                    .ok_or_else(|| FieldError::new("Unknown source type"))?;
                if self.fixed.is_some_and(|fixed| fixed != kind) {
                    return Err(FieldError::new("The source cannot be changed here"));
                }
                if kind != self.kind {
                    self.kind = kind;
                    self.conflicts = ConflictStatus::Unknown;
                    if kind.is_scheduled() {
                        self.prefill();
                    }
                }
                Ok(())
            }
            "tracks" => {
                self.tracks = tracks(&value)?;
                Ok(())
            }
            _ if !self.kind.is_scheduled() => Err(FieldError::new(format!(
                "`{field}` only applies to scheduled recordings"
            ))),
            _ => {
                self.set_schedule_field(field, &value)?;
                self.conflicts = ConflictStatus::Unknown;
                Ok(())
            }
        }
    }

    fn suggestions(&self) -> BTreeMap<String, String> {
        let mut values = if self.kind.is_scheduled() {
            self.slot.next_slot(self.clock.now()).suggestions()
        } else {
            BTreeMap::new()
        };
        values.insert("type".into(), self.kind.as_str().into());

        let schedule = &self.schedule;
        let current = [
            ("start_date", schedule.start.date.map(|date| date.to_string())),
            ("start_hour", schedule.start.hour.map(|hour| hour.to_string())),
            ("start_minute", schedule.start.minute.map(|minute| minute.to_string())),
            ("duration_hour", schedule.duration.hour.map(|hour| hour.to_string())),
            ("duration_minute", schedule.duration.minute.map(|minute| minute.to_string())),
            ("end_date", schedule.end.date.map(|date| date.to_string())),
            ("end_hour", schedule.end.hour.map(|hour| hour.to_string())),
            ("end_minute", schedule.end.minute.map(|minute| minute.to_string())),
            ("device", schedule.device.clone()),
        ];
        for (key, value) in current {
            if let Some(value) = value {
                values.insert(key.into(), value);
            }
        }
        if schedule.has_weekday() {
            let codes: Vec<&str> = schedule.weekdays().into_iter().map(weekday_code).collect();
            values.insert("weekdays".into(), codes.join(","));
        }
        if !self.tracks.is_empty() {
            let files: Vec<&str> = self.tracks.iter().map(|track| track.file.as_str()).collect();
            values.insert("tracks".into(), files.join(", "));
        }
        values
    }

    fn describe(&self) -> Vec<String> {
        let mut lines = vec![format!("Source: {}", self.kind.as_str())];
        if !self.kind.is_scheduled() {
            for track in &self.tracks {
                lines.push(format!("{}: {}", track.flavor, track.file));
            }
            return lines;
        }
        let schedule = &self.schedule;
        if let Some(start) = schedule.start_at() {
            lines.push(format!("Start: {}", start.format("%Y-%m-%d %H:%M")));
        }
        if let Some(duration) = schedule.duration.formatted() {
            lines.push(format!("Duration: {duration}"));
        }
        if self.kind.is_recurring() {
            if let Some(last) = schedule.end.date {
                lines.push(format!("Until: {last}"));
            }
            let codes: Vec<&str> = schedule.weekdays().into_iter().map(weekday_code).collect();
            lines.push(format!("Weekdays: {}", codes.join(",")));
        }
        lines.push(format!(
            "Capture agent: {}",
            schedule.device.as_deref().unwrap_or("-")
        ));
        lines.push(format!("Conflicts: {}", self.status()));
        if let ConflictStatus::Conflicting(bookings) = &self.conflicts {
            for booking in bookings {
                lines.push(format!(
                    "  {} ({} - {})",
                    booking.title,
                    booking.start.format("%Y-%m-%d %H:%M"),
                    booking.end.format("%H:%M")
                ));
            }
        }
        lines
    }

    fn notices(&self, _snapshot: &WizardDraft) -> Vec<Notice> {
        let mut notices: Vec<Notice> = self
            .timing_problems()
            .into_iter()
            .map(Notice::error)
            .collect();
        match &self.conflicts {
            ConflictStatus::Conflicting(_) => notices.push(Notice::error(CONFLICT_DETECTED)),
            ConflictStatus::Failed(_) => notices.push(Notice::warning(CONFLICT_CHECK_FAILED)),
            _ => {}
        }
        notices
    }

    fn options_request(&self) -> Option<OptionsKind> {
        Some(OptionsKind::CaptureAgents)
    }

    fn apply_options(&mut self, result: Result<Vec<OptionItem>, CollaboratorError>) {
        self.agents = result.unwrap_or_default();
    }

    fn conflict_query(&self) -> Option<ConflictQuery> {
        if !self.kind.is_scheduled() || !self.timing_problems().is_empty() {
            return None;
        }
        ConflictQuery::from_settings(&self.schedule, self.kind.is_recurring())
    }

    fn conflicts_pending(&mut self) {
        self.conflicts = ConflictStatus::Pending;
    }

    fn apply_conflicts(&mut self, result: Result<Vec<Booking>, CollaboratorError>) {
        self.conflicts = match result {
            Ok(bookings) if bookings.is_empty() => ConflictStatus::Clear,
            Ok(bookings) => ConflictStatus::Conflicting(bookings),
            Err(err) => ConflictStatus::Failed(err.to_string()),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::FixedClock;
    use chrono::NaiveDateTime;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(10, 1, 0)
            .unwrap()
    }

    fn step() -> SourceStep {
        SourceStep::new(Arc::new(FixedClock(now())), SlotProperties::default())
    }

    #[test]
    fn upload_needs_a_track() {
        let mut source = step();
        let snapshot = WizardDraft::new();
        assert!(!source.is_valid(&snapshot));
        source.set_field("tracks", json!(["lecture.mp4"])).unwrap();
        assert!(source.is_valid(&snapshot));
        assert_eq!(source.draft()["conflicts"]["status"], "not_required");
        assert_eq!(source.tracks()[0].flavor, DEFAULT_FLAVOR);
        assert!(source.conflict_query().is_none());
        assert!(source.set_field("device", json!("room-1")).is_err());
    }

    #[test]
    fn scheduling_prefills_next_slot() {
        let mut source = step();
        source.set_field("type", json!("schedule_single")).unwrap();
        let schedule = source.schedule();
        assert_eq!(schedule.start.hour, Some(11));
        assert_eq!(schedule.start.minute, Some(0));
        assert_eq!(schedule.duration.minutes(), Some(55));
        assert_eq!(schedule.end.minute, Some(55));
        assert_eq!(source.suggestions()["start_hour"], "11");
    }

    #[test]
    fn schedule_is_valid_only_after_clear_check() {
        let mut source = step();
        let snapshot = WizardDraft::new();
        source.set_field("type", json!("SCHEDULE_SINGLE")).unwrap();
        source.set_field("device", json!("room-1")).unwrap();
        assert!(!source.is_valid(&snapshot));

        let query = source.conflict_query().expect("complete schedule");
        assert_eq!(query.device, "room-1");
        source.conflicts_pending();
        assert_eq!(source.draft()["conflicts"]["status"], "pending");
        source.apply_conflicts(Ok(Vec::new()));
        assert!(source.is_valid(&snapshot));

        source.set_field("duration_hour", json!(2)).unwrap();
        assert!(!source.is_valid(&snapshot), "edits invalidate the last check");
        assert_eq!(source.schedule().end.hour, Some(13));
    }

    #[test]
    fn conflicts_and_failures_raise_notices() {
        let mut source = step();
        source.set_field("type", json!("SCHEDULE_SINGLE")).unwrap();
        source.set_field("device", json!("room-1")).unwrap();
        let booking = Booking {
            title: "Lecture".into(),
            device: "room-1".into(),
            start: now(),
            end: now() + chrono::Duration::hours(2),
        };
        source.apply_conflicts(Ok(vec![booking]));
        let snapshot = WizardDraft::new();
        assert_eq!(source.notices(&snapshot), vec![Notice::error(CONFLICT_DETECTED)]);
        assert_eq!(source.draft()["conflicts"]["items"][0]["title"], "Lecture");

        source.apply_conflicts(Err(CollaboratorError::Unreachable("scheduler".into())));
        assert_eq!(
            source.notices(&snapshot),
            vec![Notice::warning(CONFLICT_CHECK_FAILED)]
        );
        assert!(!source.is_valid(&snapshot));
    }

    #[test]
    fn past_schedules_are_flagged() {
        let mut source = step();
        source.set_field("type", json!("SCHEDULE_SINGLE")).unwrap();
        source.set_field("start_date", json!("2026-10-18")).unwrap();
        source.set_field("device", json!("room-1")).unwrap();
        assert_eq!(source.timing_problems(), vec![CONFLICT_ALREADY_ENDED]);
        assert!(source.conflict_query().is_none());
        assert_eq!(source.draft()["conflicts"]["status"], "conflicting");
    }

    #[test]
    fn recurring_schedule_needs_weekdays() {
        let mut source = step();
        source.set_field("type", json!("SCHEDULE_MULTIPLE")).unwrap();
        source.set_field("device", json!("room-1")).unwrap();
        source.set_field("end_date", json!("2026-11-20")).unwrap();
        source.set_field("weekdays", json!("mo, th")).unwrap();
        let query = source.conflict_query().expect("recurring query");
        assert_eq!(
            query.rrule.as_deref(),
            Some("FREQ=WEEKLY;BYDAY=MO,TH;BYHOUR=11;BYMINUTE=0")
        );
        assert!(source.set_field("weekdays", json!(["funday"])).is_err());
    }

    #[test]
    fn reload_drops_orphaned_pending_check() {
        let mut source = step();
        source.set_field("type", json!("SCHEDULE_SINGLE")).unwrap();
        source.conflicts_pending();
        source.reload(&WizardDraft::new());
        assert_eq!(source.conflicts(), &ConflictStatus::Unknown);
    }

    #[test]
    fn fixed_schedule_keeps_its_kind() {
        let mut source = SourceStep::scheduled(
            Arc::new(FixedClock(now())),
            SlotProperties::default(),
        );
        assert_eq!(source.kind(), SourceKind::ScheduleSingle);
        assert!(source.fields().iter().all(|field| field.key != "type"));
        assert!(source.set_field("type", json!("UPLOAD")).is_err());
        source.set_field("type", json!("SCHEDULE_SINGLE")).unwrap();
        source.reset();
        assert_eq!(source.kind(), SourceKind::ScheduleSingle);
        assert!(source.schedule().start.date.is_none());
        source.reload(&WizardDraft::new());
        assert_eq!(source.schedule().start.hour, Some(11));
    }

    #[test]
    fn known_agents_restrict_device() {
        let mut source = step();
        source.apply_options(Ok(vec![OptionItem::new("Room 1", "room-1")]));
        source.set_field("type", json!("SCHEDULE_SINGLE")).unwrap();
        assert!(source.set_field("device", json!("room-9")).is_err());
        source.set_field("device", json!("room-1")).unwrap();
        source.reset();
        assert_eq!(source.kind(), SourceKind::Upload);
        assert!(source.schedule().device.is_none());
    }
}

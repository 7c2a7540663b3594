use chrono::{Datelike, Duration, NaiveDateTime, Weekday};

use super::ConflictQuery;

pub fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// Accepts the two-letter iCalendar code or an English day name.
pub fn parse_weekday(raw: &str) -> Option<Weekday> {
    let normalized = raw.trim().to_ascii_uppercase();
    let code = normalized.get(..2)?;
    match code {
        "MO" => Some(Weekday::Mon),
        "TU" => Some(Weekday::Tue),
        "WE" => Some(Weekday::Wed),
        "TH" => Some(Weekday::Thu),
        "FR" => Some(Weekday::Fri),
        "SA" => Some(Weekday::Sat),
        "SU" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Weekly RRULE for the given days, listed Monday first.
pub fn weekly_rrule(days: &[Weekday], hour: u32, minute: u32) -> String {
    let mut sorted: Vec<Weekday> = days.to_vec();
    sorted.sort_by_key(|day| day.num_days_from_monday());
    sorted.dedup();
    let by_day: Vec<&str> = sorted.into_iter().map(weekday_code).collect();
    format!(
        "FREQ=WEEKLY;BYDAY={};BYHOUR={};BYMINUTE={}",
        by_day.join(","),
        hour,
        minute
    )
}

/// Expands a query into concrete `(start, end)` occurrences.
///
/// A recurring query yields one occurrence for every matching weekday between
/// its first start date and its end date, inclusive.
pub fn occurrences(query: &ConflictQuery) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    let length = Duration::minutes(query.duration_minutes);
    if !query.is_recurring() {
        return vec![(query.start, query.start + length)];
    }

    let time = query.start.time();
    let last = query.end.date();
    let mut day = query.start.date();
    let mut found = Vec::new();
    while day <= last {
        if query.weekdays.contains(&day.weekday()) {
            let start = day.and_time(time);
            found.push((start, start + length));
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn rrule_orders_and_dedups_days() {
        let rule = weekly_rrule(&[Weekday::Fri, Weekday::Mon, Weekday::Fri], 14, 5);
        assert_eq!(rule, "FREQ=WEEKLY;BYDAY=MO,FR;BYHOUR=14;BYMINUTE=5");
    }

    #[test]
    fn weekday_parsing_accepts_codes_and_names() {
        assert_eq!(parse_weekday("we"), Some(Weekday::Wed));
        assert_eq!(parse_weekday("Thursday"), Some(Weekday::Thu));
        assert_eq!(parse_weekday("x"), None);
    }

    #[test]
    fn recurring_query_expands_matching_days() {
        let start = NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let query = ConflictQuery {
            device: "room-1".into(),
            start,
            end: NaiveDate::from_ymd_opt(2026, 10, 30)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            duration_minutes: 60,
            rrule: Some(weekly_rrule(&[Weekday::Mon, Weekday::Thu], 9, 0)),
            weekdays: vec![Weekday::Mon, Weekday::Thu],
        };

        let found = occurrences(&query);
        let days: Vec<u32> = found.iter().map(|(start, _)| start.day()).collect();
        assert_eq!(days, vec![19, 22, 26, 29]);
        assert_eq!(found[0].1 - found[0].0, Duration::minutes(60));
    }
}

use chrono::{NaiveDate, NaiveTime, Timelike};

const TIME_FORMAT: &str = "%H:%M";
const TIME_WITH_SECONDS_FORMAT: &str = "%H:%M:%S";

/// This is the standard way of converting a date to a string in timebox.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Formats a time of day the way a time picker reports it: `HH:MM`, or `HH:MM:SS` when the
/// seconds aren't zero. Missing values are empty.
pub fn format_time_of_day(time: Option<NaiveTime>) -> String {
    time.map(|v| {
        let format = if v.second() == 0 {
            TIME_FORMAT
        } else {
            TIME_WITH_SECONDS_FORMAT
        };
        v.format(format).to_string()
    })
    .unwrap_or_default()
}

/// Accepts `HH:MM` and `HH:MM:SS`. Anything else is treated as no time at all, mirroring a
/// picker that drops values it can't display.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, TIME_WITH_SECONDS_FORMAT))
        .ok()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::{format_time_of_day, parse_time_of_day};

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(
            parse_time_of_day("09:30"),
            NaiveTime::from_hms_opt(9, 30, 0)
        );
        assert_eq!(
            parse_time_of_day("9:30"),
            NaiveTime::from_hms_opt(9, 30, 0)
        );
        assert_eq!(
            parse_time_of_day("23:59:10"),
            NaiveTime::from_hms_opt(23, 59, 10)
        );
        assert_eq!(parse_time_of_day(""), None);
        assert_eq!(parse_time_of_day("lunch"), None);
        assert_eq!(parse_time_of_day("25:00"), None);
    }

    #[test]
    fn test_format_time_of_day() {
        assert_eq!(format_time_of_day(NaiveTime::from_hms_opt(9, 0, 0)), "09:00");
        assert_eq!(format_time_of_day(None), "");
    }

    #[test]
    fn test_seconds_are_kept() {
        let time = parse_time_of_day("09:00:30");
        assert_eq!(format_time_of_day(time), "09:00:30");
        assert_eq!(parse_time_of_day(&format_time_of_day(time)), time);
    }
}

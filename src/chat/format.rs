//! Display formatting for chat timestamps.

use std::fmt::Display;

use chrono::{DateTime, Days, TimeZone};

/// Label for activity that happened today.
pub const TODAY_LABEL: &str = "Aujourd'hui";
/// Label for activity that happened yesterday.
pub const YESTERDAY_LABEL: &str = "Hier";

/// `HH:MM` in the timestamp's own offset.
#[must_use]
pub fn format_time<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp.format("%H:%M").to_string()
}

/// Day label relative to `now`: today, yesterday, or a `dd/mm/yyyy` date.
#[must_use]
pub fn format_date<Tz>(timestamp: &DateTime<Tz>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let day = timestamp.date_naive();
    let today = now.date_naive();

    if day == today {
        return TODAY_LABEL.to_string();
    }
    if today.checked_sub_days(Days::new(1)) == Some(day) {
        return YESTERDAY_LABEL.to_string();
    }
    timestamp.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).single().unwrap()
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(&at(2024, 1, 15, 9, 5)), "09:05");
        assert_eq!(format_time(&at(2024, 1, 15, 22, 45)), "22:45");
    }

    #[test]
    fn test_format_date_labels() {
        let now = at(2024, 3, 1, 12, 0);
        assert_eq!(format_date(&at(2024, 3, 1, 0, 1), &now), TODAY_LABEL);
        assert_eq!(format_date(&at(2024, 2, 29, 23, 59), &now), YESTERDAY_LABEL);
        assert_eq!(format_date(&at(2024, 2, 28, 10, 0), &now), "28/02/2024");
    }
}

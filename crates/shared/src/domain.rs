use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(PrescriptionId);

/// Format used by date inputs and by the list endpoint's query parameters.
pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// First calendar day of the month containing `today`.
pub fn first_day_of_month(today: NaiveDate) -> NaiveDate {
    today.with_day(1).unwrap_or(today)
}

pub fn parse_input_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), INPUT_DATE_FORMAT).ok()
}

/// Reads the calendar date out of an ISO 8601 date or date-time string.
///
/// The backend serializes `LocalDate` and `LocalDateTime` fields alike, so
/// only the leading `YYYY-MM-DD` part is significant here.
pub fn parse_wire_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10).unwrap_or(raw);
    parse_input_date(head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_day_of_month_keeps_year_and_month() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 29).expect("date");
        assert_eq!(
            first_day_of_month(today),
            NaiveDate::from_ymd_opt(2024, 2, 1).expect("date")
        );
    }

    #[test]
    fn wire_dates_accept_date_and_date_time_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 7);
        assert_eq!(parse_wire_date("2024-03-07"), expected);
        assert_eq!(parse_wire_date("2024-03-07T09:15:00"), expected);
        assert_eq!(parse_wire_date("2024-03-07T09:15:00.000+00:00"), expected);
        assert_eq!(parse_wire_date("07/03/2024"), None);
    }

    #[test]
    fn prescription_id_is_transparent_on_the_wire() {
        let id: PrescriptionId = serde_json::from_str("42").expect("decode");
        assert_eq!(id, PrescriptionId(42));
        assert_eq!(id.to_string(), "42");
    }
}

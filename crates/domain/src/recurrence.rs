//! Recurrence: which calendar days an event may fire on.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Rule selecting the calendar days an event is eligible on.
///
/// Persisted either as a token (`"once"`, `"everyday"`, `"weekdays"`,
/// `"weekends"`) or as a list of weekday names (`["Monday", "Friday"]`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RecurrenceRepr", into = "RecurrenceRepr")]
pub enum Recurrence {
    /// Fires the first time its start time comes around; the execution
    /// marker is what keeps it from firing again.
    #[default]
    Once,
    Everyday,
    Weekdays,
    Weekends,
    Days(Vec<Weekday>),
}

impl Recurrence {
    /// Whether `date` is an eligible day.
    #[must_use]
    pub fn selects(&self, date: NaiveDate) -> bool {
        let weekday = date.weekday();
        match self {
            Self::Once | Self::Everyday => true,
            Self::Weekdays => !is_weekend(weekday),
            Self::Weekends => is_weekend(weekday),
            Self::Days(days) => days.contains(&weekday),
        }
    }
}

fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
}

/// Parse a weekday name, full or abbreviated, in any case.
///
/// # Errors
///
/// Returns [`ParseError::Weekday`] for anything else.
pub fn parse_weekday(name: &str) -> Result<Weekday, ParseError> {
    name.trim()
        .parse::<Weekday>()
        .map_err(|_| ParseError::Weekday(name.to_string()))
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[derive(Deserialize, Serialize)]
#[serde(untagged)]
enum RecurrenceRepr {
    Token(String),
    Days(Vec<String>),
}

impl TryFrom<RecurrenceRepr> for Recurrence {
    type Error = ParseError;

    fn try_from(value: RecurrenceRepr) -> Result<Self, Self::Error> {
        match value {
            RecurrenceRepr::Token(token) => match token.trim().to_ascii_lowercase().as_str() {
                "once" | "" => Ok(Self::Once),
                "everyday" | "daily" => Ok(Self::Everyday),
                "weekdays" => Ok(Self::Weekdays),
                "weekends" => Ok(Self::Weekends),
                _ => Err(ParseError::Recurrence(token)),
            },
            RecurrenceRepr::Days(names) => {
                let mut days = Vec::with_capacity(names.len());
                for name in &names {
                    let day = parse_weekday(name)?;
                    if !days.contains(&day) {
                        days.push(day);
                    }
                }
                Ok(Self::Days(days))
            }
        }
    }
}

impl From<Recurrence> for RecurrenceRepr {
    fn from(value: Recurrence) -> Self {
        match value {
            Recurrence::Once => Self::Token("once".to_string()),
            Recurrence::Everyday => Self::Token("everyday".to_string()),
            Recurrence::Weekdays => Self::Token("weekdays".to_string()),
            Recurrence::Weekends => Self::Token("weekends".to_string()),
            Recurrence::Days(days) => Self::Days(
                days.into_iter()
                    .map(|d| weekday_name(d).to_string())
                    .collect(),
            ),
        }
    }
}

impl std::fmt::Display for Recurrence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Once => f.write_str("once"),
            Self::Everyday => f.write_str("everyday"),
            Self::Weekdays => f.write_str("weekdays"),
            Self::Weekends => f.write_str("weekends"),
            Self::Days(days) => {
                let names: Vec<_> = days.iter().map(|d| weekday_name(*d)).collect();
                write!(f, "{}", names.join(","))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-03-04 is a Monday.
    fn day(offset: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4 + offset).unwrap()
    }

    #[test]
    fn should_select_every_day_for_everyday() {
        assert!((0..7).all(|i| Recurrence::Everyday.selects(day(i))));
    }

    #[test]
    fn should_select_every_day_for_once() {
        assert!((0..7).all(|i| Recurrence::Once.selects(day(i))));
    }

    #[test]
    fn should_select_monday_to_friday_for_weekdays() {
        let selected: Vec<_> = (0..7).map(|i| Recurrence::Weekdays.selects(day(i))).collect();
        assert_eq!(selected, [true, true, true, true, true, false, false]);
    }

    #[test]
    fn should_select_saturday_and_sunday_for_weekends() {
        let selected: Vec<_> = (0..7).map(|i| Recurrence::Weekends.selects(day(i))).collect();
        assert_eq!(selected, [false, false, false, false, false, true, true]);
    }

    #[test]
    fn should_select_only_listed_days() {
        let r = Recurrence::Days(vec![Weekday::Tue, Weekday::Sun]);
        assert!(!r.selects(day(0)));
        assert!(r.selects(day(1)));
        assert!(r.selects(day(6)));
    }

    #[test]
    fn should_parse_tokens_case_insensitively() {
        let r: Recurrence = serde_json::from_str("\"Weekdays\"").unwrap();
        assert_eq!(r, Recurrence::Weekdays);
        let r: Recurrence = serde_json::from_str("\"everyday\"").unwrap();
        assert_eq!(r, Recurrence::Everyday);
    }

    #[test]
    fn should_parse_day_list_with_full_and_short_names() {
        let r: Recurrence = serde_json::from_str(r#"["Monday", "fri", "Monday"]"#).unwrap();
        assert_eq!(r, Recurrence::Days(vec![Weekday::Mon, Weekday::Fri]));
    }

    #[test]
    fn should_reject_unknown_token() {
        assert!(serde_json::from_str::<Recurrence>("\"fortnightly\"").is_err());
    }

    #[test]
    fn should_reject_unknown_day_name() {
        assert!(serde_json::from_str::<Recurrence>(r#"["Funday"]"#).is_err());
    }

    #[test]
    fn should_serialize_day_list_as_full_names() {
        let r = Recurrence::Days(vec![Weekday::Sat]);
        assert_eq!(serde_json::to_string(&r).unwrap(), r#"["Saturday"]"#);
        assert_eq!(
            serde_json::to_string(&Recurrence::Weekends).unwrap(),
            "\"weekends\""
        );
    }
}

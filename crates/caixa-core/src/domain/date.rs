use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, Time};

use crate::ValidationError;

/// Source of "today" for status derivation and month KPIs.
pub trait Clock: Send + Sync {
    fn today(&self) -> Date;
}

/// Process-local calendar date, falling back to UTC when the local offset
/// cannot be determined.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        OffsetDateTime::now_local()
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
            .date()
    }
}

/// Clock pinned to a single date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}

/// Strict `YYYY-MM-DD` parsing for user input.
pub fn parse_iso_date(raw: &str) -> Result<Date, ValidationError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| {
        ValidationError::InvalidDate {
            value: raw.to_owned(),
        }
    })
}

pub fn format_iso_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

/// `DD/MM/YYYY` display form.
pub fn format_br_date(date: Date) -> String {
    date.format(format_description!("[day]/[month]/[year]"))
        .unwrap_or_else(|_| date.to_string())
}

fn format_clock_time(value: Time) -> String {
    value
        .format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_else(|_| value.to_string())
}

/// Lenient parsing of API date/time strings.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` (optionally with fractional
/// seconds and an offset suffix, which is ignored), `YYYY-MM-DD HH:MM:SS`
/// and `DD/MM/YYYY`. Anything else yields `None`.
pub fn parse_api_datetime(raw: &str) -> Option<(Date, Option<Time>)> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = Date::parse(raw, format_description!("[day]/[month]/[year]")) {
        return Some((date, None));
    }

    let (date_part, time_part) = match raw.find(|c: char| c == 'T' || c == ' ') {
        Some(index) => (&raw[..index], Some(&raw[index + 1..])),
        None => (raw, None),
    };

    let date = Date::parse(date_part, format_description!("[year]-[month]-[day]")).ok()?;
    Some((date, time_part.and_then(parse_clock_time)))
}

pub fn parse_api_date(raw: &str) -> Option<Date> {
    parse_api_datetime(raw).map(|(date, _)| date)
}

fn parse_clock_time(raw: &str) -> Option<Time> {
    if let Some(head) = raw.get(..8) {
        if let Ok(parsed) = Time::parse(head, format_description!("[hour]:[minute]:[second]")) {
            return Some(parsed);
        }
    }
    raw.get(..5)
        .and_then(|head| Time::parse(head, format_description!("[hour]:[minute]")).ok())
}

/// Whether two dates fall in the same calendar month.
pub fn same_month(left: Date, right: Date) -> bool {
    left.year() == right.year() && left.month() == right.month()
}

pub fn month_label(date: Date) -> String {
    let name = match date.month() {
        Month::January => "jan",
        Month::February => "fev",
        Month::March => "mar",
        Month::April => "abr",
        Month::May => "mai",
        Month::June => "jun",
        Month::July => "jul",
        Month::August => "ago",
        Month::September => "set",
        Month::October => "out",
        Month::November => "nov",
        Month::December => "dez",
    };
    format!("{name}/{}", date.year())
}

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(with = "serde_date")]
    start: Date,
    #[serde(with = "serde_date")]
    end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedDateRange {
                start: format_iso_date(start),
                end: format_iso_date(end),
            });
        }
        Ok(Self { start, end })
    }

    /// Builds a range from optional bounds; `None` when both are open.
    pub fn from_bounds(
        start: Option<Date>,
        end: Option<Date>,
    ) -> Result<Option<Self>, ValidationError> {
        match (start, end) {
            (None, None) => Ok(None),
            (start, end) => Self::new(start.unwrap_or(Date::MIN), end.unwrap_or(Date::MAX)).map(Some),
        }
    }

    /// Parses optional `YYYY-MM-DD` bounds.
    pub fn parse_bounds(
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Option<Self>, ValidationError> {
        let start = start.filter(|s| !s.trim().is_empty()).map(parse_iso_date).transpose()?;
        let end = end.filter(|s| !s.trim().is_empty()).map(parse_iso_date).transpose()?;
        Self::from_bounds(start, end)
    }

    pub const fn start(&self) -> Date {
        self.start
    }

    pub const fn end(&self) -> Date {
        self.end
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Records without a date never match a bounded range.
    pub fn contains_opt(&self, date: Option<Date>) -> bool {
        date.is_some_and(|date| self.contains(date))
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}..={}",
            format_iso_date(self.start),
            format_iso_date(self.end)
        )
    }
}

/// `YYYY-MM-DD` serde representation for [`Date`].
pub mod serde_date {
    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(value: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_iso_date(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_iso_date(&raw).map_err(D::Error::custom)
    }
}

/// `YYYY-MM-DD` or `null` serde representation for `Option<Date>`.
pub mod serde_date_opt {
    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(
        value: &Option<Date>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_some(&super::format_iso_date(*date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Date>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|raw| super::parse_iso_date(&raw).map_err(D::Error::custom))
            .transpose()
    }
}

/// `HH:MM:SS` or `null` serde representation for `Option<Time>`.
pub mod serde_time_opt {
    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::macros::format_description;
    use time::Time;

    pub fn serialize<S: Serializer>(
        value: &Option<Time>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => serializer.serialize_some(&super::format_clock_time(*time)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Time>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|raw| {
            Time::parse(&raw, format_description!("[hour]:[minute]:[second]"))
                .map_err(D::Error::custom)
        })
        .transpose()
    }
}

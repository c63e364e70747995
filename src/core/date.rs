use chrono::{Local, NaiveDate, NaiveTime};

use super::task::Task;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Today's date on the local clock.
pub fn today_date() -> NaiveDate {
    Local::now().date_naive()
}

/// Today's date as a zero-padded `YYYY-MM-DD` string.
pub fn today() -> String {
    today_date().format(DATE_FORMAT).to_string()
}

/// Whether the task is past due as of the local clock's today.
pub fn is_overdue(task: &Task) -> bool {
    task.is_overdue(today_date())
}

pub fn parse_date(input: &str) -> crate::Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| crate::Error::InvalidDate(input.to_string()))
}

/// Parse an optional date field where an empty string means "absent".
pub fn parse_optional_date(input: &str) -> crate::Result<Option<NaiveDate>> {
    if input.trim().is_empty() {
        Ok(None)
    } else {
        parse_date(input).map(Some)
    }
}

pub fn parse_time(input: &str) -> Option<NaiveTime> {
    let input = input.trim();
    NaiveTime::parse_from_str(input, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
        .ok()
}

/// Day-first rendering used in task and reminder listings.
pub fn format_display(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Serde adapter for `Option<NaiveDate>` stored as `"YYYY-MM-DD"`, where `""`
/// means absent. Unparsable values are read as absent.
pub mod optional_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::DATE_FORMAT;

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.format(DATE_FORMAT).to_string()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
            return Ok(None);
        };
        match NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT) {
            Ok(date) => Ok(Some(date)),
            Err(_) => {
                log::warn!("Treating unparsable date '{}' as absent", raw);
                Ok(None)
            }
        }
    }
}

/// Serde adapter for `Option<NaiveTime>` stored as `"HH:MM"`, where `""` means absent.
pub mod optional_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIME_FORMAT;

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => s.serialize_str(&t.format(TIME_FORMAT).to_string()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
            return Ok(None);
        };
        let parsed = super::parse_time(&raw);
        if parsed.is_none() {
            log::warn!("Treating unparsable time '{}' as absent", raw);
        }
        Ok(parsed)
    }
}

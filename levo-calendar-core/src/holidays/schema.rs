//! Wire schema of the Calendarific v2 API.
//!
//! Payloads are decoded into these raw types and then checked field by
//! field, so a response missing something the calendar relies on becomes a
//! typed `MalformedResponse` instead of a half-filled holiday.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{CalResult, CalendarError};

/// A public holiday as the calendar uses it.
#[derive(Debug, Clone, PartialEq)]
pub struct Holiday {
    pub name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub kinds: Vec<String>,
}

/// A country the holiday API has data for.
#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    pub name: String,
    pub iso_code: String,
}

#[derive(Deserialize)]
struct Envelope {
    meta: Option<Meta>,
    response: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct Meta {
    code: Option<u16>,
    error_detail: Option<String>,
    error_type: Option<String>,
}

#[derive(Deserialize)]
struct RawHoliday {
    name: Option<String>,
    description: Option<String>,
    date: Option<RawDate>,
    #[serde(rename = "type", default)]
    kinds: Vec<String>,
}

#[derive(Deserialize)]
struct RawDate {
    iso: Option<String>,
}

#[derive(Deserialize)]
struct RawCountry {
    country_name: Option<String>,
    #[serde(rename = "iso-3166")]
    iso_code: Option<String>,
}

fn malformed(payload: &'static str, reason: impl Into<String>) -> CalendarError {
    CalendarError::MalformedResponse {
        payload,
        reason: reason.into(),
    }
}

/// Unwrap `{meta, response: {<key>: [...]}}`.
///
/// An error code in `meta` is an API failure. The API answers an empty
/// `response: []` when it has no data for the query; that is an empty list.
fn extract_list(body: &str, payload: &'static str, key: &str) -> CalResult<Vec<serde_json::Value>> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| malformed(payload, e.to_string()))?;

    if let Some(meta) = envelope.meta {
        if let Some(code) = meta.code.filter(|c| *c != 200) {
            let message = meta
                .error_detail
                .or(meta.error_type)
                .unwrap_or_else(|| format!("holiday API returned code {}", code));
            return Err(CalendarError::Api { status: code, message });
        }
    }

    match envelope.response {
        Some(serde_json::Value::Object(mut map)) => match map.remove(key) {
            Some(serde_json::Value::Array(items)) => Ok(items),
            Some(_) => Err(malformed(payload, format!("`response.{}` is not a list", key))),
            None => Err(malformed(payload, format!("missing `response.{}`", key))),
        },
        Some(serde_json::Value::Array(items)) if items.is_empty() => Ok(Vec::new()),
        Some(_) => Err(malformed(payload, "`response` is not an object")),
        None => Err(malformed(payload, "missing `response`")),
    }
}

/// Only the date part of `date.iso` is used; the API sends full timestamps
/// for holidays that start at a particular time.
fn parse_iso_date(iso: &str) -> Option<NaiveDate> {
    let date_part = iso.get(..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

pub fn parse_holidays(body: &str) -> CalResult<Vec<Holiday>> {
    const PAYLOAD: &str = "holidays";

    extract_list(body, PAYLOAD, "holidays")?
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            let raw: RawHoliday = serde_json::from_value(value)
                .map_err(|e| malformed(PAYLOAD, format!("entry {}: {}", i, e)))?;

            let name = raw
                .name
                .filter(|n| !n.trim().is_empty())
                .ok_or_else(|| malformed(PAYLOAD, format!("entry {}: missing `name`", i)))?;
            let iso = raw
                .date
                .and_then(|d| d.iso)
                .ok_or_else(|| malformed(PAYLOAD, format!("entry {}: missing `date.iso`", i)))?;
            let date = parse_iso_date(&iso)
                .ok_or_else(|| malformed(PAYLOAD, format!("entry {}: bad date '{}'", i, iso)))?;

            Ok(Holiday {
                name,
                description: raw.description.filter(|d| !d.is_empty()),
                date,
                kinds: raw.kinds,
            })
        })
        .collect()
}

pub fn parse_countries(body: &str) -> CalResult<Vec<Country>> {
    const PAYLOAD: &str = "countries";

    extract_list(body, PAYLOAD, "countries")?
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            let raw: RawCountry = serde_json::from_value(value)
                .map_err(|e| malformed(PAYLOAD, format!("entry {}: {}", i, e)))?;

            match (raw.country_name, raw.iso_code) {
                (Some(name), Some(iso_code)) => Ok(Country { name, iso_code }),
                _ => Err(malformed(
                    PAYLOAD,
                    format!("entry {}: missing `country_name` or `iso-3166`", i),
                )),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOLIDAYS: &str = r#"{
        "meta": {"code": 200},
        "response": {"holidays": [
            {"name": "New Year's Day", "description": "First day of the year",
             "date": {"iso": "2024-01-01", "datetime": {"year": 2024, "month": 1, "day": 1}},
             "type": ["National holiday"]},
            {"name": "March Equinox", "description": "",
             "date": {"iso": "2024-03-20T03:06:24+00:00"},
             "type": ["Season"]}
        ]}
    }"#;

    #[test]
    fn parses_holidays() {
        let holidays = parse_holidays(HOLIDAYS).unwrap();
        assert_eq!(holidays.len(), 2);
        assert_eq!(holidays[0].name, "New Year's Day");
        assert_eq!(holidays[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(holidays[0].kinds, vec!["National holiday".to_string()]);
        assert_eq!(holidays[1].date, NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());
        assert_eq!(holidays[1].description, None);
    }

    #[test]
    fn missing_date_is_malformed() {
        let body = r#"{"response": {"holidays": [{"name": "Mystery Day"}]}}"#;
        let err = parse_holidays(body).unwrap_err();
        assert!(matches!(
            err,
            CalendarError::MalformedResponse { payload: "holidays", ref reason } if reason.contains("date.iso")
        ));
    }

    #[test]
    fn bad_date_is_malformed() {
        let body = r#"{"response": {"holidays": [{"name": "X", "date": {"iso": "someday"}}]}}"#;
        assert!(matches!(parse_holidays(body), Err(CalendarError::MalformedResponse { .. })));
    }

    #[test]
    fn missing_response_is_malformed() {
        assert!(matches!(
            parse_holidays(r#"{"meta": {"code": 200}}"#),
            Err(CalendarError::MalformedResponse { .. })
        ));
        assert!(matches!(
            parse_holidays(r#"{"response": {"countries": []}}"#),
            Err(CalendarError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn empty_response_array_is_empty_list() {
        assert!(parse_holidays(r#"{"meta": {"code": 200}, "response": []}"#).unwrap().is_empty());
    }

    #[test]
    fn meta_error_becomes_api_error() {
        let body = r#"{"meta": {"code": 401, "error_type": "auth failed", "error_detail": "Missing or invalid api credentials."}, "response": []}"#;
        let err = parse_holidays(body).unwrap_err();
        assert!(matches!(
            err,
            CalendarError::Api { status: 401, ref message } if message == "Missing or invalid api credentials."
        ));
    }

    #[test]
    fn parses_countries() {
        let body = r#"{"response": {"countries": [
            {"country_name": "Finland", "iso-3166": "FI", "total_holidays": 30},
            {"country_name": "United States", "iso-3166": "US"}
        ]}}"#;
        let countries = parse_countries(body).unwrap();
        assert_eq!(
            countries,
            vec![
                Country { name: "Finland".into(), iso_code: "FI".into() },
                Country { name: "United States".into(), iso_code: "US".into() },
            ]
        );
    }

    #[test]
    fn country_without_code_is_malformed() {
        let body = r#"{"response": {"countries": [{"country_name": "Atlantis"}]}}"#;
        assert!(matches!(parse_countries(body), Err(CalendarError::MalformedResponse { payload: "countries", .. })));
    }

    #[test]
    fn not_json_is_malformed() {
        assert!(matches!(parse_countries("<html>"), Err(CalendarError::MalformedResponse { .. })));
    }
}

//! Public holiday overlay.
//!
//! Holidays come from Calendarific and are shown as read-only, all-day
//! entries next to the user's own events.

mod schema;

pub use schema::{Country, Holiday, parse_countries, parse_holidays};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::CalResult;
use crate::model::CalendarEvent;

#[async_trait]
pub trait HolidaySource: Send + Sync {
    async fn list_holidays(&self, year: i32, country: &str) -> CalResult<Vec<Holiday>>;
    async fn list_countries(&self) -> CalResult<Vec<Country>>;
}

/// Calendarific v2 client.
#[derive(Clone)]
pub struct HolidayClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HolidayClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Fetch a raw body. Non-2xx answers still carry the `meta` envelope,
    /// so the schema layer decides what they mean.
    async fn get(&self, path: &str, query: &[(&str, String)]) -> CalResult<String> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), path, "Holiday API returned an error status");
        }
        Ok(body)
    }
}

#[async_trait]
impl HolidaySource for HolidayClient {
    async fn list_holidays(&self, year: i32, country: &str) -> CalResult<Vec<Holiday>> {
        tracing::debug!(year, country, "GET /holidays");
        let body = self
            .get(
                "/holidays",
                &[("country", country.to_string()), ("year", year.to_string())],
            )
            .await?;
        parse_holidays(&body)
    }

    async fn list_countries(&self) -> CalResult<Vec<Country>> {
        tracing::debug!("GET /countries");
        let body = self.get("/countries", &[]).await?;
        parse_countries(&body)
    }
}

/// Midnight of `date` in `zone`, skipping forward if midnight does not exist.
fn start_of_day(date: NaiveDate, zone: Tz) -> chrono::DateTime<Utc> {
    (0..24)
        .filter_map(|hour| date.and_hms_opt(hour, 0, 0))
        .find_map(|naive| zone.from_local_datetime(&naive).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN).and_utc())
}

/// A holiday as an all-day calendar entry in `zone`.
pub fn holiday_to_event(holiday: &Holiday, zone: Tz) -> CalendarEvent {
    let next_day = holiday.date + Duration::days(1);
    CalendarEvent {
        id: None,
        title: holiday.name.clone(),
        start: start_of_day(holiday.date, zone),
        end: start_of_day(next_day, zone),
        description: holiday.description.clone(),
        is_holiday: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_year() -> Holiday {
        Holiday {
            name: "New Year's Day".into(),
            description: Some("First day of the year".into()),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            kinds: vec!["National holiday".into()],
        }
    }

    #[test]
    fn holiday_becomes_all_day_entry() {
        let event = holiday_to_event(&new_year(), Tz::UTC);

        assert!(event.is_holiday);
        assert!(!event.is_editable());
        assert_eq!(event.id, None);
        assert_eq!(event.title, "New Year's Day");
        assert_eq!(event.start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(event.end, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn holiday_starts_at_local_midnight() {
        let event = holiday_to_event(&new_year(), chrono_tz::Europe::Helsinki);
        // Helsinki is UTC+2 in winter
        assert_eq!(event.start, Utc.with_ymd_and_hms(2023, 12, 31, 22, 0, 0).unwrap());
    }

    #[test]
    fn missing_midnight_moves_to_first_valid_hour() {
        // Santiago skipped 00:00 on 2024-09-08 for DST
        let date = NaiveDate::from_ymd_opt(2024, 9, 8).unwrap();
        let start = start_of_day(date, chrono_tz::America::Santiago);
        let local = start.with_timezone(&chrono_tz::America::Santiago);
        assert_eq!(local.date_naive(), date);
    }
}

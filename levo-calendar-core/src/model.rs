//! Users, events and the calendar view model.
//!
//! `User` and `UserEvent` mirror the backend's JSON. `CalendarEvent` is what
//! the calendar grid and the edit form work with; it is rebuilt from the
//! backend data on every fetch and never patched in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A backend user. Created by the backend on first login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub events: Vec<UserEvent>,
}

impl User {
    /// The part of the email before `@`, used in the calendar greeting.
    pub fn display_name(&self) -> &str {
        self.email.split('@').next().unwrap_or(&self.email)
    }
}

/// A persisted event owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEvent {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    #[serde(with = "wire_time")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "wire_time")]
    pub end_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of `POST /events`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateUserEvent {
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub description: Option<String>,
}

/// Full field set sent by `PUT /events/{id}`. The id travels in the path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateUserEvent {
    #[serde(skip_serializing)]
    pub id: i64,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub description: Option<String>,
}

/// An entry on the calendar grid.
///
/// `id` is absent for an event that is still being created and for
/// holiday entries, which are synthesised and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: Option<i64>,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub description: Option<String>,
    #[serde(default)]
    pub is_holiday: bool,
}

impl CalendarEvent {
    /// Blank draft used by the edit form in create mode.
    pub fn blank(now: DateTime<Utc>) -> Self {
        CalendarEvent {
            id: None,
            title: String::new(),
            start: now,
            end: now,
            description: Some(String::new()),
            is_holiday: false,
        }
    }

    pub fn is_editable(&self) -> bool {
        !self.is_holiday
    }
}

impl From<&UserEvent> for CalendarEvent {
    fn from(event: &UserEvent) -> Self {
        CalendarEvent {
            id: Some(event.id),
            title: event.title.clone(),
            start: event.start_time,
            end: event.end_time,
            description: Some(event.description.clone().unwrap_or_default()),
            is_holiday: false,
        }
    }
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Map backend events to view models, keeping order and count.
pub fn to_calendar_events(events: &[UserEvent]) -> Vec<CalendarEvent> {
    events.iter().map(CalendarEvent::from).collect()
}

/// Backend timestamps arrive either as RFC 3339 or as naive
/// `YYYY-MM-DDTHH:MM:SS[.f]`; naive values are taken as UTC.
mod wire_time {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw)))
    }

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
            .ok()
            .map(|naive| naive.and_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(id: i64, title: &str, hour: u32, description: Option<&str>) -> UserEvent {
        UserEvent {
            id,
            user_id: 7,
            title: title.to_string(),
            start_time: Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 1, 1, hour + 1, 0, 0).unwrap(),
            description: description.map(String::from),
        }
    }

    #[test]
    fn mapping_preserves_order_ids_and_fields() {
        let events = vec![
            event(3, "Standup", 9, Some("daily")),
            event(1, "Lunch", 12, None),
            event(2, "Review", 15, Some("")),
        ];

        let mapped = to_calendar_events(&events);

        assert_eq!(mapped.len(), events.len());
        for (src, view) in events.iter().zip(&mapped) {
            assert_eq!(view.id, Some(src.id));
            assert_eq!(view.title, src.title);
            assert_eq!(view.start, src.start_time);
            assert_eq!(view.end, src.end_time);
            assert!(!view.is_holiday);
        }
        assert_eq!(mapped[0].description.as_deref(), Some("daily"));
        // Missing descriptions become empty, matching what the form edits
        assert_eq!(mapped[1].description.as_deref(), Some(""));
    }

    #[test]
    fn mapping_empty_list() {
        assert!(to_calendar_events(&[]).is_empty());
    }

    #[test]
    fn user_without_events_field_deserializes() {
        let user: User = serde_json::from_str(r#"{"id": 4, "email": "ada@example.com"}"#).unwrap();
        assert_eq!(user.id, 4);
        assert!(user.events.is_empty());
        assert_eq!(user.display_name(), "ada");
    }

    #[test]
    fn user_event_accepts_naive_and_offset_timestamps() {
        let json = r#"{
            "id": 1, "user_id": 2, "title": "Meeting",
            "start_time": "2024-01-01T10:00:00",
            "end_time": "2024-01-01T12:00:00+01:00"
        }"#;
        let event: UserEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.start_time, Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
        assert_eq!(event.end_time, Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap());
        assert_eq!(event.description, None);
    }

    #[test]
    fn user_event_rejects_garbage_timestamp() {
        let json = r#"{"id": 1, "user_id": 2, "title": "x", "start_time": "soon", "end_time": "later"}"#;
        assert!(serde_json::from_str::<UserEvent>(json).is_err());
    }

    #[test]
    fn update_body_omits_id() {
        let update = UpdateUserEvent {
            id: 12,
            title: "Moved".into(),
            start_time: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap(),
            description: None,
        };
        let value = serde_json::to_value(&update).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["title"], "Moved");
    }

    #[test]
    fn blank_draft_has_no_identity() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        let draft = CalendarEvent::blank(now);
        assert_eq!(draft.id, None);
        assert!(draft.title.is_empty());
        assert_eq!(draft.start, now);
        assert_eq!(draft.end, now);
    }
}

//! The event edit form.
//!
//! One form instance edits one draft at a time. It is in create mode when the
//! draft has no backing id and in edit mode when it does. Successful saves
//! and deletes close the form and publish a `CalendarSignal`; whoever shows
//! events subscribes and refetches.

use chrono::{DateTime, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use tokio::sync::broadcast;

use crate::api::Backend;
use crate::error::{CalResult, CalendarError};
use crate::model::{CalendarEvent, CreateUserEvent, UpdateUserEvent, UserEvent};
use crate::timezone::{change_timezone_between, local_zone};

pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this event?";

/// Format of the start/end inputs (`datetime-local` style).
pub const DATETIME_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Blocking dialogs shown by the form.
pub trait Prompter: Send {
    fn alert(&mut self, message: &str);
    fn confirm(&mut self, message: &str) -> bool;
}

/// Published by the form so that event lists can react to changes.
/// Saved events are `None` when the server's reply carried no readable event.
#[derive(Debug, Clone, PartialEq)]
pub enum CalendarSignal {
    Closed,
    EventCreated(Option<UserEvent>),
    EventUpdated(Option<UserEvent>),
    EventDeleted(i64),
}

impl CalendarSignal {
    /// Whether the persisted events changed.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, CalendarSignal::Closed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Closed,
    Create,
    Edit(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Title(String),
    Start(DateTime<Utc>),
    End(DateTime<Utc>),
    Description(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    /// The server accepted the save; the event is what it echoed back, if anything.
    Saved(Option<UserEvent>),
    Deleted(i64),
    /// The alert text; the form is still open with the draft intact.
    Failed(String),
    /// Nothing was sent (form closed, delete declined, or create mode delete).
    Cancelled,
}

pub struct EventForm {
    show: bool,
    draft: CalendarEvent,
    local_zone: Tz,
    display_zone: Option<Tz>,
    signals: broadcast::Sender<CalendarSignal>,
}

fn now_to_minute() -> DateTime<Utc> {
    let now = Utc::now();
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

impl EventForm {
    pub fn new(signals: broadcast::Sender<CalendarSignal>) -> Self {
        EventForm {
            show: false,
            draft: CalendarEvent::blank(now_to_minute()),
            local_zone: local_zone(),
            display_zone: None,
            signals,
        }
    }

    /// Zone the typed wall-clock times are read in.
    pub fn with_local_zone(mut self, zone: Tz) -> Self {
        self.local_zone = zone;
        self
    }

    /// Zone that new events are created in. `None` keeps the local zone.
    pub fn with_display_zone(mut self, zone: Option<Tz>) -> Self {
        self.display_zone = zone;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CalendarSignal> {
        self.signals.subscribe()
    }

    pub fn is_open(&self) -> bool {
        self.show
    }

    pub fn mode(&self) -> FormMode {
        match (self.show, self.draft.id) {
            (false, _) => FormMode::Closed,
            (true, None) => FormMode::Create,
            (true, Some(id)) => FormMode::Edit(id),
        }
    }

    pub fn draft(&self) -> &CalendarEvent {
        &self.draft
    }

    pub fn local_zone(&self) -> Tz {
        self.local_zone
    }

    pub fn title(&self) -> &'static str {
        match self.mode() {
            FormMode::Edit(_) => "Update Event",
            _ => "Create Event",
        }
    }

    /// Open on an existing entry (edit mode) or on a blank draft (create mode).
    pub fn open(&mut self, existing: Option<&CalendarEvent>) -> CalResult<()> {
        match existing {
            Some(event) if !event.is_editable() => return Err(CalendarError::NotEditable),
            Some(event) => self.draft = event.clone(),
            None => self.draft = CalendarEvent::blank(now_to_minute()),
        }
        self.show = true;
        Ok(())
    }

    pub fn change(&mut self, change: FieldChange) {
        match change {
            FieldChange::Title(title) => self.draft.title = title,
            FieldChange::Start(start) => self.draft.start = start,
            FieldChange::End(end) => self.draft.end = end,
            FieldChange::Description(description) => self.draft.description = Some(description),
        }
    }

    /// Apply a change given as input name and raw text.
    pub fn change_input(&mut self, name: &str, value: &str) -> CalResult<()> {
        let change = match name {
            "title" => FieldChange::Title(value.to_string()),
            "description" => FieldChange::Description(value.to_string()),
            "start" => FieldChange::Start(parse_datetime_input(value, self.local_zone)?),
            "end" => FieldChange::End(parse_datetime_input(value, self.local_zone)?),
            other => {
                return Err(CalendarError::InvalidInput(format!("unknown field '{}'", other)));
            }
        };
        self.change(change);
        Ok(())
    }

    /// Cancel or finish: reset the draft and tell subscribers.
    pub fn close(&mut self) {
        self.show = false;
        self.draft = CalendarEvent::blank(now_to_minute());
        self.emit(CalendarSignal::Closed);
    }

    fn emit(&self, signal: CalendarSignal) {
        // No subscribers is fine: nobody is showing events right now
        let _ = self.signals.send(signal);
    }

    fn fail(&self, prompter: &mut dyn Prompter, message: String) -> FormOutcome {
        prompter.alert(&message);
        FormOutcome::Failed(message)
    }

    fn missing_required_field(&self) -> Option<&'static str> {
        if self.draft.title.trim().is_empty() {
            return Some("title");
        }
        None
    }

    /// Save the draft: update in edit mode, create otherwise.
    pub async fn submit(&mut self, backend: &dyn Backend, prompter: &mut dyn Prompter) -> FormOutcome {
        if !self.show {
            return FormOutcome::Cancelled;
        }
        if let Some(field) = self.missing_required_field() {
            return self.fail(prompter, format!("Please fill in the {} field.", field));
        }

        let result = match self.draft.id {
            Some(id) => self.update(backend, id).await,
            None => self.create(backend).await,
        };

        match result {
            Ok((event, signal)) => {
                self.close();
                self.emit(signal);
                FormOutcome::Saved(event)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Saving event failed");
                self.fail(prompter, err.alert_message())
            }
        }
    }

    async fn update(&self, backend: &dyn Backend, id: i64) -> CalResult<(Option<UserEvent>, CalendarSignal)> {
        let update = UpdateUserEvent {
            id,
            title: self.draft.title.clone(),
            start_time: self.draft.start,
            end_time: self.draft.end,
            description: self.draft.description.clone(),
        };
        let event = backend.update_event(&update).await?;
        tracing::info!(id, "Updated event");
        Ok((event.clone(), CalendarSignal::EventUpdated(event)))
    }

    async fn create(&self, backend: &dyn Backend) -> CalResult<(Option<UserEvent>, CalendarSignal)> {
        let zone = self.display_zone.unwrap_or(self.local_zone);
        let create = CreateUserEvent {
            title: self.draft.title.clone(),
            start_time: change_timezone_between(self.draft.start, self.local_zone, zone),
            end_time: change_timezone_between(self.draft.end, self.local_zone, zone),
            description: self.draft.description.clone(),
        };
        let event = backend.create_event(&create).await?;
        tracing::info!(id = ?event.as_ref().map(|e| e.id), "Created event");
        Ok((event.clone(), CalendarSignal::EventCreated(event)))
    }

    /// Delete the backing event after confirmation. Edit mode only.
    pub async fn delete(&mut self, backend: &dyn Backend, prompter: &mut dyn Prompter) -> FormOutcome {
        let FormMode::Edit(id) = self.mode() else {
            return FormOutcome::Cancelled;
        };
        if !prompter.confirm(DELETE_CONFIRMATION) {
            return FormOutcome::Cancelled;
        }

        match backend.delete_event(id).await {
            Ok(()) => {
                tracing::info!(id, "Deleted event");
                self.close();
                self.emit(CalendarSignal::EventDeleted(id));
                FormOutcome::Deleted(id)
            }
            Err(err) => {
                tracing::warn!(error = %err, id, "Deleting event failed");
                self.fail(prompter, err.alert_message())
            }
        }
    }
}

/// Read `YYYY-MM-DDTHH:MM` as a wall-clock time in `zone`.
pub fn parse_datetime_input(value: &str, zone: Tz) -> CalResult<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(value.trim(), DATETIME_INPUT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M"))
        .map_err(|_| {
            CalendarError::InvalidInput(format!("'{}' is not a date and time (YYYY-MM-DDTHH:MM)", value))
        })?;

    zone.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| CalendarError::InvalidInput(format!("'{}' does not exist in {}", value, zone)))
}

/// Show an instant the way the start/end inputs expect it.
pub fn format_datetime_input(value: DateTime<Utc>, zone: Tz) -> String {
    value.with_timezone(&zone).format(DATETIME_INPUT_FORMAT).to_string()
}

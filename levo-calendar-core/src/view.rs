//! The calendar page.
//!
//! Owns the fetched snapshots (personal events, holidays, countries) and the
//! edit form. Fetch failures are logged and leave the previous snapshot in
//! place; mutations made through the form come back as signals and trigger a
//! refetch in `sync`.

use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

use crate::api::Backend;
use crate::constants::DEFAULT_COUNTRY;
use crate::error::{CalResult, CalendarError};
use crate::form::{CalendarSignal, EventForm, FieldChange, FormOutcome, Prompter};
use crate::holidays::{Country, HolidaySource, holiday_to_event};
use crate::model::{CalendarEvent, User, to_calendar_events};
use crate::route::Route;
use crate::session::Session;
use crate::timezone::local_zone;

const SIGNAL_CAPACITY: usize = 32;

pub struct ViewOptions {
    pub country: String,
    /// Zone the grid is laid out in and typed times are read in.
    pub zone: Tz,
    /// Zone new events are created in.
    pub display_zone: Option<Tz>,
    pub visible_date: NaiveDate,
}

impl Default for ViewOptions {
    fn default() -> Self {
        let zone = local_zone();
        ViewOptions {
            country: DEFAULT_COUNTRY.to_string(),
            zone,
            display_zone: None,
            visible_date: Utc::now().with_timezone(&zone).date_naive(),
        }
    }
}

pub struct CalendarView {
    session: Session,
    backend: Arc<dyn Backend>,
    holidays: Option<Arc<dyn HolidaySource>>,
    zone: Tz,

    user: Option<User>,
    events: Vec<CalendarEvent>,
    holiday_events: Vec<CalendarEvent>,
    countries: Option<Vec<Country>>,

    visible_date: NaiveDate,
    country: String,

    form: EventForm,
    signals: broadcast::Receiver<CalendarSignal>,
}

impl CalendarView {
    pub fn new(
        session: Session,
        backend: Arc<dyn Backend>,
        holidays: Option<Arc<dyn HolidaySource>>,
        options: ViewOptions,
    ) -> Self {
        let (tx, signals) = broadcast::channel(SIGNAL_CAPACITY);
        let form = EventForm::new(tx)
            .with_local_zone(options.zone)
            .with_display_zone(options.display_zone);

        CalendarView {
            session,
            backend,
            holidays,
            zone: options.zone,
            user: None,
            events: Vec::new(),
            holiday_events: Vec::new(),
            countries: None,
            visible_date: options.visible_date,
            country: options.country,
            form,
            signals,
        }
    }

    /// Resolve the active user and load everything the page shows.
    /// Without a stored user the page redirects to login.
    pub async fn mount(&mut self) -> CalResult<Route> {
        let Some(user) = self.session.get_local_user()? else {
            tracing::debug!("No local user; redirecting to login");
            return Ok(Route::Login);
        };
        self.user = Some(user);

        self.refetch_events().await;
        if self.holidays.is_some() {
            self.fetch_countries().await;
            self.refetch_holidays().await;
        }
        Ok(Route::Calendar)
    }

    /// Rebuild the personal events from the backend. Returns whether the
    /// snapshot was replaced.
    pub async fn refetch_events(&mut self) -> bool {
        let Some(user_id) = self.user.as_ref().map(|u| u.id) else {
            return false;
        };

        match self.backend.get_user(user_id).await {
            Ok(user) => {
                self.events = to_calendar_events(&user.events);
                tracing::debug!(count = self.events.len(), "Fetched user events");
                self.user = Some(user);
                true
            }
            Err(err) => {
                tracing::error!(error = %err, "Error fetching user events");
                false
            }
        }
    }

    /// Load the supported country list. Only the first successful call hits
    /// the API.
    pub async fn fetch_countries(&mut self) -> bool {
        if self.countries.is_some() {
            return true;
        }
        let Some(source) = &self.holidays else {
            return false;
        };

        match source.list_countries().await {
            Ok(countries) => {
                self.countries = Some(countries);
                true
            }
            Err(err) => {
                tracing::error!(error = %err, "Error fetching holiday countries");
                false
            }
        }
    }

    pub async fn refetch_holidays(&mut self) -> bool {
        let Some(source) = &self.holidays else {
            return false;
        };
        let year = self.visible_date.year();

        match source.list_holidays(year, &self.country).await {
            Ok(holidays) => {
                self.holiday_events = holidays.iter().map(|h| holiday_to_event(h, self.zone)).collect();
                tracing::debug!(year, country = %self.country, count = self.holiday_events.len(), "Fetched holidays");
                true
            }
            Err(err) => {
                tracing::error!(error = %err, year, country = %self.country, "Error fetching public holidays");
                false
            }
        }
    }

    /// Personal events followed by holiday entries.
    pub fn events(&self) -> Vec<CalendarEvent> {
        self.events.iter().chain(&self.holiday_events).cloned().collect()
    }

    /// Entries overlapping `date` in the view's zone, sorted by start.
    pub fn events_on(&self, date: NaiveDate) -> Vec<CalendarEvent> {
        let mut day: Vec<_> = self
            .events()
            .into_iter()
            .filter(|e| {
                let start = e.start.with_timezone(&self.zone).date_naive();
                let end = e.end.with_timezone(&self.zone);
                // An end at exactly midnight does not spill into that day
                let last = if end.time() == chrono::NaiveTime::MIN && e.end > e.start {
                    end.date_naive().pred_opt().unwrap_or(start)
                } else {
                    end.date_naive()
                };
                start <= date && date <= last.max(start)
            })
            .collect();
        day.sort_by_key(|e| (!e.is_holiday, e.start));
        day
    }

    pub fn personal_events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn holiday_events(&self) -> &[CalendarEvent] {
        &self.holiday_events
    }

    pub fn find_event(&self, id: i64) -> Option<&CalendarEvent> {
        self.events.iter().find(|e| e.id == Some(id))
    }

    /// Open the form on an entry. Holiday entries are not selectable.
    pub fn select_event(&mut self, event: &CalendarEvent) -> bool {
        if !event.is_editable() {
            tracing::debug!(title = %event.title, "Ignoring selection of holiday entry");
            return false;
        }
        self.form.open(Some(event)).is_ok()
    }

    pub fn select_event_by_id(&mut self, id: i64) -> CalResult<()> {
        let event = self
            .find_event(id)
            .cloned()
            .ok_or_else(|| CalendarError::InvalidInput(format!("No event with id {}", id)))?;
        self.form.open(Some(&event))
    }

    /// Open the form in create mode on an empty slot.
    pub fn select_slot(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) {
        // Blank drafts always open
        let _ = self.form.open(None);
        self.form.change(FieldChange::Start(start));
        self.form.change(FieldChange::End(end));
    }

    /// Move the visible range. Crossing into another year refetches holidays.
    pub async fn navigate(&mut self, date: NaiveDate) -> bool {
        let year_changed = date.year() != self.visible_date.year();
        self.visible_date = date;
        if year_changed {
            return self.refetch_holidays().await;
        }
        false
    }

    pub async fn set_country(&mut self, country: &str) -> bool {
        let country = country.trim().to_uppercase();
        if country == self.country {
            return false;
        }
        self.country = country;
        self.refetch_holidays().await
    }

    pub fn form(&self) -> &EventForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut EventForm {
        &mut self.form
    }

    pub async fn submit_form(&mut self, prompter: &mut dyn Prompter) -> FormOutcome {
        let outcome = self.form.submit(self.backend.as_ref(), prompter).await;
        self.sync().await;
        outcome
    }

    pub async fn delete_from_form(&mut self, prompter: &mut dyn Prompter) -> FormOutcome {
        let outcome = self.form.delete(self.backend.as_ref(), prompter).await;
        self.sync().await;
        outcome
    }

    /// React to everything the form published since the last call.
    /// Returns the number of refetches run (at most one).
    pub async fn sync(&mut self) -> usize {
        let mut changed = false;
        loop {
            match self.signals.try_recv() {
                Ok(signal) => changed |= signal.is_mutation(),
                Err(TryRecvError::Lagged(_)) => changed = true,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        if changed {
            self.refetch_events().await;
            return 1;
        }
        0
    }

    /// Forget the stored identity and everything fetched for it.
    pub fn logout(&mut self) -> CalResult<Route> {
        self.session.clear()?;
        if self.form.is_open() {
            self.form.close();
        }
        self.user = None;
        self.events.clear();
        self.holiday_events.clear();
        self.countries = None;
        tracing::info!("Logged out");
        Ok(Route::Login)
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn greeting(&self) -> Option<String> {
        self.user.as_ref().map(|u| format!("Welcome {} !", u.display_name()))
    }

    pub fn visible_date(&self) -> NaiveDate {
        self.visible_date
    }

    pub fn year(&self) -> i32 {
        self.visible_date.year()
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn countries(&self) -> &[Country] {
        self.countries.as_deref().unwrap_or_default()
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }
}

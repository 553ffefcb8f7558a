//! In-memory stand-ins for the backend, the holiday API and dialogs.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::api::Backend;
use crate::error::{CalResult, CalendarError};
use crate::form::Prompter;
use crate::holidays::{Country, Holiday, HolidaySource};
use crate::model::{CreateUserEvent, UpdateUserEvent, User, UserEvent};

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
        .and_utc()
}

pub fn user(id: i64, email: &str) -> User {
    User {
        id,
        email: email.to_string(),
        events: Vec::new(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListEvents,
    GetUser(i64),
    ListUsers,
    CreateOrGetUser(String),
    Create(CreateUserEvent),
    Update(UpdateUserEvent),
    Delete(i64),
}

#[derive(Default)]
struct BackendState {
    users: Vec<User>,
    acting_user: Option<i64>,
    next_id: i64,
    calls: Vec<Call>,
    mutation_error: Option<(u16, String)>,
    fetch_error: bool,
    bodyless_saves: bool,
}

/// Backend that keeps users and events in memory. Mutations act on behalf
/// of the first user unless `act_as` says otherwise.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<BackendState>,
}

impl FakeBackend {
    pub fn with_user(user: User) -> Self {
        let backend = FakeBackend::default();
        {
            let mut state = backend.state.lock().unwrap();
            state.acting_user = Some(user.id);
            state.next_id = 100;
            state.users.push(user);
        }
        backend
    }

    pub fn add_event(&self, event: UserEvent) {
        let mut state = self.state.lock().unwrap();
        if let Some(owner) = state.users.iter_mut().find(|u| u.id == event.user_id) {
            owner.events.push(event);
        }
    }

    pub fn fail_mutations(&self, status: u16, message: &str) {
        self.state.lock().unwrap().mutation_error = Some((status, message.to_string()));
    }

    /// Saves still apply but reply without an event, like a 204.
    pub fn reply_without_body(&self, bodyless: bool) {
        self.state.lock().unwrap().bodyless_saves = bodyless;
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.state.lock().unwrap().fetch_error = fail;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) -> std::sync::MutexGuard<'_, BackendState> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state
    }
}

fn check_mutation(state: &BackendState) -> CalResult<()> {
    match &state.mutation_error {
        Some((status, message)) => Err(CalendarError::Api {
            status: *status,
            message: message.clone(),
        }),
        None => Ok(()),
    }
}

fn check_fetch(state: &BackendState) -> CalResult<()> {
    if state.fetch_error {
        return Err(CalendarError::Transport("connection refused".into()));
    }
    Ok(())
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list_events(&self) -> CalResult<Vec<UserEvent>> {
        let state = self.record(Call::ListEvents);
        check_fetch(&state)?;
        Ok(state.users.iter().flat_map(|u| u.events.clone()).collect())
    }

    async fn get_user(&self, id: i64) -> CalResult<User> {
        let state = self.record(Call::GetUser(id));
        check_fetch(&state)?;
        state
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| CalendarError::Api {
                status: 404,
                message: "User not found".into(),
            })
    }

    async fn list_users(&self) -> CalResult<Vec<User>> {
        let state = self.record(Call::ListUsers);
        check_fetch(&state)?;
        Ok(state.users.clone())
    }

    async fn create_or_get_user(&self, email: &str) -> CalResult<User> {
        let mut state = self.record(Call::CreateOrGetUser(email.to_string()));
        check_mutation(&state)?;
        if let Some(existing) = state.users.iter().find(|u| u.email == email) {
            return Ok(existing.clone());
        }
        let id = state.users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let created = user(id, email);
        state.users.push(created.clone());
        Ok(created)
    }

    async fn create_event(&self, event: &CreateUserEvent) -> CalResult<Option<UserEvent>> {
        let mut state = self.record(Call::Create(event.clone()));
        check_mutation(&state)?;
        state.next_id += 1;
        let created = UserEvent {
            id: state.next_id,
            user_id: state.acting_user.unwrap_or_default(),
            title: event.title.clone(),
            start_time: event.start_time,
            end_time: event.end_time,
            description: event.description.clone(),
        };
        let owner = created.user_id;
        if let Some(u) = state.users.iter_mut().find(|u| u.id == owner) {
            u.events.push(created.clone());
        }
        Ok((!state.bodyless_saves).then_some(created))
    }

    async fn update_event(&self, event: &UpdateUserEvent) -> CalResult<Option<UserEvent>> {
        let mut state = self.record(Call::Update(event.clone()));
        check_mutation(&state)?;
        let updated = UserEvent {
            id: event.id,
            user_id: state.acting_user.unwrap_or_default(),
            title: event.title.clone(),
            start_time: event.start_time,
            end_time: event.end_time,
            description: event.description.clone(),
        };
        for u in state.users.iter_mut() {
            if let Some(slot) = u.events.iter_mut().find(|e| e.id == event.id) {
                *slot = updated.clone();
            }
        }
        Ok((!state.bodyless_saves).then_some(updated))
    }

    async fn delete_event(&self, id: i64) -> CalResult<()> {
        let mut state = self.record(Call::Delete(id));
        check_mutation(&state)?;
        for u in state.users.iter_mut() {
            u.events.retain(|e| e.id != id);
        }
        Ok(())
    }
}

/// Records alerts and answers confirmations from a script (default: yes).
#[derive(Default)]
pub struct ScriptedPrompter {
    pub alerts: Vec<String>,
    pub confirm_prompts: Vec<String>,
    answers: VecDeque<bool>,
}

impl ScriptedPrompter {
    pub fn confirming(answers: &[bool]) -> Self {
        ScriptedPrompter {
            answers: answers.iter().copied().collect(),
            ..Default::default()
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.confirm_prompts.push(message.to_string());
        self.answers.pop_front().unwrap_or(true)
    }
}

#[derive(Default)]
struct HolidayState {
    holidays: HashMap<(i32, String), Vec<Holiday>>,
    countries: Vec<Country>,
    holiday_calls: Vec<(i32, String)>,
    country_calls: usize,
    failing: bool,
}

#[derive(Default)]
pub struct FakeHolidays {
    state: Mutex<HolidayState>,
}

impl FakeHolidays {
    pub fn add(&self, country: &str, date: NaiveDate, name: &str) {
        use chrono::Datelike;

        let mut state = self.state.lock().unwrap();
        state
            .holidays
            .entry((date.year(), country.to_string()))
            .or_default()
            .push(Holiday {
                name: name.to_string(),
                description: None,
                date,
                kinds: vec!["National holiday".into()],
            });
        if !state.countries.iter().any(|c| c.iso_code == country) {
            state.countries.push(Country {
                name: country.to_string(),
                iso_code: country.to_string(),
            });
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.state.lock().unwrap().failing = failing;
    }

    pub fn holiday_calls(&self) -> Vec<(i32, String)> {
        self.state.lock().unwrap().holiday_calls.clone()
    }

    pub fn country_calls(&self) -> usize {
        self.state.lock().unwrap().country_calls
    }
}

#[async_trait]
impl HolidaySource for FakeHolidays {
    async fn list_holidays(&self, year: i32, country: &str) -> CalResult<Vec<Holiday>> {
        let mut state = self.state.lock().unwrap();
        state.holiday_calls.push((year, country.to_string()));
        if state.failing {
            return Err(CalendarError::MalformedResponse {
                payload: "holidays",
                reason: "missing `response`".into(),
            });
        }
        Ok(state
            .holidays
            .get(&(year, country.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_countries(&self) -> CalResult<Vec<Country>> {
        let mut state = self.state.lock().unwrap();
        state.country_calls += 1;
        if state.failing {
            return Err(CalendarError::Transport("connection refused".into()));
        }
        Ok(state.countries.clone())
    }
}

//! Core types for levo-calendar.
//!
//! This crate holds everything the CLI drives:
//! - `model` for users, events and the calendar view model
//! - `api` and `holidays` for the backend and the public holiday API
//! - `session` for the locally stored identity
//! - `form`, `view`, `login` and `route` for the page state machines

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod form;
pub mod holidays;
pub mod login;
pub mod model;
pub mod route;
pub mod session;
pub mod timezone;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{CalResult, CalendarError};
pub use model::{CalendarEvent, CreateUserEvent, UpdateUserEvent, User, UserEvent};

//! Wiring shared by every command: config, session and API clients.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use levo_calendar_core::api::{ApiClient, Backend};
use levo_calendar_core::config::AppConfig;
use levo_calendar_core::holidays::{HolidayClient, HolidaySource};
use levo_calendar_core::route::Route;
use levo_calendar_core::session::Session;
use levo_calendar_core::timezone::{local_zone, parse_zone};
use levo_calendar_core::view::{CalendarView, ViewOptions};

use crate::utils::tui::with_spinner;

pub struct App {
    pub config: AppConfig,
    pub session: Session,
    backend: Arc<ApiClient>,
    holidays: Option<Arc<HolidayClient>>,
}

impl App {
    pub fn load() -> Result<Self> {
        let config = AppConfig::load().context("Failed to load config")?;
        let session = Session::in_dir(&config.data_path()?);
        let backend = Arc::new(ApiClient::new(&config.backend_url, session.clone()));

        let holidays = match config.holidays_api_key.as_deref() {
            Some(key) if config.holidays_enabled() => {
                Some(Arc::new(HolidayClient::new(&config.holidays_url, key)))
            }
            _ => {
                tracing::debug!("No holidays_api_key configured; holiday overlay disabled");
                None
            }
        };

        Ok(App {
            config,
            session,
            backend,
            holidays,
        })
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn holidays(&self) -> Option<&dyn HolidaySource> {
        self.holidays.as_deref().map(|h| h as &dyn HolidaySource)
    }

    /// Build the calendar page without loading anything.
    pub fn view(&self, overrides: ViewOverrides<'_>) -> Result<CalendarView> {
        let mut options = ViewOptions {
            country: overrides.country.unwrap_or(&self.config.country).to_uppercase(),
            zone: local_zone(),
            ..ViewOptions::default()
        };
        if let Some(date) = overrides.visible_date {
            options.visible_date = date;
        }

        let display_zone = overrides.timezone.or(self.config.timezone.as_deref());
        options.display_zone = display_zone.map(parse_zone).transpose()?;

        Ok(CalendarView::new(
            self.session.clone(),
            self.backend.clone(),
            self.holidays.clone().map(|h| h as Arc<dyn HolidaySource>),
            options,
        ))
    }

    /// Build and mount the calendar page. Bails when nobody is logged in.
    pub async fn mounted_view(&self, overrides: ViewOverrides<'_>) -> Result<CalendarView> {
        let mut view = self.view(overrides)?;

        let route = with_spinner("Loading calendar", view.mount()).await;

        match route? {
            Route::Calendar => Ok(view),
            _ => anyhow::bail!(
                "Not logged in.\n\n\
                Log in with:\n  \
                levocal login <email>"
            ),
        }
    }
}

#[derive(Default, Clone, Copy)]
pub struct ViewOverrides<'a> {
    pub country: Option<&'a str>,
    pub timezone: Option<&'a str>,
    pub visible_date: Option<NaiveDate>,
}

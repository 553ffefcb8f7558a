use anyhow::Result;
use levo_calendar_core::login::LoginPage;
use levo_calendar_core::route::Route;
use owo_colors::OwoColorize;

use crate::app::App;

/// Render the page a path routes to.
pub async fn run(app: &App, path: &str) -> Result<()> {
    match Route::from_path(path) {
        Route::Calendar => super::show::run(app, None, None).await,
        Route::Login => match LoginPage::new(app.session.clone()).mount()? {
            Some(route) => {
                println!("{}", format!("Already logged in, opening {}", route).dimmed());
                super::show::run(app, None, None).await
            }
            None => {
                println!("Log in with:\n  levocal login <email>");
                Ok(())
            }
        },
        Route::NotFound => anyhow::bail!("Page not found: {}", path),
    }
}

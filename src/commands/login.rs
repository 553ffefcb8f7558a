use anyhow::Result;
use levo_calendar_core::login::{LoginOutcome, LoginPage};
use owo_colors::OwoColorize;

use crate::app::App;
use crate::utils::tui::with_spinner;

pub async fn run(app: &App, email: &str) -> Result<()> {
    let mut page = LoginPage::new(app.session.clone());

    if page.mount()?.is_some() {
        if let Some(current) = app.session.get_local_user()? {
            println!("{}", format!("  Switching from {}", current.email).dimmed());
        }
    }

    let outcome = with_spinner("Logging in", page.submit(app.backend(), email)).await;

    match outcome {
        LoginOutcome::Navigate(route) => {
            let user = app.session.require_user()?;
            println!("{}", format!("Logged in as {}", user.email).green());
            println!();
            tracing::debug!(%route, "Navigating after login");
            super::open::run(app, route.path()).await
        }
        LoginOutcome::Error(message) => anyhow::bail!(message),
    }
}

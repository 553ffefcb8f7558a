use anyhow::Result;
use owo_colors::OwoColorize;

use crate::app::{App, ViewOverrides};

pub fn run(app: &App) -> Result<()> {
    let Some(user) = app.session.get_local_user()? else {
        println!("{}", "Not logged in".dimmed());
        return Ok(());
    };

    let mut view = app.view(ViewOverrides::default())?;
    let route = view.logout()?;
    tracing::debug!(%route, "Redirecting after logout");

    println!("{}", format!("Logged out {}", user.email).green());
    Ok(())
}

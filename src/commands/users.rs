use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::app::App;
use crate::render::Render;
use crate::utils::tui::with_spinner;

pub async fn run(app: &App) -> Result<()> {
    let users = with_spinner("Fetching users", app.backend().list_users()).await;

    let mut users = users.context("Failed to fetch users")?;
    if users.is_empty() {
        println!("{}", "No users found".dimmed());
        return Ok(());
    }

    users.sort_by_key(|u| u.id);
    for user in &users {
        println!("  {}", user.render());
    }
    Ok(())
}

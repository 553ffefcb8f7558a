use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::app::App;
use crate::render::Render;
use crate::utils::tui::with_spinner;

pub async fn run(app: &App) -> Result<()> {
    let Some(source) = app.holidays() else {
        anyhow::bail!(
            "Public holidays are not configured.\n\n\
            Add a Calendarific key to your config:\n  \
            holidays_api_key = \"...\""
        );
    };

    let countries = with_spinner("Fetching countries", source.list_countries()).await;

    let mut countries = countries.context("Failed to fetch holiday countries")?;
    if countries.is_empty() {
        println!("{}", "No countries found".dimmed());
        return Ok(());
    }

    countries.sort_by(|a, b| a.name.cmp(&b.name));
    for country in &countries {
        let marker = if country.iso_code.eq_ignore_ascii_case(&app.config.country) {
            "*"
        } else {
            " "
        };
        println!("{} {}", marker.green(), country.render());
    }
    Ok(())
}

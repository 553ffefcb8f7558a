use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use owo_colors::OwoColorize;

use crate::app::{App, ViewOverrides};
use crate::render::render_month;

pub async fn run(app: &App, month: Option<&str>, country: Option<&str>) -> Result<()> {
    let visible_date = month.map(parse_month).transpose()?;
    let view = app
        .mounted_view(ViewOverrides {
            country,
            visible_date,
            ..Default::default()
        })
        .await?;

    if let Some(greeting) = view.greeting() {
        println!("{}", greeting.bold());
        println!();
    }

    let today = Utc::now().with_timezone(&view.zone()).date_naive();
    println!("{}", render_month(&view, today));

    if app.holidays().is_none() {
        println!();
        println!(
            "{}",
            "Public holidays are off (set holidays_api_key in config.toml)".dimmed()
        );
    } else if !view.countries().is_empty()
        && !view.countries().iter().any(|c| c.iso_code == view.country())
    {
        println!();
        println!(
            "{}",
            format!("No holiday data for '{}'. See `levocal countries`.", view.country()).yellow()
        );
    }

    Ok(())
}

/// Parse "YYYY-MM" into the first day of that month.
fn parse_month(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", input.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month: \"{}\" (expected YYYY-MM)", input))
}

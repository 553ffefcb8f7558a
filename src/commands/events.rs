use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;

use crate::app::{App, ViewOverrides};
use crate::render::{RenderIn, format_date_label};

pub async fn run(app: &App, all: bool, json: bool) -> Result<()> {
    let view = app.mounted_view(ViewOverrides::default()).await?;
    let zone = view.zone();
    let now = Utc::now();

    let mut events: Vec<_> = view
        .personal_events()
        .iter()
        .filter(|e| all || e.end >= now)
        .collect();
    events.sort_by_key(|e| e.start);

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    let today = now.with_timezone(&zone).date_naive();
    let mut current_date = None;

    for event in events {
        let date = event.start.with_timezone(&zone).date_naive();
        if current_date != Some(date) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", format_date_label(date, today).bold());
            current_date = Some(date);
        }
        println!("  {}", event.render_in(zone));
    }

    Ok(())
}

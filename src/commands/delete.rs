use anyhow::{Context, Result};
use levo_calendar_core::form::FormOutcome;
use owo_colors::OwoColorize;

use crate::app::{App, ViewOverrides};
use crate::prompt::TerminalPrompter;
use crate::render::RenderIn;

pub async fn run(app: &App, id: i64, yes: bool) -> Result<()> {
    let mut view = app.mounted_view(ViewOverrides::default()).await?;
    view.select_event_by_id(id)
        .with_context(|| format!("Event #{} is not in your calendar", id))?;

    let event = view.form().draft().clone();
    println!("  {}", event.render_in(view.zone()));

    let mut prompter = TerminalPrompter::new().assume_yes(yes);
    match view.delete_from_form(&mut prompter).await {
        FormOutcome::Deleted(_) => {
            println!("{}", format!("  Deleted: {}", event.title).red());
            Ok(())
        }
        FormOutcome::Failed(_) => anyhow::bail!("Event was not deleted"),
        FormOutcome::Cancelled | FormOutcome::Saved(_) => {
            println!("{}", "  Kept".dimmed());
            Ok(())
        }
    }
}

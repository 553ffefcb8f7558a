pub mod countries;
pub mod delete;
pub mod edit;
pub mod events;
pub mod login;
pub mod logout;
pub mod new;
pub mod open;
pub mod show;
pub mod users;
pub mod whoami;

use anyhow::Result;
use levo_calendar_core::form::FormOutcome;
use owo_colors::OwoColorize;

/// Print the result of submitting the event form. The form has already
/// alerted on failure, so only the exit status is left to set.
fn report_saved(outcome: FormOutcome, verb: &str) -> Result<()> {
    match outcome {
        FormOutcome::Saved(Some(event)) => {
            println!("{}", format!("  {}: {} #{}", verb, event.title, event.id).green());
            Ok(())
        }
        FormOutcome::Saved(None) => {
            println!("{}", format!("  {}", verb).green());
            Ok(())
        }
        FormOutcome::Failed(_) => anyhow::bail!("Event was not saved"),
        FormOutcome::Cancelled | FormOutcome::Deleted(_) => {
            println!("{}", "  Nothing saved".dimmed());
            Ok(())
        }
    }
}

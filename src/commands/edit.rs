use anyhow::{Context, Result};
use dialoguer::Input;
use levo_calendar_core::form::{FieldChange, format_datetime_input};
use owo_colors::OwoColorize;

use super::new::parse_datetime;
use crate::app::{App, ViewOverrides};
use crate::prompt::TerminalPrompter;
use crate::render::RenderIn;

pub struct EditArgs {
    pub title: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub description: Option<String>,
}

impl EditArgs {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.description.is_none()
    }
}

pub async fn run(app: &App, id: i64, args: EditArgs) -> Result<()> {
    let mut view = app.mounted_view(ViewOverrides::default()).await?;
    view.select_event_by_id(id)
        .with_context(|| format!("Event #{} is not in your calendar", id))?;

    let zone = view.zone();
    let draft = view.form().draft().clone();
    println!("  {}", draft.render_in(zone));

    let args = if args.is_empty() {
        prompt_all(
            &draft.title,
            &format_datetime_input(draft.start, zone),
            &format_datetime_input(draft.end, zone),
            draft.description.as_deref().unwrap_or_default(),
        )?
    } else {
        args
    };

    let start = args
        .start
        .as_deref()
        .map(|s| parse_datetime(s)?.in_zone(zone))
        .transpose()?;
    let end = match args.end.as_deref() {
        Some(e) => Some(parse_datetime(e)?.in_zone(zone)?),
        // Moving the start keeps the length
        None => start.map(|s| s + (draft.end - draft.start)),
    };

    let form = view.form_mut();
    if let Some(title) = args.title {
        form.change(FieldChange::Title(title));
    }
    if let Some(start) = start {
        form.change(FieldChange::Start(start));
    }
    if let Some(end) = end {
        form.change(FieldChange::End(end));
    }
    if let Some(description) = args.description {
        form.change(FieldChange::Description(description));
    }

    let outcome = view.submit_form(&mut TerminalPrompter::new()).await;
    super::report_saved(outcome, "Updated")
}

/// Ask for every field, prefilled with the current values.
fn prompt_all(title: &str, start: &str, end: &str, description: &str) -> Result<EditArgs> {
    let ask = |prompt: &str, current: &str| -> Result<String> {
        Ok(Input::<String>::new()
            .with_prompt(format!("  {}", prompt))
            .with_initial_text(current)
            .allow_empty(true)
            .interact_text()?)
    };

    let title = ask("Title", title)?;
    let start_input = loop {
        let input = ask("Start", start)?;
        match parse_datetime(&input) {
            Ok(_) => break input,
            Err(e) => eprintln!("  {}", e.to_string().red()),
        }
    };
    let end_input = loop {
        let input = ask("End", end)?;
        match parse_datetime(&input) {
            Ok(_) => break input,
            Err(e) => eprintln!("  {}", e.to_string().red()),
        }
    };
    let description = ask("Description", description)?;

    Ok(EditArgs {
        title: Some(title),
        start: Some(start_input),
        end: Some(end_input),
        description: Some(description),
    })
}

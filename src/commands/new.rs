use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use dialoguer::Input;
use levo_calendar_core::form::{DATETIME_INPUT_FORMAT, FieldChange};
use owo_colors::OwoColorize;

use crate::app::{App, ViewOverrides};
use crate::prompt::TerminalPrompter;

pub struct NewArgs {
    pub title: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub timezone: Option<String>,
}

/// A typed start or end: a whole day, or a wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Moment {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Moment {
    fn naive(&self) -> NaiveDateTime {
        match self {
            Moment::Date(d) => d.and_time(chrono::NaiveTime::MIN),
            Moment::DateTime(dt) => *dt,
        }
    }

    /// The instant this wall-clock reading names in `zone`.
    pub fn in_zone(&self, zone: Tz) -> Result<DateTime<Utc>> {
        let naive = self.naive();
        zone.from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("{} does not exist in {}", naive, zone))
    }
}

pub async fn run(app: &App, args: NewArgs) -> Result<()> {
    let mut view = app
        .mounted_view(ViewOverrides {
            timezone: args.timezone.as_deref(),
            ..Default::default()
        })
        .await?;
    let zone = view.zone();
    let interactive = args.title.is_none() || args.start.is_none();

    // --- Title ---
    let title = match args.title {
        Some(t) => t,
        None => Input::<String>::new()
            .with_prompt("  Title")
            .interact_text()?,
    };

    // --- Start ---
    let start = if let Some(s) = args.start {
        parse_datetime(&s)?
    } else {
        prompt_with_retry("  When?", parse_datetime)?
    };

    // --- Duration / End ---
    let default_hint = match start {
        Moment::Date(_) => "1 day",
        Moment::DateTime(_) => "1 hour",
    };

    let end = if let Some(end_input) = args.end {
        parse_datetime(&end_input)?
    } else if let Some(dur_input) = args.duration {
        apply_duration(&start, &dur_input)?
    } else if interactive {
        prompt_duration(&start, default_hint)?
    } else {
        default_end(&start)
    };

    // --- Description ---
    let description = match args.description {
        Some(d) => d,
        None if interactive => Input::new()
            .with_prompt("  Description? (skip)")
            .default(String::new())
            .show_default(false)
            .interact_text()?,
        None => String::new(),
    };

    view.select_slot(start.in_zone(zone)?, end.in_zone(zone)?);
    let form = view.form_mut();
    form.change(FieldChange::Title(title));
    form.change(FieldChange::Description(description));

    if interactive {
        println!();
    }
    let outcome = view.submit_form(&mut TerminalPrompter::new()).await;
    super::report_saved(outcome, "Created")
}

/// Prompt the user with retry on parse errors.
fn prompt_with_retry<F>(prompt: &str, parse: F) -> Result<Moment>
where
    F: Fn(&str) -> Result<Moment>,
{
    loop {
        let input: String = Input::new().with_prompt(prompt).interact_text()?;
        match parse(&input) {
            Ok(result) => return Ok(result),
            Err(e) => {
                eprintln!("  {}", e.to_string().red());
            }
        }
    }
}

/// Prompt for duration/end with retry on parse errors.
fn prompt_duration(start: &Moment, default_hint: &str) -> Result<Moment> {
    loop {
        let input: String = Input::new()
            .with_prompt(format!("  How long? ({})", default_hint))
            .default(String::new())
            .show_default(false)
            .interact_text()?;
        if input.is_empty() {
            return Ok(default_end(start));
        }
        match parse_end(&input, start) {
            Ok(result) => return Ok(result),
            Err(e) => {
                eprintln!("  {}", e.to_string().red());
            }
        }
    }
}

/// Expand common abbreviations that fuzzydate doesn't handle.
fn expand_abbreviations(input: &str) -> String {
    const ABBREVIATIONS: [(&str, &str); 22] = [
        ("mon", "monday"),
        ("tue", "tuesday"),
        ("tues", "tuesday"),
        ("wed", "wednesday"),
        ("thu", "thursday"),
        ("thur", "thursday"),
        ("thurs", "thursday"),
        ("fri", "friday"),
        ("sat", "saturday"),
        ("sun", "sunday"),
        ("jan", "january"),
        ("feb", "february"),
        ("mar", "march"),
        ("apr", "april"),
        ("jun", "june"),
        ("jul", "july"),
        ("aug", "august"),
        ("sep", "september"),
        ("sept", "september"),
        ("oct", "october"),
        ("nov", "november"),
        ("dec", "december"),
    ];

    input
        .to_lowercase()
        .split_whitespace()
        .map(|word| {
            ABBREVIATIONS
                .iter()
                .find(|(abbr, _)| *abbr == word)
                .map(|(_, full)| *full)
                .unwrap_or(word)
                .to_string()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a start/end input.
///
/// The form's own `YYYY-MM-DDTHH:MM` and plain `YYYY-MM-DD` are taken
/// literally; anything else goes through fuzzydate ("tomorrow 3pm").
/// Inputs without a time token become whole days.
pub fn parse_datetime(input: &str) -> Result<Moment> {
    let trimmed = input.trim();
    for format in [DATETIME_INPUT_FORMAT, "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(Moment::DateTime(dt));
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(Moment::Date(d));
    }

    let expanded = expand_abbreviations(trimmed);
    let dt = fuzzydate::parse(&expanded)
        .map_err(|_| anyhow::anyhow!("Could not parse date/time: \"{}\"", input))?;

    if has_time_component(trimmed) {
        Ok(Moment::DateTime(dt))
    } else {
        Ok(Moment::Date(dt.date()))
    }
}

/// Check if the user's input string contains time-related tokens.
fn has_time_component(input: &str) -> bool {
    let lower = input.to_lowercase();

    if lower.contains("noon") || lower.contains("midnight") {
        return true;
    }

    // am/pm right after a digit, e.g. "6pm", "6 pm", "11am"
    let bytes = lower.as_bytes();
    for i in 1..bytes.len() {
        if (bytes[i - 1] == b'a' || bytes[i - 1] == b'p') && bytes[i] == b'm' {
            let before = &lower[..i - 1];
            if before.trim_end().ends_with(|c: char| c.is_ascii_digit()) {
                return true;
            }
        }
    }

    // HH:MM
    if bytes
        .windows(3)
        .any(|w| w[0].is_ascii_digit() && w[1] == b':' && w[2].is_ascii_digit())
    {
        return true;
    }

    // "at 3", "friday at 15"
    lower
        .split_whitespace()
        .collect::<Vec<_>>()
        .windows(2)
        .any(|w| w[0] == "at" && w[1].starts_with(|c: char| c.is_ascii_digit()))
}

/// Parse an end input: tries duration first (humantime), then date/time.
fn parse_end(input: &str, start: &Moment) -> Result<Moment> {
    if let Ok(moment) = try_apply_duration(start, input) {
        return Ok(moment);
    }

    let cleaned = input
        .strip_prefix("until ")
        .or_else(|| input.strip_prefix("to "))
        .unwrap_or(input);

    parse_datetime(cleaned)
}

/// Apply a duration string to a start time.
pub fn apply_duration(start: &Moment, dur_input: &str) -> Result<Moment> {
    try_apply_duration(start, dur_input)
        .with_context(|| format!("Could not parse duration: \"{}\"", dur_input))
}

fn try_apply_duration(start: &Moment, dur_input: &str) -> Result<Moment> {
    let std_dur = humantime::parse_duration(dur_input.trim()).map_err(|e| anyhow::anyhow!("{}", e))?;
    let chrono_dur = Duration::from_std(std_dur).context("Duration too large")?;

    match start {
        Moment::Date(d) if chrono_dur.num_seconds() % 86_400 == 0 => d
            .checked_add_signed(chrono_dur)
            .map(Moment::Date)
            .context("Duration too large"),
        other => other
            .naive()
            .checked_add_signed(chrono_dur)
            .map(Moment::DateTime)
            .context("Duration too large"),
    }
}

/// Default end time: +1 hour for timed events, +1 day for whole days.
fn default_end(start: &Moment) -> Moment {
    match start {
        Moment::Date(d) => Moment::Date(*d + Duration::days(1)),
        Moment::DateTime(dt) => Moment::DateTime(*dt + Duration::hours(1)),
    }
}

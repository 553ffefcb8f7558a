//! TUI rendering for calendar types.
//!
//! Extension traits that add colored terminal output to levo-calendar-core
//! types using owo_colors.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use levo_calendar_core::holidays::Country;
use levo_calendar_core::view::CalendarView;
use levo_calendar_core::{CalendarEvent, User};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

/// Rendering that depends on the zone times are shown in.
pub trait RenderIn {
    fn render_in(&self, zone: Tz) -> String;
}

impl Render for User {
    fn render(&self) -> String {
        format!("{} {}", self.email, format!("(id {})", self.id).dimmed())
    }
}

impl Render for Country {
    fn render(&self) -> String {
        format!("{:<4} {}", self.iso_code.bold(), self.name)
    }
}

impl RenderIn for CalendarEvent {
    fn render_in(&self, zone: Tz) -> String {
        let time = format_time_range(self, zone);
        if self.is_holiday {
            return format!("{} {}", time.dimmed(), self.title.magenta());
        }

        let id = self.id.map(|id| format!("#{}", id)).unwrap_or_default();
        format!("{} {} {}", time, self.title, id.dimmed())
    }
}

/// "15:00-16:00", or "all-day" for entries spanning whole local days.
pub fn format_time_range(event: &CalendarEvent, zone: Tz) -> String {
    let start = event.start.with_timezone(&zone);
    let end = event.end.with_timezone(&zone);

    if start.time() == NaiveTime::MIN && end.time() == NaiveTime::MIN && end > start {
        return format!("{:>11}", "all-day");
    }
    format!("{}-{}", start.format("%H:%M"), end.format("%H:%M"))
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Feb 25")
pub fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        _ if date.year() == today.year() => date.format("%a %b %-d").to_string(),
        _ => date.format("%a %b %-d %Y").to_string(),
    }
}

/// Weeks of the month containing `date`, Monday first. Days outside the
/// month are `None`.
pub fn month_weeks(date: NaiveDate) -> Vec<[Option<NaiveDate>; 7]> {
    let Some(first) = date.with_day(1) else {
        return Vec::new();
    };
    let lead = first.weekday().num_days_from_monday() as i64;

    let mut weeks = Vec::new();
    let mut cursor = first - Duration::days(lead);
    loop {
        let mut week = [None; 7];
        for slot in week.iter_mut() {
            if cursor.month() == first.month() && cursor.year() == first.year() {
                *slot = Some(cursor);
            }
            cursor += Duration::days(1);
        }
        weeks.push(week);
        if cursor.month() != first.month() || cursor.year() != first.year() {
            break;
        }
    }
    weeks
}

/// The month grid plus an agenda of everything in it.
pub fn render_month(view: &CalendarView, today: NaiveDate) -> String {
    let visible = view.visible_date();
    let zone = view.zone();
    let mut lines = Vec::new();

    let title = visible.format("%B %Y").to_string();
    lines.push(format!("{:^27}", title).bold().to_string());
    lines.push("Mo  Tu  We  Th  Fr  Sa  Su".dimmed().to_string());

    let mut agenda = Vec::new();
    for week in month_weeks(visible) {
        let cells: Vec<String> = week
            .iter()
            .map(|day| match day {
                None => "  ".to_string(),
                Some(day) => {
                    let entries = view.events_on(*day);
                    if !entries.is_empty() {
                        agenda.push((*day, entries.clone()));
                    }
                    render_day_cell(*day, &entries, today)
                }
            })
            .collect();
        lines.push(cells.join("  "));
    }

    lines.push(String::new());
    if agenda.is_empty() {
        lines.push("No events this month".dimmed().to_string());
    }
    for (day, entries) in agenda {
        lines.push(format_date_label(day, today).bold().to_string());
        for entry in entries {
            lines.push(format!("  {}", entry.render_in(zone)));
        }
    }

    lines.join("\n")
}

fn render_day_cell(day: NaiveDate, entries: &[CalendarEvent], today: NaiveDate) -> String {
    let number = format!("{:>2}", day.day());
    let has_holiday = entries.iter().any(|e| e.is_holiday);
    let has_event = entries.iter().any(|e| !e.is_holiday);

    let number = match (has_holiday, has_event) {
        (_, true) => number.cyan().bold().to_string(),
        (true, false) => number.magenta().to_string(),
        (false, false) => number,
    };
    if day == today {
        number.reversed().to_string()
    } else {
        number
    }
}

//! Terminal dialogs for the event form.

use dialoguer::Confirm;
use levo_calendar_core::form::Prompter;
use owo_colors::OwoColorize;

/// Alerts go to stderr in red; confirmations use a y/N prompt.
pub struct TerminalPrompter {
    assume_yes: bool,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        TerminalPrompter { assume_yes: false }
    }

    /// Answer every confirmation with yes without asking.
    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }
}

impl Prompter for TerminalPrompter {
    fn alert(&mut self, message: &str) {
        eprintln!("  {}", message.red());
    }

    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        Confirm::new()
            .with_prompt(format!("  {}", message))
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

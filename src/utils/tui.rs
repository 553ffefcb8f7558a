use std::future::Future;
use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Await `work` behind a spinner on stderr. Nothing is drawn when stderr is
/// not a terminal, so piped output stays clean.
pub async fn with_spinner<T>(message: &str, work: impl Future<Output = T>) -> T {
    let spinner = spinner(message, std::io::stderr().is_terminal());
    let result = work.await;
    spinner.finish_and_clear();
    result
}

fn spinner(message: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&[".  ", ".. ", "...", "   "])
        .template("{spinner} {msg}")
    {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_is_hidden_off_terminal() {
        assert!(spinner("Loading calendar", false).is_hidden());
    }

    #[tokio::test]
    async fn with_spinner_passes_result_through() {
        assert_eq!(with_spinner("Fetching users", async { 7 }).await, 7);
    }
}

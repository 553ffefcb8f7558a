//! The login page: one email field, no password.
//!
//! The backend creates the user on first login and returns the existing one
//! afterwards. The returned record is stored locally and becomes the session.

use crate::api::Backend;
use crate::error::CalResult;
use crate::route::Route;
use crate::session::Session;

pub const LOGIN_FAILED: &str = "Login failed. Please check your email and try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Navigate(Route),
    Error(&'static str),
}

pub struct LoginPage {
    session: Session,
    error: Option<&'static str>,
}

impl LoginPage {
    pub fn new(session: Session) -> Self {
        LoginPage { session, error: None }
    }

    /// Someone already logged in goes straight to the calendar.
    pub fn mount(&self) -> CalResult<Option<Route>> {
        Ok(self.session.get_local_user()?.map(|_| Route::Calendar))
    }

    /// The inline error banner, if the last submit failed.
    pub fn error_banner(&self) -> Option<&'static str> {
        self.error
    }

    pub async fn submit(&mut self, backend: &dyn Backend, email: &str) -> LoginOutcome {
        let email = email.trim();
        if !looks_like_email(email) {
            tracing::debug!(email, "Rejected email before contacting backend");
            return self.failed();
        }

        let stored = match backend.create_or_get_user(email).await {
            Ok(user) => self.session.set_local_user(&user).map(|_| user),
            Err(err) => Err(err),
        };

        match stored {
            Ok(user) => {
                tracing::info!(user_id = user.id, "Logged in");
                self.error = None;
                LoginOutcome::Navigate(Route::Calendar)
            }
            Err(err) => {
                tracing::error!(error = %err, "Error during login");
                self.failed()
            }
        }
    }

    fn failed(&mut self) -> LoginOutcome {
        self.error = Some(LOGIN_FAILED);
        LoginOutcome::Error(LOGIN_FAILED)
    }
}

/// Required, one `@` with something on both sides, no whitespace.
/// Dotless domains such as `localhost` are accepted.
fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !email.contains(char::is_whitespace)
}

//! HTTP client for the levo-calendar backend.
//!
//! Every operation issues exactly one request and hands failures back to the
//! caller unchanged: there is no retry, no caching and no pagination.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::constants::USER_ID_HEADER;
use crate::error::{CalResult, CalendarError};
use crate::model::{CreateUserEvent, UpdateUserEvent, User, UserEvent};
use crate::session::Session;

/// Operations the calendar pages need from the backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// GET /events
    async fn list_events(&self) -> CalResult<Vec<UserEvent>>;

    /// GET /users/:id
    async fn get_user(&self, id: i64) -> CalResult<User>;

    /// GET /users
    async fn list_users(&self) -> CalResult<Vec<User>>;

    /// POST /users
    async fn create_or_get_user(&self, email: &str) -> CalResult<User>;

    /// POST /events. `None` when the server accepted the event but its
    /// reply could not be read as one.
    async fn create_event(&self, event: &CreateUserEvent) -> CalResult<Option<UserEvent>>;

    /// PUT /events/:id. `None` as for `create_event`.
    async fn update_event(&self, event: &UpdateUserEvent) -> CalResult<Option<UserEvent>>;

    /// DELETE /events/:id. Any 2xx counts as deleted, whatever the body.
    async fn delete_event(&self, id: i64) -> CalResult<()>;
}

/// Structured error body returned by the backend. Different endpoints use
/// different field names, so all of them are optional.
#[derive(Deserialize, Default)]
struct ErrorResponse {
    detail: Option<serde_json::Value>,
    message: Option<String>,
    error: Option<String>,
}

impl ErrorResponse {
    fn into_message(self) -> Option<String> {
        let detail = self.detail.and_then(|d| match d {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        });
        detail.or(self.message).or(self.error)
    }
}

/// `Backend` over HTTP with reqwest.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Session) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the stored user id. Without a local user the header is left
    /// off and the backend decides what to do.
    fn with_user_id(&self, request: RequestBuilder) -> CalResult<RequestBuilder> {
        match self.session.user_id()? {
            Some(id) => Ok(request.header(USER_ID_HEADER, id.to_string())),
            None => {
                tracing::warn!("No local user; sending event mutation without user id");
                Ok(request)
            }
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> CalResult<T> {
        let resp = request.send().await?;
        check_response(resp).await?.json::<T>().await.map_err(|e| CalendarError::Decode(e.to_string()))
    }

    /// Like `send`, but a 2xx reply is a success even when its body is
    /// empty or not a `T`: the change already happened server side.
    async fn send_mutation<T: DeserializeOwned>(&self, request: RequestBuilder) -> CalResult<Option<T>> {
        let resp = request.send().await?;
        let status = resp.status();
        let body = check_response(resp).await?.text().await.unwrap_or_default();
        if body.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<T>(&body) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::debug!(status = status.as_u16(), error = %e, "Ignoring unreadable success body");
                Ok(None)
            }
        }
    }
}

/// Turn a non-2xx response into `CalendarError::Api` carrying the
/// backend's own message.
async fn check_response(resp: Response) -> CalResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .ok()
        .and_then(ErrorResponse::into_message)
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| status.to_string());

    tracing::debug!(status = status.as_u16(), %message, "Backend returned an error");
    Err(CalendarError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl Backend for ApiClient {
    async fn list_events(&self) -> CalResult<Vec<UserEvent>> {
        tracing::debug!("GET /events");
        self.send(self.http.get(self.url("/events"))).await
    }

    async fn get_user(&self, id: i64) -> CalResult<User> {
        tracing::debug!(id, "GET /users/:id");
        self.send(self.http.get(self.url(&format!("/users/{}", id)))).await
    }

    async fn list_users(&self) -> CalResult<Vec<User>> {
        tracing::debug!("GET /users");
        self.send(self.http.get(self.url("/users"))).await
    }

    async fn create_or_get_user(&self, email: &str) -> CalResult<User> {
        tracing::debug!(email, "POST /users");
        let request = self
            .http
            .post(self.url("/users"))
            .json(&serde_json::json!({ "email": email }));
        self.send(request).await
    }

    async fn create_event(&self, event: &CreateUserEvent) -> CalResult<Option<UserEvent>> {
        tracing::debug!(title = %event.title, "POST /events");
        let request = self.with_user_id(self.http.post(self.url("/events")).json(event))?;
        self.send_mutation(request).await
    }

    async fn update_event(&self, event: &UpdateUserEvent) -> CalResult<Option<UserEvent>> {
        tracing::debug!(id = event.id, "PUT /events/:id");
        let request = self.with_user_id(
            self.http
                .put(self.url(&format!("/events/{}", event.id)))
                .json(event),
        )?;
        self.send_mutation(request).await
    }

    async fn delete_event(&self, id: i64) -> CalResult<()> {
        tracing::debug!(id, "DELETE /events/:id");
        let request = self.with_user_id(self.http.delete(self.url(&format!("/events/{}", id))))?;
        self.send_mutation::<serde_json::Value>(request).await?;
        Ok(())
    }
}

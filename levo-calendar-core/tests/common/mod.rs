//! Stub HTTP server for exercising the real clients.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub user_id: Option<String>,
    pub body: String,
}

impl Recorded {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }

    pub fn query_pairs(&self) -> HashMap<String, String> {
        self.query
            .as_deref()
            .unwrap_or_default()
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

#[derive(Default)]
struct StubState {
    responses: Mutex<HashMap<String, (u16, String)>>,
    requests: Mutex<Vec<Recorded>>,
}

/// Answers `METHOD /path` with canned responses and records every request.
#[derive(Clone, Default)]
pub struct Stub {
    state: Arc<StubState>,
}

impl Stub {
    pub fn respond(&self, method: &str, path: &str, status: u16, body: &str) -> &Self {
        self.state
            .responses
            .lock()
            .unwrap()
            .insert(format!("{} {}", method, path), (status, body.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> Recorded {
        self.requests().pop().expect("at least one request")
    }

    /// Serve on an ephemeral port and return its base URL.
    pub async fn serve(&self, prefix: &str) -> String {
        let app = Router::new().fallback(answer).with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}{}", addr, prefix)
    }
}

async fn answer(
    State(stub): State<Stub>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let path = uri.path().to_string();
    stub.state.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(String::from),
        user_id: headers
            .get("user-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        body,
    });

    let canned = stub
        .state
        .responses
        .lock()
        .unwrap()
        .get(&format!("{} {}", method, path))
        .cloned();

    let (status, body) = canned.unwrap_or((404, r#"{"detail": "Not Found"}"#.to_string()));
    (
        StatusCode::from_u16(status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
}

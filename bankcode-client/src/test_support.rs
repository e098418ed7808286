//! In-process HTTP server standing in for the BankCode API in tests.

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::client::BankCodeClient;
use crate::config::{ClientConfig, ClientConfigBuilder, Plan};

pub(crate) const TEST_API_KEY: &str = "test-api-key-0001";

/// A request as seen by the server.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub received_at: Instant,
}

impl RecordedRequest {
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct MockResponse {
    status: u16,
    body: String,
    delay: Option<Duration>,
}

impl MockResponse {
    pub fn json(body: impl Into<String>) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

type Responder = Arc<dyn Fn(&RecordedRequest) -> MockResponse + Send + Sync>;

#[derive(Clone)]
struct MockState {
    responder: Responder,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub(crate) struct MockServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    task: JoinHandle<()>,
}

impl MockServer {
    /// Starts a server on an ephemeral port that answers every request
    /// with whatever `responder` returns.
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&RecordedRequest) -> MockResponse + Send + Sync + 'static,
    {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            responder: Arc::new(responder),
            requests: requests.clone(),
        };
        let app = Router::new().fallback(handle).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            requests,
            task,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Config pointed at this server with the test key.
    pub fn config(&self) -> ClientConfigBuilder {
        ClientConfig::builder()
            .base_url(self.base_url())
            .api_key(TEST_API_KEY)
    }

    pub fn client(&self, plan: Plan) -> BankCodeClient {
        BankCodeClient::new(self.config().plan(plan).build()).unwrap()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn handle(State(state): State<MockState>, uri: Uri, headers: HeaderMap) -> Response {
    let query = reqwest::Url::parse(&format!("http://mock{uri}"))
        .map(|url| url.query_pairs().into_owned().collect())
        .unwrap_or_default();

    let request = RecordedRequest {
        path: uri.path().to_string(),
        query,
        headers,
        received_at: Instant::now(),
    };
    let response = (state.responder)(&request);
    state.requests.lock().push(request);

    if let Some(delay) = response.delay {
        tokio::time::sleep(delay).await;
    }

    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Body::from(response.body),
    )
        .into_response()
}

/// Keeps only the comma-separated `fields` of a JSON object, the way the
/// API applies field projection.
pub(crate) fn project(value: serde_json::Value, fields: Option<&str>) -> serde_json::Value {
    match (fields, value) {
        (Some(fields), serde_json::Value::Object(map)) => {
            let wanted: Vec<&str> = fields.split(',').collect();
            map.into_iter()
                .filter(|(key, _)| wanted.contains(&key.as_str()))
                .collect::<serde_json::Map<_, _>>()
                .into()
        }
        (_, value) => value,
    }
}

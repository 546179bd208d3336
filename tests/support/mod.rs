//! A stand-in for the hosted content store query endpoint.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use url::Url;

use vgwritings::config::{ContentBackend, ContentSettings};
use vgwritings::infra::content::SanityClient;

pub const QUERY_PATH: &str = "/v2024-01-01/data/query/production";

type Responder = Arc<dyn Fn(&HashMap<String, String>) -> (StatusCode, String) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct RecordedQuery {
    pub params: HashMap<String, String>,
    pub authorization: Option<String>,
}

#[derive(Clone)]
struct StubState {
    responder: Responder,
    log: Arc<Mutex<Vec<RecordedQuery>>>,
}

pub struct StubStore {
    pub base_url: Url,
    log: Arc<Mutex<Vec<RecordedQuery>>>,
}

impl StubStore {
    /// Serve `responder` on an ephemeral local port.
    pub async fn spawn<F>(responder: F) -> Self
    where
        F: Fn(&HashMap<String, String>) -> (StatusCode, String) + Send + Sync + 'static,
    {
        let log = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            responder: Arc::new(responder),
            log: Arc::clone(&log),
        };
        let app = Router::new()
            .route(QUERY_PATH, get(answer))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub store");
        let addr = listener.local_addr().expect("stub store address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub store");
        });

        Self {
            base_url: Url::parse(&format!("http://{addr}/")).expect("stub url"),
            log,
        }
    }

    /// Always answer with `status` and `body`.
    pub async fn fixed(status: StatusCode, body: impl Into<String>) -> Self {
        let body = body.into();
        Self::spawn(move |_| (status, body.clone())).await
    }

    pub fn requests(&self) -> Vec<RecordedQuery> {
        self.log.lock().expect("request log").clone()
    }

    pub fn client(&self, token: Option<&str>) -> SanityClient {
        SanityClient::new(&ContentSettings {
            backend: ContentBackend::Sanity,
            project_id: Some("abc123".into()),
            dataset: "production".into(),
            api_version: "2024-01-01".into(),
            use_cdn: false,
            token: token.map(str::to_string),
            api_host: Some(self.base_url.clone()),
            dataset_path: PathBuf::from("unused.json"),
            timeout: Duration::from_secs(5),
        })
        .expect("client should build")
    }
}

async fn answer(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let (status, body) = (state.responder)(&params);
    state.log.lock().expect("request log").push(RecordedQuery {
        params,
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    });
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

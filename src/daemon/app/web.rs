use std::io::Error as IoError;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::daemon::cache::{FetchError, OfflineCache};
use crate::domain::daemon::inbound::QueryResponse;
use crate::domain::daemon::outbound::ClockPort;
use crate::domain::daemon::ApplicationCore;
use crate::tracing_report;

/// Shared state of every HTTP handler.
#[derive(Clone)]
pub struct WebState {
    pub core: Arc<ApplicationCore>,
    pub cache: Arc<OfflineCache>,
    pub clock: Arc<dyn ClockPort>,
}

/// Body of `GET /api/countdown`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountdownBody {
    pub state: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub progress: f64,
    pub remaining_seconds: u64,
    pub label: String,
    pub blink: bool,
    pub expired: bool,
}

impl From<QueryResponse> for CountdownBody {
    fn from(value: QueryResponse) -> Self {
        Self {
            state: value.state,
            start: value.start,
            end: value.end,
            progress: value.progress,
            remaining_seconds: value.remaining.as_secs(),
            label: value.label,
            blink: value.blink,
            expired: value.expired,
        }
    }
}

/// Body of `PUT /api/countdown`. The countdown starts when the request is
/// handled.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetBody {
    pub end: DateTime<Utc>,
}

/// Create the HTTP router with the countdown API and the cached assets.
pub fn create_router(state: WebState) -> Router {
    Router::new()
        .route(
            "/api/countdown",
            get(query_handler).put(set_handler).delete(clear_handler),
        )
        .fallback(asset_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `router` on `address` until the listener fails.
///
/// # Errors
///
/// This function will return an error if binding or serving fails.
pub async fn serve(address: SocketAddr, router: Router) -> Result<(), WebError> {
    let listener = TcpListener::bind(address)
        .await
        .context(BindSnafu { address })?;
    tracing::info!(%address, "Serving web page");
    axum::serve(listener, router).await.context(ServeSnafu)
}

async fn query_handler(State(state): State<WebState>) -> Json<CountdownBody> {
    Json(state.core.query.query().await.into())
}

async fn set_handler(State(state): State<WebState>, Json(body): Json<SetBody>) -> StatusCode {
    state.core.set.set(state.clock.now(), body.end).await;
    StatusCode::NO_CONTENT
}

async fn clear_handler(State(state): State<WebState>) -> StatusCode {
    state.core.clear.clear().await;
    StatusCode::NO_CONTENT
}

async fn asset_handler(State(state): State<WebState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    match state.cache.fetch(uri.path()).await {
        Ok(asset) => ([(header::CONTENT_TYPE, asset.content_type)], asset.body).into_response(),
        Err(FetchError::NotFound { .. }) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            tracing_report!(err, path = uri.path(), "Could not fetch asset");
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

/// An error type of the web front.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum WebError {
    #[snafu(display("Could not bind to {address}"))]
    Bind {
        address: SocketAddr,
        source: IoError,
    },
    #[snafu(display("Could not serve HTTP requests"))]
    Serve { source: IoError },
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_fs::TempDir;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::TimeZone;
    use tokio::time::Duration;
    use tower::ServiceExt;

    use crate::daemon::cache::{Asset, CacheStorage, MockFetch};
    use crate::domain::daemon::inbound::{MockClearPort, MockQueryPort, MockSetPort, MockStopPort};

    struct FixedClock;

    impl ClockPort for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
        }
    }

    #[tokio::test]
    async fn web_query() {
        let mut query = MockQueryPort::new();
        query.expect_query().returning(|| QueryResponse {
            state: "Running".to_owned(),
            start: Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()),
            end: Some(Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap()),
            progress: 50.0,
            remaining: Duration::from_secs(1800),
            label: "30 min".to_owned(),
            blink: true,
            expired: false,
        });
        let (router, _tmp) = new_router(
            MockSetPort::new(),
            MockClearPort::new(),
            query,
            MockFetch::new(),
        );

        let response = router
            .oneshot(Request::get("/api/countdown").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: CountdownBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.state, "Running");
        assert_eq!(body.remaining_seconds, 1800);
        assert_eq!(body.label, "30 min");
    }

    #[tokio::test]
    async fn web_set() {
        let mut set = MockSetPort::new();
        set.expect_set()
            .withf(|start, end| {
                *start == Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
                    && *end == Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
            })
            .times(1)
            .return_const(());
        let (router, _tmp) = new_router(
            set,
            MockClearPort::new(),
            MockQueryPort::new(),
            MockFetch::new(),
        );

        let request = Request::put("/api/countdown")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"end":"2024-05-01T14:00:00+02:00"}"#))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn web_set_bad_body() {
        let mut set = MockSetPort::new();
        set.expect_set().never();
        let (router, _tmp) = new_router(
            set,
            MockClearPort::new(),
            MockQueryPort::new(),
            MockFetch::new(),
        );

        let request = Request::put("/api/countdown")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"end":"tomorrow"}"#))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn web_clear() {
        let mut clear = MockClearPort::new();
        clear.expect_clear().times(1).return_const(());
        let (router, _tmp) = new_router(
            MockSetPort::new(),
            clear,
            MockQueryPort::new(),
            MockFetch::new(),
        );

        let response = router
            .oneshot(Request::delete("/api/countdown").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn web_assets() {
        let mut origin = MockFetch::new();
        origin.expect_fetch().returning(|path| match path {
            "/main.js" => Ok(Asset::new("text/javascript", "tick()")),
            "/down" => snafu::whatever!("origin unreachable"),
            _ => Err(FetchError::NotFound {
                path: path.to_owned(),
            }),
        });
        let (router, _tmp) = new_router(
            MockSetPort::new(),
            MockClearPort::new(),
            MockQueryPort::new(),
            origin,
        );

        let response = router
            .clone()
            .oneshot(Request::get("/main.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/javascript"
        );

        let response = router
            .clone()
            .oneshot(Request::get("/nothing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = router
            .clone()
            .oneshot(Request::get("/down").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = router
            .oneshot(Request::post("/main.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    fn new_router(
        set: MockSetPort,
        clear: MockClearPort,
        query: MockQueryPort,
        origin: MockFetch,
    ) -> (Router, TempDir) {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let core = ApplicationCore {
            set: Arc::new(set),
            clear: Arc::new(clear),
            query: Arc::new(query),
            stop: Arc::new(MockStopPort::new()),
        };
        let cache = OfflineCache::new(
            CacheStorage::open(tmp.path(), "countdown-pwa"),
            Arc::new(origin),
        );
        let state = WebState {
            core: Arc::new(core),
            cache: Arc::new(cache),
            clock: Arc::new(FixedClock),
        };
        (create_router(state), tmp)
    }
}

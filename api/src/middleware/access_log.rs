use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service, ServiceExt};

const LOGGED_PREFIX: &str = "/api/";

/// Tower Layer for access logging.
///
/// Emits one structured `tracing` event per `/api/` request with method,
/// path, status and latency. Request and response bodies are never read.
#[derive(Clone, Default)]
pub struct AccessLogLayer;

impl AccessLogLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for AccessLogLayer {
    type Service = AccessLogService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AccessLogService { inner }
    }
}

#[derive(Clone)]
pub struct AccessLogService<S> {
    inner: S,
}

impl<S> Service<Request> for AccessLogService<S>
where
    S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let not_ready = self.inner.clone();
        let ready = std::mem::replace(&mut self.inner, not_ready);

        Box::pin(async move {
            let path = req.uri().path().to_owned();
            if !is_logged_path(&path) {
                return Ok(ready.oneshot(req).await.into_response());
            }

            let start = Instant::now();
            let method = req.method().to_string();
            let response = ready.oneshot(req).await.into_response();
            let status = response.status().as_u16();
            let response_time_ms = start.elapsed().as_millis().min(u128::from(u64::MAX)) as u64;

            if response.status().is_server_error() {
                tracing::warn!(method = %method, path = %path, status, response_time_ms, "api access");
            } else {
                tracing::info!(method = %method, path = %path, status, response_time_ms, "api access");
            }

            Ok(response)
        })
    }
}

fn is_logged_path(path: &str) -> bool {
    path.starts_with(LOGGED_PREFIX)
}

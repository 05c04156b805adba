use crate::domain::{
    CancellationToken, HttpRequest, RawResponse, SearchContext, SearchTransport, TransportError,
};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tokio::runtime::Builder;
use tracing::debug;

/// How often a cancellable request checks its token
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// HTTP transport driven on a short-lived single-threaded runtime.
/// Building it performs no network I/O and sets no request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        // Idle connections would outlive the runtime that drives them
        let client = Client::builder().pool_max_idle_per_host(0).build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl SearchTransport for HttpTransport {
    fn perform(
        &self,
        ctx: &SearchContext,
        request: &HttpRequest,
    ) -> Result<RawResponse, TransportError> {
        if ctx.is_cancelled() {
            return Err(TransportError::Cancelled);
        }
        if ctx.is_expired() {
            return Err(TransportError::DeadlineExceeded);
        }

        let runtime = Builder::new_current_thread().enable_all().build()?;
        let timeout = ctx.remaining();

        let outcome = runtime.block_on(async {
            let sending = send(&self.client, request, timeout);
            match ctx.cancellation() {
                Some(token) => tokio::select! {
                    result = sending => result,
                    _ = cancelled(token) => {
                        debug!(url = %request.url, "Requisição cancelada pelo chamador");
                        Err(TransportError::Cancelled)
                    }
                },
                None => sending.await,
            }
        });

        // Drops the connection task of an aborted request, closing its socket
        runtime.shutdown_background();
        outcome
    }
}

async fn cancelled(token: &CancellationToken) {
    let mut ticks = tokio::time::interval(CANCEL_POLL_INTERVAL);
    while !token.is_cancelled() {
        ticks.tick().await;
    }
}

async fn send(
    client: &Client,
    request: &HttpRequest,
    timeout: Option<Duration>,
) -> Result<RawResponse, TransportError> {
    let method = reqwest::Method::from_bytes(request.method.as_bytes())
        .unwrap_or(reqwest::Method::POST);

    let mut builder = client
        .request(method, &request.url)
        .header(CONTENT_TYPE, "application/json")
        .body(request.body.clone());
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    let response = builder.send().await.map_err(|e| classify(e, timeout))?;
    let status = response.status().as_u16();
    // Draining the body releases the connection on every path
    let body = response.bytes().await.map_err(|e| classify(e, timeout))?;

    Ok(RawResponse::new(status, body.to_vec()))
}

fn classify(error: reqwest::Error, timeout: Option<Duration>) -> TransportError {
    if timeout.is_some() && error.is_timeout() {
        TransportError::DeadlineExceeded
    } else {
        TransportError::Http(error)
    }
}

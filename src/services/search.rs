use super::client::{ClientBuilder, SearchClient};
use super::resolver::AddressResolver;
use crate::domain::{
    DecodeError, HttpRequest, RawResponse, ResolvedAddress, SearchContext, SearchError,
    SearchResult, took, total_hits,
};
use crate::infra::config::ELASTICSEARCH_SERVICE;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Runs the `Search` operation against one named service.
///
/// Every call resolves the service address again and builds a fresh client:
/// published ports change whenever the container is recreated.
#[derive(Debug, Clone)]
pub struct SearchService {
    service: String,
    resolver: AddressResolver,
    builder: Arc<dyn ClientBuilder>,
}

impl SearchService {
    pub fn new(
        service: impl Into<String>,
        resolver: AddressResolver,
        builder: Arc<dyn ClientBuilder>,
    ) -> Self {
        Self {
            service: service.into(),
            resolver,
            builder,
        }
    }

    pub fn elasticsearch(resolver: AddressResolver, builder: Arc<dyn ClientBuilder>) -> Self {
        Self::new(ELASTICSEARCH_SERVICE, resolver, builder)
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn resolve(&self) -> Result<ResolvedAddress, SearchError> {
        self.resolver.resolve(&self.service)
    }

    pub fn search<Q>(&self, index: &str, query: &Q) -> Result<SearchResult, SearchError>
    where
        Q: Serialize + ?Sized,
    {
        self.search_with_context(&SearchContext::background(), index, query)
    }

    pub fn search_with_context<Q>(
        &self,
        ctx: &SearchContext,
        index: &str,
        query: &Q,
    ) -> Result<SearchResult, SearchError>
    where
        Q: Serialize + ?Sized,
    {
        let address = self.resolve()?;
        let client = self.builder.build(&address).inspect_err(|e| {
            error!(service = %self.service, address = %address, error = %e, "Erro ao criar cliente do Elasticsearch");
        })?;

        execute_search(&client, ctx, index, query)
    }
}

/// Encodes `query`, submits it to `index` and normalizes the reply.
pub fn execute_search<Q>(
    client: &SearchClient,
    ctx: &SearchContext,
    index: &str,
    query: &Q,
) -> Result<SearchResult, SearchError>
where
    Q: Serialize + ?Sized,
{
    let body = serde_json::to_vec(query).map_err(|e| {
        error!(index, error = %e, "Erro ao codificar consulta do Elasticsearch");
        SearchError::Encode(e)
    })?;

    debug!(index, query = %String::from_utf8_lossy(&body), "Consulta ao Elasticsearch");

    let request = HttpRequest {
        method: "POST",
        url: client.search_url(index),
        body,
    };

    let response = client.send(ctx, &request).map_err(|e| {
        error!(index, url = %request.url, error = %e, "Erro ao obter resposta do Elasticsearch");
        SearchError::Transport(e)
    })?;

    normalize_response(response)
}

/// Maps a raw reply to a result or to the error it describes.
///
/// An undecodable body is a `Decode` error whatever the status says; only a
/// well-formed error body yields `Structured`.
pub fn normalize_response(response: RawResponse) -> Result<SearchResult, SearchError> {
    let status = response.status_text();

    let body = match decode_body(&response.body) {
        Ok(body) => body,
        Err(e) => {
            if response.is_error() {
                error!(status = %status, error = %e, "Erro ao interpretar corpo de erro do Elasticsearch");
            } else {
                error!(status = %status, error = %e, "Erro ao interpretar corpo da resposta do Elasticsearch");
            }
            return Err(SearchError::Decode(e));
        }
    };

    if response.is_error() {
        let (error_type, reason) = error_details(&body);
        error!(
            status = %status,
            error_type = %error_type,
            reason = %reason,
            "Erro ao obter resposta do Elasticsearch"
        );
        return Err(SearchError::Structured {
            status,
            error_type,
            reason,
        });
    }

    let diagnostics = ResponseDiagnostics::from_body(response.status, &body);
    info!(
        status = %status,
        hits = ?diagnostics.total_hits,
        took = ?diagnostics.took,
        "Informações da resposta"
    );

    Ok(SearchResult::new(body))
}

fn decode_body(bytes: &[u8]) -> Result<Map<String, Value>, DecodeError> {
    match serde_json::from_slice(bytes)? {
        Value::Object(body) => Ok(body),
        other => Err(DecodeError::NotAnObject(kind_of(&other))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

const UNKNOWN_ERROR_TYPE: &str = "unknown";

/// `(error.type, error.reason)` of an error body. Some endpoints reply with
/// `"error": "<message>"`; that message becomes the reason.
pub fn error_details(body: &Map<String, Value>) -> (String, String) {
    match body.get("error") {
        Some(Value::Object(error)) => (
            error
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or(UNKNOWN_ERROR_TYPE)
                .to_string(),
            error
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        ),
        Some(Value::String(message)) => (UNKNOWN_ERROR_TYPE.to_string(), message.clone()),
        _ => (UNKNOWN_ERROR_TYPE.to_string(), String::new()),
    }
}

/// Best-effort facts reported for every successful search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseDiagnostics {
    pub status: u16,
    pub total_hits: Option<u64>,
    pub took: Option<u64>,
}

impl ResponseDiagnostics {
    pub fn from_body(status: u16, body: &Map<String, Value>) -> Self {
        Self {
            status,
            total_hits: total_hits(body),
            took: took(body),
        }
    }
}

use super::{ContainerMetadata, SearchContext, ServiceConfig, TransportError};
use anyhow::Result;
use std::fmt::Debug;

/// Source of static service descriptors
pub trait ServiceCatalog: Send + Sync + Debug {
    /// Returns `None` when no service with that name is configured
    fn service_config(&self, name: &str) -> Option<ServiceConfig>;
}

/// Trait for container runtime inspection
pub trait ContainerInspector: Send + Sync + Debug {
    /// Get the live metadata (notably port bindings) of a container
    fn inspect(&self, container: &str) -> Result<ContainerMetadata>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: &'static str,
    pub url: String,
    pub body: Vec<u8>,
}

/// Response with its body already drained from the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Anything outside 2xx counts as an error response
    pub fn is_error(&self) -> bool {
        !(200..300).contains(&self.status)
    }

    /// Status line as `<code> <reason>`, e.g. `404 Not Found`
    pub fn status_text(&self) -> String {
        match reqwest::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|code| code.canonical_reason())
        {
            Some(reason) => format!("{} {}", self.status, reason),
            None => self.status.to_string(),
        }
    }
}

/// Single request/response exchange with the search service
pub trait SearchTransport: Send + Sync + Debug {
    fn perform(
        &self,
        ctx: &SearchContext,
        request: &HttpRequest,
    ) -> std::result::Result<RawResponse, TransportError>;
}

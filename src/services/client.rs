use crate::domain::{
    HttpRequest, RawResponse, ResolvedAddress, SearchContext, SearchError, SearchTransport,
    TransportError,
};
use crate::infra::HttpTransport;
use std::fmt::Debug;
use std::sync::Arc;

/// Client bound to one resolved service address
#[derive(Debug, Clone)]
pub struct SearchClient {
    base_url: String,
    transport: Arc<dyn SearchTransport>,
}

impl SearchClient {
    pub fn new(address: &ResolvedAddress, transport: Arc<dyn SearchTransport>) -> Self {
        Self {
            base_url: address.url(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `<base>/<index>/_search?track_total_hits=true&pretty`. An empty index
    /// searches every index.
    pub fn search_url(&self, index: &str) -> String {
        let index = index.trim_matches('/');
        if index.is_empty() {
            format!("{}/_search?track_total_hits=true&pretty", self.base_url)
        } else {
            format!(
                "{}/{}/_search?track_total_hits=true&pretty",
                self.base_url, index
            )
        }
    }

    pub fn send(
        &self,
        ctx: &SearchContext,
        request: &HttpRequest,
    ) -> Result<RawResponse, TransportError> {
        self.transport.perform(ctx, request)
    }
}

/// Builds clients for resolved addresses. Never touches the network.
pub trait ClientBuilder: Send + Sync + Debug {
    fn build(&self, address: &ResolvedAddress) -> Result<SearchClient, SearchError>;
}

/// Default builder: one HTTP transport per client
#[derive(Debug, Default, Clone)]
pub struct HttpClientBuilder;

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self
    }
}

impl ClientBuilder for HttpClientBuilder {
    fn build(&self, address: &ResolvedAddress) -> Result<SearchClient, SearchError> {
        validate_address(address)?;
        let transport = HttpTransport::new()?;
        Ok(SearchClient::new(address, Arc::new(transport)))
    }
}

pub(crate) fn validate_address(address: &ResolvedAddress) -> Result<(), SearchError> {
    if address.host.trim().is_empty() {
        return Err(SearchError::InvalidAddress(format!(
            "host vazio (porta {})",
            address.port
        )));
    }
    if address.port == 0 {
        return Err(SearchError::InvalidAddress(format!(
            "porta 0 para host {}",
            address.host
        )));
    }
    Ok(())
}

mod context;
mod error;
mod search;
mod service;
pub mod traits;

pub use context::{CancellationToken, SearchContext};
pub use error::{DecodeError, SearchError, TransportError};
pub use search::{Query, SearchResult, took, total_hits};
pub use service::{
    ContainerMetadata, ContainerPortBinding, LOOPBACK_HOST, PortBindings, ResolvedAddress,
    ServiceConfig,
};
pub use traits::{ContainerInspector, HttpRequest, RawResponse, SearchTransport, ServiceCatalog};

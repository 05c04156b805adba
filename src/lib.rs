pub mod cli;
pub mod domain;
pub mod infra;
pub mod logging;
pub mod services;

// Fakes for the container runtime and the search service, shared with
// integration tests
pub mod test_support;

pub use domain::{
    CancellationToken, Query, ResolvedAddress, SearchContext, SearchError, SearchResult,
    ServiceConfig,
};
pub use infra::{AppConfig, CliInspector, HttpTransport};
pub use services::{AddressResolver, ClientBuilder, HttpClientBuilder, SearchService};

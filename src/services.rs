mod client;
mod resolver;
mod search;

pub use client::{ClientBuilder, HttpClientBuilder, SearchClient};
pub use resolver::AddressResolver;
pub use search::{
    ResponseDiagnostics, SearchService, error_details, execute_search, normalize_response,
};

pub mod config;
pub mod http_transport;
pub mod runtime_adapter;
pub mod shell;

pub use config::AppConfig;
pub use http_transport::HttpTransport;
pub use runtime_adapter::CliInspector;

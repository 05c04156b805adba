use crate::domain::ContainerInspector;
use crate::infra::CliInspector;
use crate::infra::config::{AppConfig, load_app_config};
use crate::services::{AddressResolver, ClientBuilder, HttpClientBuilder, SearchService};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Wires configuration, container inspection and HTTP clients together
pub struct Harness {
    config_dir: PathBuf,
    config: Arc<AppConfig>,
    resolver: AddressResolver,
    builder: Arc<dyn ClientBuilder>,
}

impl Harness {
    pub fn new(config_dir: &Path) -> Result<Self> {
        let config = load_app_config(config_dir)?;
        let inspector = Arc::new(CliInspector::new(config.runtime_binary()));
        Ok(Self::with_parts(
            config_dir,
            config,
            inspector,
            Arc::new(HttpClientBuilder::new()),
        ))
    }

    pub fn with_parts(
        config_dir: &Path,
        config: AppConfig,
        inspector: Arc<dyn ContainerInspector>,
        builder: Arc<dyn ClientBuilder>,
    ) -> Self {
        let config = Arc::new(config);
        let resolver = AddressResolver::new(config.clone(), inspector);
        Self {
            config_dir: config_dir.to_path_buf(),
            config,
            resolver,
            builder,
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn resolver(&self) -> &AddressResolver {
        &self.resolver
    }

    pub fn search_service(&self, service: &str) -> SearchService {
        SearchService::new(service, self.resolver.clone(), self.builder.clone())
    }
}

use crate::domain::{
    ContainerInspector, ContainerMetadata, ContainerPortBinding, HttpRequest, PortBindings,
    RawResponse, ResolvedAddress, SearchContext, SearchError, SearchTransport, ServiceCatalog,
    ServiceConfig, TransportError,
};
use crate::services::{ClientBuilder, SearchClient};
use anyhow::{Result, bail};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, RwLock};

/// In-memory service catalog
#[derive(Debug, Default, Clone)]
pub struct StaticCatalog {
    services: HashMap<String, ServiceConfig>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, service: ServiceConfig) -> Self {
        self.services.insert(service.name.clone(), service);
        self
    }
}

impl ServiceCatalog for StaticCatalog {
    fn service_config(&self, name: &str) -> Option<ServiceConfig> {
        self.services.get(name).cloned()
    }
}

/// Container inspector backed by a map of fake containers
#[derive(Debug)]
pub struct FakeInspector {
    containers: RwLock<HashMap<String, PortBindings>>,
    commands: RwLock<Vec<String>>,
    fail_on: RwLock<Option<String>>,
}

impl FakeInspector {
    pub fn new() -> Self {
        Self {
            containers: RwLock::new(HashMap::new()),
            commands: RwLock::new(Vec::new()),
            fail_on: RwLock::new(None),
        }
    }

    pub fn add_container(&self, name: &str, ports: PortBindings) {
        self.containers
            .write()
            .unwrap()
            .insert(name.to_string(), ports);
    }

    /// Publishes `port_key` of `container` on a single host port
    pub fn bind(&self, container: &str, port_key: &str, host_port: &str) {
        self.containers
            .write()
            .unwrap()
            .entry(container.to_string())
            .or_default()
            .insert(port_key, vec![ContainerPortBinding::new("0.0.0.0", host_port)]);
    }

    pub fn unbind(&self, container: &str, port_key: &str) {
        if let Some(ports) = self.containers.write().unwrap().get_mut(container) {
            ports.insert(port_key, Vec::new());
        }
    }

    pub fn set_fail_on(&self, operation: &str) {
        *self.fail_on.write().unwrap() = Some(operation.to_string());
    }

    pub fn get_commands(&self) -> Vec<String> {
        self.commands.read().unwrap().clone()
    }

    fn record_command(&self, cmd: &str) {
        self.commands.write().unwrap().push(cmd.to_string());
    }

    fn check_fail(&self, operation: &str) -> Result<()> {
        if let Some(ref fail_on) = *self.fail_on.read().unwrap() {
            if fail_on == operation {
                bail!("Mock failure on: {}", operation);
            }
        }
        Ok(())
    }
}

impl Default for FakeInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerInspector for FakeInspector {
    fn inspect(&self, container: &str) -> Result<ContainerMetadata> {
        self.record_command(&format!("inspect:{}", container));
        self.check_fail("inspect")?;

        let Some(ports) = self.containers.read().unwrap().get(container).cloned() else {
            bail!("Error: no such container {}", container);
        };

        Ok(ContainerMetadata::new(container, ports))
    }
}

/// Transport replaying queued replies and recording every request
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<std::result::Result<RawResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: RawResponse) {
        self.replies.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_error(&self, error: TransportError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl SearchTransport for ScriptedTransport {
    fn perform(
        &self,
        ctx: &SearchContext,
        request: &HttpRequest,
    ) -> std::result::Result<RawResponse, TransportError> {
        if ctx.is_cancelled() {
            return Err(TransportError::Cancelled);
        }
        if ctx.is_expired() {
            return Err(TransportError::DeadlineExceeded);
        }

        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Io(std::io::Error::other(
                    "nenhuma resposta programada",
                )))
            })
    }
}

/// Builds clients that all share one scripted transport
#[derive(Debug, Clone)]
pub struct FakeClientBuilder {
    transport: Arc<ScriptedTransport>,
    built: Arc<Mutex<Vec<ResolvedAddress>>>,
}

impl FakeClientBuilder {
    pub fn new(transport: Arc<ScriptedTransport>) -> Self {
        Self {
            transport,
            built: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Addresses clients were built for, in order
    pub fn built(&self) -> Vec<ResolvedAddress> {
        self.built.lock().unwrap().clone()
    }
}

impl ClientBuilder for FakeClientBuilder {
    fn build(&self, address: &ResolvedAddress) -> std::result::Result<SearchClient, SearchError> {
        self.built.lock().unwrap().push(address.clone());
        Ok(SearchClient::new(address, self.transport.clone()))
    }
}

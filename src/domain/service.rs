use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// Host used when a service does not override it. Published container
/// ports are reachable on the loopback interface of the machine running the
/// container runtime.
pub const LOOPBACK_HOST: &str = "localhost";

const DEFAULT_PROTOCOL: &str = "tcp";

/// Static descriptor of a service under test, as read from `eod.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServiceConfig {
    #[serde(skip)]
    pub name: String,
    /// Port the service listens on inside its container.
    pub port: u16,
    #[serde(default)]
    pub container_name: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl ServiceConfig {
    pub fn new(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            port,
            container_name: None,
            host: None,
            protocol: None,
            image: None,
        }
    }

    pub fn with_name(mut self, name: String) -> Self {
        self.name = name;
        self
    }

    pub fn with_container_name(mut self, container_name: impl Into<String>) -> Self {
        self.container_name = Some(container_name.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Name of the running container backing this service
    pub fn container_name(&self) -> &str {
        self.container_name.as_deref().unwrap_or(&self.name)
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(LOOPBACK_HOST)
    }

    /// Key under which the runtime reports bindings for the declared port,
    /// e.g. `9200/tcp`.
    pub fn port_key(&self) -> String {
        format!(
            "{}/{}",
            self.port,
            self.protocol.as_deref().unwrap_or(DEFAULT_PROTOCOL)
        )
    }
}

/// One host-side exposure of a container port.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ContainerPortBinding {
    #[serde(rename = "HostIp", default)]
    pub host_ip: String,
    #[serde(rename = "HostPort")]
    pub host_port: String,
}

impl ContainerPortBinding {
    pub fn new(host_ip: impl Into<String>, host_port: impl Into<String>) -> Self {
        Self {
            host_ip: host_ip.into(),
            host_port: host_port.into(),
        }
    }

    /// Host port as a number. `None` for empty, malformed or zero ports.
    pub fn port(&self) -> Option<u16> {
        self.host_port.trim().parse().ok().filter(|port| *port != 0)
    }
}

/// Live port bindings keyed by `<port>/<protocol>`.
///
/// Bindings keep the order reported by the runtime, so "first binding" is
/// deterministic for a given inspection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortBindings {
    bindings: HashMap<String, Vec<ContainerPortBinding>>,
}

impl PortBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, port_key: impl Into<String>, bindings: Vec<ContainerPortBinding>) {
        self.bindings.insert(port_key.into(), bindings);
    }

    pub fn with(mut self, port_key: impl Into<String>, bindings: Vec<ContainerPortBinding>) -> Self {
        self.insert(port_key, bindings);
        self
    }

    pub fn get(&self, port_key: &str) -> &[ContainerPortBinding] {
        self.bindings
            .get(port_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn first(&self, port_key: &str) -> Option<&ContainerPortBinding> {
        self.get(port_key).first()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.values().all(Vec::is_empty)
    }
}

impl FromIterator<(String, Vec<ContainerPortBinding>)> for PortBindings {
    fn from_iter<T: IntoIterator<Item = (String, Vec<ContainerPortBinding>)>>(iter: T) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}

/// Runtime metadata of a container, limited to what address resolution needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerMetadata {
    pub name: String,
    pub running: bool,
    pub ports: PortBindings,
}

impl ContainerMetadata {
    pub fn new(name: impl Into<String>, ports: PortBindings) -> Self {
        Self {
            name: name.into(),
            running: true,
            ports,
        }
    }
}

/// Reachable address of a service, valid only for the container instance it
/// was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAddress {
    pub host: String,
    pub port: u16,
}

impl ResolvedAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for ResolvedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

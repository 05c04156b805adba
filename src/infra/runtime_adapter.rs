use super::shell;
use crate::domain::{ContainerInspector, ContainerMetadata, ContainerPortBinding, PortBindings};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_RUNTIME_BINARY: &str = "docker";

/// Inspects containers through the runtime's CLI (`docker` or `podman`).
#[derive(Debug, Clone)]
pub struct CliInspector {
    binary: String,
}

impl CliInspector {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }
}

impl Default for CliInspector {
    fn default() -> Self {
        Self::new(DEFAULT_RUNTIME_BINARY)
    }
}

impl ContainerInspector for CliInspector {
    fn inspect(&self, container: &str) -> Result<ContainerMetadata> {
        let output = shell::execute(
            Path::new("."),
            &self.binary,
            ["container", "inspect", container],
        )
        .with_context(|| format!("inspecionando container {container}"))?;

        let metadata = parse_inspect_output(&output, container)?;
        debug!(
            container,
            running = metadata.running,
            "Container inspecionado"
        );

        Ok(metadata)
    }
}

#[derive(Debug, Deserialize)]
struct InspectEntry {
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "State", default)]
    state: Option<InspectState>,
    #[serde(rename = "NetworkSettings", default)]
    network_settings: Option<NetworkSettings>,
}

#[derive(Debug, Deserialize)]
struct InspectState {
    #[serde(rename = "Running", default)]
    running: bool,
}

#[derive(Debug, Deserialize)]
struct NetworkSettings {
    // Exposed but unpublished ports are reported as `null`
    #[serde(rename = "Ports", default)]
    ports: Option<HashMap<String, Option<Vec<ContainerPortBinding>>>>,
}

/// Parses the JSON array printed by `container inspect`.
pub fn parse_inspect_output(output: &str, container: &str) -> Result<ContainerMetadata> {
    let entries: Vec<InspectEntry> = serde_json::from_str(output)
        .with_context(|| format!("parse da inspeção do container {container}"))?;

    let Some(entry) = entries.into_iter().next() else {
        bail!("inspeção do container {container} não retornou resultados");
    };

    let name = match entry.name.trim_start_matches('/') {
        "" => container.to_string(),
        name => name.to_string(),
    };

    let ports: PortBindings = entry
        .network_settings
        .and_then(|settings| settings.ports)
        .unwrap_or_default()
        .into_iter()
        .map(|(key, bindings)| (key, bindings.unwrap_or_default()))
        .collect();

    Ok(ContainerMetadata {
        name,
        running: entry.state.map(|state| state.running).unwrap_or(false),
        ports,
    })
}

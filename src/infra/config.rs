use super::runtime_adapter::DEFAULT_RUNTIME_BINARY;
use crate::domain::{ServiceCatalog, ServiceConfig};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_EOD_TOML_NAME: &str = "eod.toml";
pub const DEFAULT_EOD_TOML: &str = include_str!("../../config/default_eod.toml");

/// Service every harness run expects to find
pub const ELASTICSEARCH_SERVICE: &str = "elasticsearch";
const ELASTICSEARCH_PORT: u16 = 9200;

pub fn default_config_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/root"))
        .join(".config/eod")
}

pub fn ensure_config_dir(config_dir: &Path) -> Result<()> {
    fs::create_dir_all(config_dir).with_context(|| format!("criando {:?}", config_dir))
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct RuntimeConfig {
    pub binary: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// Services defined inline as [services.NAME]
    #[serde(default)]
    pub services: Option<HashMap<String, ServiceConfig>>,
}

impl AppConfig {
    /// Merges another AppConfig into self.
    /// Values from `other` overwrite values in `self` if present.
    pub fn merge(&mut self, other: AppConfig) {
        if let Some(binary) = other.runtime.binary {
            self.runtime.binary = Some(binary);
        }

        if let Some(other_services) = other.services {
            match &mut self.services {
                Some(existing) => {
                    for (name, service) in other_services {
                        existing.insert(name, service);
                    }
                }
                None => {
                    self.services = Some(other_services);
                }
            }
        }
    }

    pub fn runtime_binary(&self) -> &str {
        self.runtime
            .binary
            .as_deref()
            .unwrap_or(DEFAULT_RUNTIME_BINARY)
    }

    /// Validates every service and returns them with their names filled in
    pub fn services(&self) -> Result<Vec<ServiceConfig>> {
        match &self.services {
            Some(services_map) => services_from_hashmap(services_map),
            None => Ok(Vec::new()),
        }
    }
}

impl ServiceCatalog for AppConfig {
    fn service_config(&self, name: &str) -> Option<ServiceConfig> {
        self.services
            .as_ref()?
            .get(name)
            .map(|service| service.clone().with_name(name.to_string()))
    }
}

fn services_from_hashmap(services_map: &HashMap<String, ServiceConfig>) -> Result<Vec<ServiceConfig>> {
    let mut services = Vec::new();

    for (name, service) in services_map {
        validate_service_name(name)?;

        if service.port == 0 {
            bail!("Serviço '{}' com porta inválida 0", name);
        }

        services.push(service.clone().with_name(name.clone()));
    }

    services.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(services)
}

fn validate_service_name(name: &str) -> Result<()> {
    let Some(first_char) = name.trim().chars().next() else {
        bail!("Nome de serviço vazio encontrado");
    };

    if !first_char.is_alphanumeric() {
        bail!("Nome de serviço '{}' deve começar com letra ou número", name);
    }

    if let Some(c) = name
        .chars()
        .find(|c| !c.is_alphanumeric() && *c != '_' && *c != '.' && *c != '-')
    {
        bail!("Nome de serviço '{}' contém caractere inválido '{}'", name, c);
    }

    Ok(())
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path).with_context(|| format!("lendo {:?}", path))?;
    toml::from_str(&content).with_context(|| format!("parse de {:?}", path))
}

/// Loads `<config_dir>/eod.toml` merged with `./eod.toml`
pub fn load_app_config(config_dir: &Path) -> Result<AppConfig> {
    load_app_config_from(config_dir, Path::new("."))
}

pub fn load_app_config_from(config_dir: &Path, local_dir: &Path) -> Result<AppConfig> {
    let mut app_config = AppConfig::default();

    let global_config_path = config_dir.join(DEFAULT_EOD_TOML_NAME);
    if global_config_path.exists() {
        debug!(path = ?global_config_path, "Carregando config global");
        app_config = read_config(&global_config_path)?;
    }

    let local_config_path = local_dir.join(DEFAULT_EOD_TOML_NAME);
    if local_config_path.exists() && local_config_path != global_config_path {
        debug!(path = ?local_config_path, "Carregando config local");
        app_config.merge(read_config(&local_config_path)?);
    }

    // Elasticsearch is always resolvable, even without any config file
    app_config
        .services
        .get_or_insert_with(HashMap::new)
        .entry(ELASTICSEARCH_SERVICE.to_string())
        .or_insert_with(|| ServiceConfig::new(ELASTICSEARCH_SERVICE, ELASTICSEARCH_PORT));

    app_config.services()?;

    Ok(app_config)
}

pub fn install_default_config(target_dir: &Path) -> Result<bool> {
    ensure_config_dir(target_dir)?;

    let target = target_dir.join(DEFAULT_EOD_TOML_NAME);
    if target.exists() {
        return Ok(false);
    }

    fs::write(&target, DEFAULT_EOD_TOML)
        .with_context(|| format!("escrevendo template em {:?}", target))?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_services_from_toml() {
        let toml = r#"
[runtime]
binary = "podman"

[services.elasticsearch]
port = 9200
container_name = "metricbeat_elasticsearch_1"

[services.kibana]
port = 5601
host = "127.0.0.1"
"#;

        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.runtime_binary(), "podman");

        let services = config.services().unwrap();
        assert_eq!(services.len(), 2);

        let es = config.service_config("elasticsearch").unwrap();
        assert_eq!(es.name, "elasticsearch");
        assert_eq!(es.port, 9200);
        assert_eq!(es.container_name(), "metricbeat_elasticsearch_1");

        let kibana = config.service_config("kibana").unwrap();
        assert_eq!(kibana.host(), "127.0.0.1");
        assert_eq!(kibana.container_name(), "kibana");
    }

    #[test]
    fn unknown_service_is_not_in_catalog() {
        let config = AppConfig::default();
        assert!(config.service_config("elasticsearch").is_none());
    }

    #[test]
    fn rejects_missing_port() {
        let toml = r#"
[services.elasticsearch]
container_name = "es"
"#;
        assert!(toml::from_str::<AppConfig>(toml).is_err());
    }

    #[test]
    fn validates_service_name() {
        let mut services_map = HashMap::new();
        services_map.insert("".to_string(), ServiceConfig::new("", 9200));
        assert!(services_from_hashmap(&services_map).is_err());

        let mut services_map = HashMap::new();
        services_map.insert("-es".to_string(), ServiceConfig::new("", 9200));
        assert!(services_from_hashmap(&services_map).is_err());

        let mut services_map = HashMap::new();
        services_map.insert("es/1".to_string(), ServiceConfig::new("", 9200));
        assert!(services_from_hashmap(&services_map).is_err());
    }

    #[test]
    fn rejects_port_zero() {
        let mut services_map = HashMap::new();
        services_map.insert("es".to_string(), ServiceConfig::new("", 0));
        assert!(services_from_hashmap(&services_map).is_err());
    }

    #[test]
    fn merges_configs() {
        let mut base: AppConfig = toml::from_str(
            r#"
[services.elasticsearch]
port = 9200
"#,
        )
        .unwrap();

        let local: AppConfig = toml::from_str(
            r#"
[runtime]
binary = "podman"

[services.elasticsearch]
port = 9201

[services.kibana]
port = 5601
"#,
        )
        .unwrap();

        base.merge(local);

        assert_eq!(base.runtime_binary(), "podman");
        assert_eq!(base.service_config("elasticsearch").unwrap().port, 9201);
        assert!(base.service_config("kibana").is_some());
    }

    #[test]
    fn load_without_files_provides_elasticsearch() {
        let global = tempfile::tempdir().unwrap();
        let local = tempfile::tempdir().unwrap();

        let config = load_app_config_from(global.path(), local.path()).unwrap();
        let es = config.service_config(ELASTICSEARCH_SERVICE).unwrap();

        assert_eq!(es.port, 9200);
        assert_eq!(config.runtime_binary(), DEFAULT_RUNTIME_BINARY);
    }

    #[test]
    fn local_config_overrides_global() {
        let global = tempfile::tempdir().unwrap();
        let local = tempfile::tempdir().unwrap();

        fs::write(
            global.path().join(DEFAULT_EOD_TOML_NAME),
            "[services.elasticsearch]\nport = 9200\ncontainer_name = \"global-es\"\n",
        )
        .unwrap();
        fs::write(
            local.path().join(DEFAULT_EOD_TOML_NAME),
            "[services.elasticsearch]\nport = 9200\ncontainer_name = \"local-es\"\n",
        )
        .unwrap();

        let config = load_app_config_from(global.path(), local.path()).unwrap();
        let es = config.service_config(ELASTICSEARCH_SERVICE).unwrap();
        assert_eq!(es.container_name(), "local-es");
    }

    #[test]
    fn load_reports_invalid_toml() {
        let global = tempfile::tempdir().unwrap();
        let local = tempfile::tempdir().unwrap();
        fs::write(global.path().join(DEFAULT_EOD_TOML_NAME), "[services.es\n").unwrap();

        assert!(load_app_config_from(global.path(), local.path()).is_err());
    }

    #[test]
    fn installs_default_config_once() {
        let dir = tempfile::tempdir().unwrap();
        let target_dir = dir.path().join("eod");

        assert!(install_default_config(&target_dir).unwrap());
        assert!(!install_default_config(&target_dir).unwrap());

        let content = fs::read_to_string(target_dir.join(DEFAULT_EOD_TOML_NAME)).unwrap();
        assert_eq!(content, DEFAULT_EOD_TOML);

        let config: AppConfig = toml::from_str(&content).unwrap();
        assert_eq!(config.service_config("elasticsearch").unwrap().port, 9200);
    }
}

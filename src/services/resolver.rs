use crate::domain::{ContainerInspector, ResolvedAddress, SearchError, ServiceCatalog};
use std::sync::Arc;
use tracing::{debug, error};

/// Turns a service name into the host address its container port is
/// currently published on.
#[derive(Debug, Clone)]
pub struct AddressResolver {
    catalog: Arc<dyn ServiceCatalog>,
    inspector: Arc<dyn ContainerInspector>,
}

impl AddressResolver {
    pub fn new(catalog: Arc<dyn ServiceCatalog>, inspector: Arc<dyn ContainerInspector>) -> Self {
        Self { catalog, inspector }
    }

    /// Resolves `service` against a fresh inspection of its container.
    ///
    /// When the declared port is published more than once (e.g. on IPv4 and
    /// IPv6), the first binding reported by the runtime wins.
    pub fn resolve(&self, service: &str) -> Result<ResolvedAddress, SearchError> {
        let Some(config) = self.catalog.service_config(service) else {
            error!(service, "Serviço não configurado");
            return Err(SearchError::ServiceNotConfigured(service.to_string()));
        };

        let container = config.container_name();
        let metadata = self.inspector.inspect(container).map_err(|e| {
            error!(service, container, error = %e, "Falha ao inspecionar container");
            SearchError::Inspection {
                container: container.to_string(),
                source: e,
            }
        })?;

        let port_key = config.port_key();
        let Some(host_port) = metadata.ports.first(&port_key).and_then(|b| b.port()) else {
            error!(
                service,
                container,
                port = %port_key,
                running = metadata.running,
                "Porta declarada não está publicada"
            );
            return Err(SearchError::PortNotBound {
                service: service.to_string(),
                port: config.port,
            });
        };

        let address = ResolvedAddress::new(config.host(), host_port);
        debug!(service, container, port = %port_key, address = %address, "Endereço resolvido");

        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContainerPortBinding, PortBindings, ServiceConfig};
    use crate::test_support::{FakeInspector, StaticCatalog};

    fn resolver_with(catalog: StaticCatalog) -> (AddressResolver, Arc<FakeInspector>) {
        let inspector = Arc::new(FakeInspector::new());
        let resolver = AddressResolver::new(Arc::new(catalog), inspector.clone());
        (resolver, inspector)
    }

    #[test]
    fn test_resolves_bound_port_on_loopback() {
        let (resolver, inspector) =
            resolver_with(StaticCatalog::new().with(ServiceConfig::new("elasticsearch", 9200)));
        inspector.bind("elasticsearch", "9200/tcp", "32768");

        let address = resolver.resolve("elasticsearch").unwrap();
        assert_eq!(address, ResolvedAddress::new("localhost", 32768));
    }

    #[test]
    fn test_unknown_service_skips_inspection() {
        let (resolver, inspector) = resolver_with(StaticCatalog::new());

        let err = resolver.resolve("kibana").unwrap_err();
        assert!(matches!(err, SearchError::ServiceNotConfigured(ref name) if name == "kibana"));
        assert!(inspector.get_commands().is_empty());
    }

    #[test]
    fn test_inspects_configured_container_name() {
        let (resolver, inspector) = resolver_with(StaticCatalog::new().with(
            ServiceConfig::new("elasticsearch", 9200).with_container_name("metricbeat_es_1"),
        ));
        inspector.bind("metricbeat_es_1", "9200/tcp", "40000");

        assert_eq!(resolver.resolve("elasticsearch").unwrap().port, 40000);
        assert_eq!(inspector.get_commands(), vec!["inspect:metricbeat_es_1"]);
    }

    #[test]
    fn test_missing_binding_is_port_not_bound() {
        let (resolver, inspector) =
            resolver_with(StaticCatalog::new().with(ServiceConfig::new("elasticsearch", 9200)));
        inspector.bind("elasticsearch", "9300/tcp", "32769");

        let err = resolver.resolve("elasticsearch").unwrap_err();
        assert!(matches!(
            err,
            SearchError::PortNotBound { ref service, port: 9200 } if service == "elasticsearch"
        ));
    }

    #[test]
    fn test_empty_binding_list_is_port_not_bound() {
        let (resolver, inspector) =
            resolver_with(StaticCatalog::new().with(ServiceConfig::new("elasticsearch", 9200)));
        inspector.add_container("elasticsearch", PortBindings::new().with("9200/tcp", vec![]));

        assert!(matches!(
            resolver.resolve("elasticsearch"),
            Err(SearchError::PortNotBound { .. })
        ));
    }

    #[test]
    fn test_unparseable_host_port_is_port_not_bound() {
        let (resolver, inspector) =
            resolver_with(StaticCatalog::new().with(ServiceConfig::new("elasticsearch", 9200)));
        inspector.bind("elasticsearch", "9200/tcp", "");

        assert!(matches!(
            resolver.resolve("elasticsearch"),
            Err(SearchError::PortNotBound { .. })
        ));
    }

    #[test]
    fn test_first_binding_wins() {
        // Multiple exposures of the same port: the first reported entry is
        // selected, even if a later one looks more suitable.
        let (resolver, inspector) =
            resolver_with(StaticCatalog::new().with(ServiceConfig::new("elasticsearch", 9200)));
        inspector.add_container(
            "elasticsearch",
            PortBindings::new().with(
                "9200/tcp",
                vec![
                    ContainerPortBinding::new("::", "32771"),
                    ContainerPortBinding::new("0.0.0.0", "32770"),
                ],
            ),
        );

        assert_eq!(resolver.resolve("elasticsearch").unwrap().port, 32771);
    }

    #[test]
    fn test_inspection_failure_is_reported() {
        let (resolver, inspector) =
            resolver_with(StaticCatalog::new().with(ServiceConfig::new("elasticsearch", 9200)));
        inspector.set_fail_on("inspect");

        let err = resolver.resolve("elasticsearch").unwrap_err();
        assert!(matches!(err, SearchError::Inspection { ref container, .. } if container == "elasticsearch"));
        assert!(err.is_infrastructure());
    }

    #[test]
    fn test_host_override() {
        let (resolver, inspector) = resolver_with(StaticCatalog::new().with(
            ServiceConfig::new("elasticsearch", 9200).with_host("192.168.64.2"),
        ));
        inspector.bind("elasticsearch", "9200/tcp", "32768");

        assert_eq!(
            resolver.resolve("elasticsearch").unwrap().url(),
            "http://192.168.64.2:32768"
        );
    }

    #[test]
    fn test_each_resolution_inspects_again() {
        let (resolver, inspector) =
            resolver_with(StaticCatalog::new().with(ServiceConfig::new("elasticsearch", 9200)));
        inspector.bind("elasticsearch", "9200/tcp", "32768");
        assert_eq!(resolver.resolve("elasticsearch").unwrap().port, 32768);

        // Container restarted on another port
        inspector.bind("elasticsearch", "9200/tcp", "32800");
        assert_eq!(resolver.resolve("elasticsearch").unwrap().port, 32800);
        assert_eq!(inspector.get_commands().len(), 2);
    }
}

//! Shared registry of validated endpoint topologies.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::catalog::ProcessingMode;
use crate::config::NegotiationConfig;
use crate::error::{RegistryError, TopologyError};
use crate::format::FormatRequest;
use crate::id::{EndpointId, PinId};
use crate::negotiate::{negotiate_with, NegotiationResult};
use crate::topology::{validate, TopologyGraph, ValidationReport};

/// Validated endpoint graphs, shared by every thread that negotiates formats.
///
/// Graphs are stored behind `Arc`, so lookups hold the lock only long enough
/// to clone a pointer. Negotiation itself never runs under the lock.
///
/// # Example
///
/// ```
/// use pin_caps::{
///     CapabilityCatalog, Communication, EndpointRegistry, FormatRequest, PinDirection,
///     PinTopology, ProcessingMode, TopologyGraph,
/// };
///
/// let catalog = CapabilityCatalog::from_tables(
///     &[(pin_caps::Encoding::Pcm, 2, 48000, 16, 16, 0x3)],
///     &[(pin_caps::Encoding::Pcm, 2, 2, 16, 16, 8000, 48000)],
///     &[(ProcessingMode::Raw, 0, true)],
/// )?;
/// let graph = TopologyGraph::builder()
///     .pin(PinTopology::streaming("host", PinDirection::Out, Communication::Sink, catalog))
///     .build()?;
///
/// let registry = EndpointRegistry::new();
/// registry.register("mic".into(), graph)?;
///
/// let result = registry.negotiate(&"mic".into(), &"host".into(), None, ProcessingMode::Speech)?;
/// assert_eq!(result.format().map(|f| f.sample_rate()), Some(48000));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    endpoints: RwLock<HashMap<EndpointId, Arc<TopologyGraph>>>,
    config: NegotiationConfig,
}

impl EndpointRegistry {
    /// Creates an empty registry with the default negotiation settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with custom negotiation settings.
    #[must_use]
    pub fn with_config(config: NegotiationConfig) -> Self {
        Self {
            endpoints: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// The negotiation settings used by [`EndpointRegistry::negotiate`].
    #[must_use]
    pub fn config(&self) -> &NegotiationConfig {
        &self.config
    }

    /// Validates a graph and stores it, replacing any graph under the same id.
    ///
    /// # Errors
    ///
    /// Returns the validation error; the registry is left unchanged.
    pub fn register(
        &self,
        endpoint: EndpointId,
        graph: TopologyGraph,
    ) -> Result<ValidationReport, TopologyError> {
        let report = validate(&graph)?;
        let previous = self
            .endpoints
            .write()
            .insert(endpoint.clone(), Arc::new(graph));

        if previous.is_some() {
            tracing::info!(%endpoint, pins = report.pins.len(), "endpoint replaced");
        } else {
            tracing::info!(%endpoint, pins = report.pins.len(), "endpoint registered");
        }
        Ok(report)
    }

    /// The graph registered under `endpoint`.
    #[must_use]
    pub fn get(&self, endpoint: &EndpointId) -> Option<Arc<TopologyGraph>> {
        self.endpoints.read().get(endpoint).cloned()
    }

    /// Removes an endpoint, returning its graph.
    pub fn remove(&self, endpoint: &EndpointId) -> Option<Arc<TopologyGraph>> {
        let removed = self.endpoints.write().remove(endpoint);
        if removed.is_some() {
            tracing::info!(%endpoint, "endpoint removed");
        }
        removed
    }

    /// Registered endpoint ids, sorted.
    #[must_use]
    pub fn endpoints(&self) -> Vec<EndpointId> {
        let mut ids: Vec<_> = self.endpoints.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of registered endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.read().len()
    }

    /// Returns true if no endpoint is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.read().is_empty()
    }

    /// Negotiates a format on one pin of a registered endpoint.
    ///
    /// # Errors
    ///
    /// Returns `UnknownEndpoint` or `UnknownPin` if the lookup fails, and
    /// `NotStreaming` for bridge pins. A rejected request is not an error; it
    /// comes back as [`NegotiationResult::Rejected`].
    pub fn negotiate(
        &self,
        endpoint: &EndpointId,
        pin: &PinId,
        request: Option<&FormatRequest>,
        mode: ProcessingMode,
    ) -> Result<NegotiationResult, RegistryError> {
        let graph = self
            .get(endpoint)
            .ok_or_else(|| RegistryError::UnknownEndpoint {
                endpoint: endpoint.to_string(),
            })?;
        let topology = graph.pin(pin).ok_or_else(|| RegistryError::UnknownPin {
            endpoint: endpoint.to_string(),
            pin: pin.to_string(),
        })?;
        let catalog = topology
            .catalog()
            .ok_or_else(|| RegistryError::NotStreaming {
                pin: pin.to_string(),
            })?;

        let result = negotiate_with(catalog, request, mode, &self.config);
        tracing::debug!(
            %endpoint,
            %pin,
            %mode,
            outcome = result.outcome(),
            "format negotiated"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CapabilityCatalog;
    use crate::config::ContainerPolicy;
    use crate::format::Encoding;
    use crate::topology::{Communication, PinDirection, PinTopology};
    use crate::Rejection;

    fn graph() -> TopologyGraph {
        let catalog = CapabilityCatalog::from_tables(
            &[(Encoding::Pcm, 2, 48000, 16, 16, 0x3)],
            &[(Encoding::Pcm, 2, 2, 8, 32, 8000, 96000)],
            &[(ProcessingMode::Raw, 0, true)],
        )
        .unwrap();
        TopologyGraph::builder()
            .pin(PinTopology::bridge("bridge", PinDirection::In))
            .pin(PinTopology::streaming(
                "host",
                PinDirection::Out,
                Communication::Sink,
                catalog,
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = EndpointRegistry::new();
        assert!(registry.is_empty());

        let report = registry.register("mic".into(), graph()).unwrap();
        assert_eq!(report.pins.len(), 2);
        assert_eq!(registry.len(), 1);
        assert!(registry.get(&"mic".into()).is_some());
    }

    #[test]
    fn test_register_replaces() {
        let registry = EndpointRegistry::new();
        registry.register("mic".into(), graph()).unwrap();
        registry.register("mic".into(), graph()).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_invalid_graph_is_not_stored() {
        let registry = EndpointRegistry::new();
        let empty = TopologyGraph::builder()
            .pin(PinTopology::streaming(
                "host",
                PinDirection::Out,
                Communication::Sink,
                CapabilityCatalog::new(),
            ))
            .build()
            .unwrap();

        assert!(registry.register("mic".into(), empty).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_endpoints_sorted_and_remove() {
        let registry = EndpointRegistry::new();
        registry.register("speaker".into(), graph()).unwrap();
        registry.register("mic".into(), graph()).unwrap();

        assert_eq!(
            registry.endpoints(),
            vec![EndpointId::new("mic"), EndpointId::new("speaker")]
        );
        assert!(registry.remove(&"mic".into()).is_some());
        assert!(registry.remove(&"mic".into()).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_negotiate_lookup_errors() {
        let registry = EndpointRegistry::new();
        registry.register("mic".into(), graph()).unwrap();

        assert_eq!(
            registry.negotiate(&"cam".into(), &"host".into(), None, ProcessingMode::Raw),
            Err(RegistryError::UnknownEndpoint {
                endpoint: "cam".to_string()
            })
        );
        assert_eq!(
            registry.negotiate(&"mic".into(), &"nope".into(), None, ProcessingMode::Raw),
            Err(RegistryError::UnknownPin {
                endpoint: "mic".to_string(),
                pin: "nope".to_string()
            })
        );
        assert_eq!(
            registry.negotiate(&"mic".into(), &"bridge".into(), None, ProcessingMode::Raw),
            Err(RegistryError::NotStreaming {
                pin: "bridge".to_string()
            })
        );
    }

    #[test]
    fn test_negotiate_uses_registry_config() {
        let registry = EndpointRegistry::with_config(NegotiationConfig {
            container_policy: ContainerPolicy::Reject,
            ..Default::default()
        });
        registry.register("mic".into(), graph()).unwrap();

        let request = FormatRequest::pcm(2, 48000, 20);
        let result = registry
            .negotiate(&"mic".into(), &"host".into(), Some(&request), ProcessingMode::Raw)
            .unwrap();
        assert_eq!(
            result,
            NegotiationResult::Rejected(Rejection::NonNaturalWidth { bits: 20 })
        );
    }
}

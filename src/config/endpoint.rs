//! TOML descriptions of an endpoint topology.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{CapabilityCatalog, DiscreteFormatRow, ModeRow, RangeRow};
use crate::error::ConfigError;
use crate::topology::{
    Communication, Connection, ConnectionEnd, ConnectionKind, Node, PinDirection, PinTopology,
    TopologyGraph,
};

/// One endpoint: its pins, processing nodes and connections.
///
/// # Example
///
/// ```
/// use pin_caps::{validate, EndpointConfig};
///
/// let config = EndpointConfig::from_toml_str(r#"
///     [[pins]]
///     id = "bridge"
///     direction = "in"
///     bridge = true
///
///     [[pins]]
///     id = "host"
///     direction = "out"
///     communication = "sink"
///     formats = [["pcm", 2, 48000, 16, 16, 3]]
///     ranges = [["pcm", 2, 2, 8, 32, 8000, 192000]]
///     modes = [["raw", 0, true]]
///
///     [[nodes]]
///     id = "adc"
///     kind = "adc"
///
///     [[connections]]
///     from = "bridge"
///     to = "adc:1"
///
///     [[connections]]
///     from = "adc:0"
///     to = "host"
/// "#)?;
///
/// let graph = config.build()?;
/// assert_eq!(validate(&graph)?.pins.len(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Filter pins.
    #[serde(default)]
    pub pins: Vec<PinConfig>,

    /// Processing nodes.
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,

    /// Connections between pins and node pins.
    #[serde(default)]
    pub connections: Vec<ConnectionConfig>,
}

/// One filter pin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinConfig {
    /// Unique pin id.
    pub id: String,

    /// Data flow direction.
    pub direction: PinDirection,

    /// Host communication type.
    #[serde(default)]
    pub communication: Communication,

    /// Minimum instance count (streaming default 1, bridge default 0).
    #[serde(default)]
    pub min_instances: Option<u32>,

    /// Maximum instance count (streaming default 1, bridge default 0).
    #[serde(default)]
    pub max_instances: Option<u32>,

    /// Analog bridge pin without a format catalog.
    #[serde(default)]
    pub bridge: bool,

    /// Discrete formats: `[encoding, channels, rate, bits, valid_bits, mask]`.
    #[serde(default)]
    pub formats: Vec<DiscreteFormatRow>,

    /// Ranges: `[encoding, ch_min, ch_max, bits_min, bits_max, rate_min, rate_max]`.
    #[serde(default)]
    pub ranges: Vec<RangeRow>,

    /// Mode bindings: `[mode, format_index, is_default]`.
    #[serde(default)]
    pub modes: Vec<ModeRow>,
}

/// One processing node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Unique node id.
    pub id: String,

    /// Node kind (`adc`, `dac`, `volume`, `mute`, `sum`, `mux` or any name).
    pub kind: String,

    /// Number of node pins.
    #[serde(default = "default_node_pins")]
    pub pins: u32,
}

fn default_node_pins() -> u32 {
    Node::DEFAULT_PINS
}

/// One connection. Ends are a pin id, or `node:index` for a node pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Upstream end.
    pub from: String,

    /// Downstream end.
    pub to: String,

    /// Data flow or feedback.
    #[serde(default)]
    pub kind: ConnectionKind,
}

impl EndpointConfig {
    /// Parses an endpoint description from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Loads an endpoint description from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            pins = config.pins.len(),
            nodes = config.nodes.len(),
            "loaded endpoint description"
        );
        Ok(config)
    }

    /// Builds the sealed topology graph.
    ///
    /// The graph is not validated; pass it to [`validate`](crate::validate)
    /// or [`EndpointRegistry::register`](crate::EndpointRegistry::register).
    pub fn build(&self) -> Result<TopologyGraph, ConfigError> {
        let mut builder = TopologyGraph::builder();

        for pin in &self.pins {
            builder = builder.pin(pin.build()?);
        }
        for node in &self.nodes {
            builder = builder.node(Node::new(node.id.as_str(), node.kind.as_str()).with_pins(node.pins));
        }
        for connection in &self.connections {
            builder = builder.connect(Connection {
                from: parse_end(&connection.from)?,
                to: parse_end(&connection.to)?,
                kind: connection.kind,
            });
        }

        Ok(builder.build()?)
    }
}

impl PinConfig {
    fn build(&self) -> Result<PinTopology, ConfigError> {
        let pin = if self.bridge {
            if !(self.formats.is_empty() && self.ranges.is_empty() && self.modes.is_empty()) {
                tracing::warn!(pin = %self.id, "ignoring format tables on bridge pin");
            }
            PinTopology::bridge(self.id.as_str(), self.direction)
                .with_communication(self.communication)
        } else {
            let catalog = CapabilityCatalog::from_tables(&self.formats, &self.ranges, &self.modes)?;
            PinTopology::streaming(
                self.id.as_str(),
                self.direction,
                self.communication,
                catalog,
            )
        };

        let min = self.min_instances.unwrap_or(pin.cardinality.min);
        let max = self.max_instances.unwrap_or(pin.cardinality.max);
        Ok(pin.with_cardinality(min, max))
    }
}

fn parse_end(end: &str) -> Result<ConnectionEnd, ConfigError> {
    match end.split_once(':') {
        None => Ok(ConnectionEnd::pin(end)),
        Some((node, index)) => {
            let pin = index.parse().map_err(|_| {
                ConfigError::Parse(format!(
                    "connection end '{end}' is neither a pin id nor node:index"
                ))
            })?;
            Ok(ConnectionEnd::node(node, pin))
        }
    }
}

//! Pins, nodes and connections of one endpoint.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::CapabilityCatalog;
use crate::format::CapabilityRange;
use crate::id::{NodeId, PinId};
use crate::TopologyError;

/// Direction of data flow through a pin, seen from the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinDirection {
    /// Data enters the endpoint through this pin.
    In,
    /// Data leaves the endpoint through this pin.
    Out,
}

/// Who moves data through a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Communication {
    /// No host I/O; used by bridge pins.
    #[default]
    None,
    /// The host writes to or reads from the pin.
    Sink,
    /// The pin pushes data to the host.
    Source,
    /// Both sink and source.
    Both,
}

/// Inclusive bounds on how many instances of a pin may exist at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cardinality {
    /// Minimum instance count.
    pub min: u32,
    /// Maximum instance count.
    pub max: u32,
}

impl Cardinality {
    /// Exactly one instance.
    pub const ONE: Self = Self { min: 1, max: 1 };
    /// No instances; bridge pins are never instantiated.
    pub const NONE: Self = Self { min: 0, max: 0 };
}

impl Default for Cardinality {
    fn default() -> Self {
        Self::ONE
    }
}

/// The formats a pin can carry.
#[derive(Debug)]
pub enum PinFormats {
    /// A host-facing pin with a negotiable catalog.
    Streaming(CapabilityCatalog),
    /// A bridge pin with a fixed analog envelope.
    Bridge(CapabilityRange),
}

/// One filter pin.
#[derive(Debug)]
pub struct PinTopology {
    /// Unique pin id.
    pub id: PinId,
    /// Data flow direction.
    pub direction: PinDirection,
    /// Host communication type.
    pub communication: Communication,
    /// Instance bounds.
    pub cardinality: Cardinality,
    /// Supported formats.
    pub formats: PinFormats,
}

impl PinTopology {
    /// A host-facing pin that streams formats from `catalog`, with one instance.
    pub fn streaming(
        id: impl Into<PinId>,
        direction: PinDirection,
        communication: Communication,
        catalog: CapabilityCatalog,
    ) -> Self {
        Self {
            id: id.into(),
            direction,
            communication,
            cardinality: Cardinality::ONE,
            formats: PinFormats::Streaming(catalog),
        }
    }

    /// An analog bridge pin connecting the endpoint to hardware.
    pub fn bridge(id: impl Into<PinId>, direction: PinDirection) -> Self {
        Self {
            id: id.into(),
            direction,
            communication: Communication::None,
            cardinality: Cardinality::NONE,
            formats: PinFormats::Bridge(CapabilityRange::analog_passthrough()),
        }
    }

    /// Sets the instance bounds.
    #[must_use]
    pub fn with_cardinality(mut self, min: u32, max: u32) -> Self {
        self.cardinality = Cardinality { min, max };
        self
    }

    /// Sets the host communication type.
    #[must_use]
    pub fn with_communication(mut self, communication: Communication) -> Self {
        self.communication = communication;
        self
    }

    /// The pin's catalog, unless it is a bridge pin.
    #[must_use]
    pub fn catalog(&self) -> Option<&CapabilityCatalog> {
        match &self.formats {
            PinFormats::Streaming(catalog) => Some(catalog),
            PinFormats::Bridge(_) => None,
        }
    }

    /// Returns true for bridge pins.
    #[must_use]
    pub fn is_bridge(&self) -> bool {
        matches!(self.formats, PinFormats::Bridge(_))
    }
}

/// Kind of a processing node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Analog-to-digital converter.
    Adc,
    /// Digital-to-analog converter.
    Dac,
    /// Volume control.
    Volume,
    /// Mute control.
    Mute,
    /// Mixer.
    Sum,
    /// Input selector.
    Mux,
    /// Anything else, by name.
    Other(String),
}

impl From<&str> for NodeKind {
    fn from(kind: &str) -> Self {
        match kind.to_ascii_lowercase().as_str() {
            "adc" => Self::Adc,
            "dac" => Self::Dac,
            "volume" => Self::Volume,
            "mute" => Self::Mute,
            "sum" => Self::Sum,
            "mux" => Self::Mux,
            _ => Self::Other(kind.to_owned()),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Adc => f.write_str("adc"),
            Self::Dac => f.write_str("dac"),
            Self::Volume => f.write_str("volume"),
            Self::Mute => f.write_str("mute"),
            Self::Sum => f.write_str("sum"),
            Self::Mux => f.write_str("mux"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// One processing node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Unique node id.
    pub id: NodeId,
    /// What the node does.
    pub kind: NodeKind,
    /// Number of node pins; connections address them by index.
    pub pins: u32,
}

impl Node {
    /// Default number of node pins: one in, one out.
    pub const DEFAULT_PINS: u32 = 2;

    /// Creates a node with [`Node::DEFAULT_PINS`] pins.
    pub fn new(id: impl Into<NodeId>, kind: impl Into<NodeKind>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            pins: Self::DEFAULT_PINS,
        }
    }

    /// Sets the number of node pins.
    #[must_use]
    pub fn with_pins(mut self, pins: u32) -> Self {
        self.pins = pins;
        self
    }
}

/// One end of a connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConnectionEnd {
    /// A filter pin.
    Pin(PinId),
    /// A node pin, by index.
    Node {
        /// The node.
        node: NodeId,
        /// Index of the node pin.
        pin: u32,
    },
}

impl ConnectionEnd {
    /// A filter pin end.
    pub fn pin(id: impl Into<PinId>) -> Self {
        Self::Pin(id.into())
    }

    /// A node pin end.
    pub fn node(id: impl Into<NodeId>, pin: u32) -> Self {
        Self::Node {
            node: id.into(),
            pin,
        }
    }

    /// Vertex label used in cycle paths: `pin:<id>` or `node:<id>`.
    pub(crate) fn vertex(&self) -> String {
        match self {
            Self::Pin(id) => format!("pin:{id}"),
            Self::Node { node, .. } => format!("node:{node}"),
        }
    }
}

impl fmt::Display for ConnectionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pin(id) => write!(f, "{id}"),
            Self::Node { node, pin } => write!(f, "{node}:{pin}"),
        }
    }
}

/// Whether a connection carries ordinary data or an intended loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionKind {
    /// Ordinary data flow; must not form cycles.
    #[default]
    DataFlow,
    /// Intended loop-back, excluded from cycle detection.
    Feedback,
}

/// A directed edge between pins and node pins.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Connection {
    /// Upstream end.
    pub from: ConnectionEnd,
    /// Downstream end.
    pub to: ConnectionEnd,
    /// Data flow or feedback.
    pub kind: ConnectionKind,
}

impl Connection {
    /// A data flow connection.
    pub fn new(from: ConnectionEnd, to: ConnectionEnd) -> Self {
        Self {
            from,
            to,
            kind: ConnectionKind::DataFlow,
        }
    }

    /// A feedback connection.
    pub fn feedback(from: ConnectionEnd, to: ConnectionEnd) -> Self {
        Self {
            from,
            to,
            kind: ConnectionKind::Feedback,
        }
    }
}

/// The sealed description of one endpoint: pins, nodes and connections.
///
/// Built once with [`TopologyGraph::builder`]; immutable afterwards and safe
/// to share between threads.
///
/// # Example
///
/// ```
/// use pin_caps::{
///     CapabilityCatalog, CapabilityRange, Communication, Connection, ConnectionEnd, Encoding,
///     Node, NodeKind, PinDirection, PinTopology, TopologyGraph,
/// };
///
/// let mut catalog = CapabilityCatalog::new();
/// catalog.add_range(CapabilityRange::new(Encoding::Pcm, 2..=2, 16..=16, 48000..=48000)?)?;
///
/// let graph = TopologyGraph::builder()
///     .pin(PinTopology::bridge("bridge", PinDirection::In))
///     .pin(PinTopology::streaming("host", PinDirection::Out, Communication::Sink, catalog))
///     .node(Node::new("adc", NodeKind::Adc))
///     .connect(Connection::new(ConnectionEnd::pin("bridge"), ConnectionEnd::node("adc", 1)))
///     .connect(Connection::new(ConnectionEnd::node("adc", 0), ConnectionEnd::pin("host")))
///     .build()?;
///
/// assert_eq!(graph.pins().len(), 2);
/// assert!(graph.pin(&"host".into()).is_some());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct TopologyGraph {
    pins: Vec<PinTopology>,
    nodes: Vec<Node>,
    connections: Vec<Connection>,
}

impl TopologyGraph {
    /// Starts building a graph.
    #[must_use]
    pub fn builder() -> TopologyBuilder {
        TopologyBuilder::default()
    }

    /// Pins in declaration order.
    #[must_use]
    pub fn pins(&self) -> &[PinTopology] {
        &self.pins
    }

    /// Nodes in declaration order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Connections in declaration order.
    #[must_use]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Looks up a pin by id.
    #[must_use]
    pub fn pin(&self, id: &PinId) -> Option<&PinTopology> {
        self.pins.iter().find(|pin| &pin.id == id)
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| &node.id == id)
    }
}

/// Builder for [`TopologyGraph`].
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    pins: Vec<PinTopology>,
    nodes: Vec<Node>,
    connections: Vec<Connection>,
}

impl TopologyBuilder {
    /// Adds a pin.
    #[must_use]
    pub fn pin(mut self, pin: PinTopology) -> Self {
        self.pins.push(pin);
        self
    }

    /// Adds a processing node.
    #[must_use]
    pub fn node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Adds a connection.
    #[must_use]
    pub fn connect(mut self, connection: Connection) -> Self {
        self.connections.push(connection);
        self
    }

    /// Seals every pin catalog and freezes the graph.
    ///
    /// Connections are not checked here; run [`validate`](crate::validate)
    /// on the result.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if a pin or node id is declared twice (pins and
    /// nodes live in separate namespaces), and `Catalog` if a pin catalog
    /// fails its integrity check.
    pub fn build(self) -> Result<TopologyGraph, TopologyError> {
        let mut pin_ids = HashSet::new();
        for pin in &self.pins {
            if !pin_ids.insert(&pin.id) {
                return Err(TopologyError::DuplicateId {
                    id: format!("pin:{}", pin.id),
                });
            }
        }
        let mut node_ids = HashSet::new();
        for node in &self.nodes {
            if !node_ids.insert(&node.id) {
                return Err(TopologyError::DuplicateId {
                    id: format!("node:{}", node.id),
                });
            }
        }

        for pin in &self.pins {
            if let Some(catalog) = pin.catalog() {
                catalog.seal()?;
            }
        }

        tracing::debug!(
            pins = self.pins.len(),
            nodes = self.nodes.len(),
            connections = self.connections.len(),
            "topology graph built"
        );

        Ok(TopologyGraph {
            pins: self.pins,
            nodes: self.nodes,
            connections: self.connections,
        })
    }
}

//! Endpoint topology: pins, processing nodes and their connections.
//!
//! A [`TopologyGraph`] is assembled once through [`TopologyBuilder`], which
//! seals every pin catalog. [`validate`] then checks that the graph is
//! well-formed and reports the role of each pin.

mod graph;
mod validate;

pub use graph::{
    Cardinality, Communication, Connection, ConnectionEnd, ConnectionKind, Node, NodeKind,
    PinDirection, PinFormats, PinTopology, TopologyBuilder, TopologyGraph,
};
pub use validate::{validate, PinReport, PinRole, ValidationReport};

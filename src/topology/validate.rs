//! Structural validation of a topology graph.

use std::collections::{HashMap, HashSet};
use std::fmt;

use super::graph::{
    Communication, ConnectionEnd, ConnectionKind, PinDirection, PinFormats, PinTopology,
    TopologyGraph,
};
use crate::id::{NodeId, PinId};
use crate::TopologyError;

/// What a pin is for, as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinRole {
    /// Host writes audio into the endpoint (speaker).
    Render,
    /// Host reads audio from the endpoint (microphone).
    Capture,
    /// Analog bridge into the endpoint.
    BridgeIn,
    /// Analog bridge out of the endpoint.
    BridgeOut,
    /// Any other streaming pin.
    Other,
}

impl PinRole {
    fn of(pin: &PinTopology) -> Self {
        match (&pin.formats, pin.direction, pin.communication) {
            (PinFormats::Bridge(_), PinDirection::In, _) => Self::BridgeIn,
            (PinFormats::Bridge(_), PinDirection::Out, _) => Self::BridgeOut,
            (_, PinDirection::In, Communication::Sink | Communication::Both) => Self::Render,
            (_, PinDirection::Out, Communication::Sink | Communication::Both) => Self::Capture,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for PinRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Render => "render",
            Self::Capture => "capture",
            Self::BridgeIn => "bridge-in",
            Self::BridgeOut => "bridge-out",
            Self::Other => "other",
        })
    }
}

/// Summary of one validated pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinReport {
    /// The pin.
    pub id: PinId,
    /// Resolved role.
    pub role: PinRole,
    /// Number of capability ranges.
    pub ranges: usize,
    /// Number of discrete formats.
    pub formats: usize,
}

/// Result of a successful [`validate`] run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    /// Every pin in declaration order.
    pub pins: Vec<PinReport>,
}

impl ValidationReport {
    /// Looks up the report for a pin.
    #[must_use]
    pub fn pin(&self, id: &PinId) -> Option<&PinReport> {
        self.pins.iter().find(|report| &report.id == id)
    }

    /// Pins with the given role.
    pub fn pins_with_role(&self, role: PinRole) -> impl Iterator<Item = &PinReport> + '_ {
        self.pins.iter().filter(move |report| report.role == role)
    }
}

/// Checks a graph's structure and reports each pin's role.
///
/// Checks run in a fixed order and stop at the first failure:
/// dangling connections, empty capability sets, cycles over data-flow
/// connections, then inverted cardinality bounds.
///
/// # Errors
///
/// Returns the [`TopologyError`] of the first failed check.
///
/// # Example
///
/// ```
/// use pin_caps::{validate, PinDirection, PinRole, PinTopology, TopologyGraph};
///
/// let graph = TopologyGraph::builder()
///     .pin(PinTopology::bridge("line_in", PinDirection::In))
///     .build()?;
/// let report = validate(&graph)?;
/// assert_eq!(report.pins[0].role, PinRole::BridgeIn);
/// # Ok::<(), pin_caps::TopologyError>(())
/// ```
pub fn validate(graph: &TopologyGraph) -> Result<ValidationReport, TopologyError> {
    check_connections(graph)?;
    check_capabilities(graph)?;
    check_cycles(graph)?;
    check_cardinality(graph)?;

    let pins = graph
        .pins()
        .iter()
        .map(|pin| {
            let (ranges, formats) = match &pin.formats {
                PinFormats::Streaming(catalog) => (catalog.ranges().len(), catalog.formats().len()),
                PinFormats::Bridge(_) => (1, 0),
            };
            PinReport {
                id: pin.id.clone(),
                role: PinRole::of(pin),
                ranges,
                formats,
            }
        })
        .collect();

    Ok(ValidationReport { pins })
}

fn check_connections(graph: &TopologyGraph) -> Result<(), TopologyError> {
    let pins: HashSet<&PinId> = graph.pins().iter().map(|pin| &pin.id).collect();
    let nodes: HashMap<&NodeId, u32> = graph
        .nodes()
        .iter()
        .map(|node| (&node.id, node.pins))
        .collect();

    for connection in graph.connections() {
        for end in [&connection.from, &connection.to] {
            let dangling = match end {
                ConnectionEnd::Pin(id) => (!pins.contains(id)).then(|| format!("pin:{id}")),
                ConnectionEnd::Node { node, pin } => match nodes.get(node) {
                    None => Some(format!("node:{node}")),
                    Some(&declared) if *pin >= declared => Some(format!("node:{node}:{pin}")),
                    Some(_) => None,
                },
            };
            if let Some(id) = dangling {
                return Err(TopologyError::DanglingConnection { id });
            }
        }
    }
    Ok(())
}

fn check_capabilities(graph: &TopologyGraph) -> Result<(), TopologyError> {
    for pin in graph.pins() {
        if pin.catalog().is_some_and(|catalog| catalog.is_empty()) {
            return Err(TopologyError::EmptyCapabilitySet {
                pin: pin.id.to_string(),
            });
        }
    }
    Ok(())
}

fn check_cardinality(graph: &TopologyGraph) -> Result<(), TopologyError> {
    for pin in graph.pins() {
        let bounds = pin.cardinality;
        if bounds.min > bounds.max {
            return Err(TopologyError::InvalidCardinality {
                pin: pin.id.to_string(),
                min: bounds.min,
                max: bounds.max,
            });
        }
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Depth-first search over data-flow edges, vertices in declaration order.
fn check_cycles(graph: &TopologyGraph) -> Result<(), TopologyError> {
    let vertices: Vec<String> = graph
        .pins()
        .iter()
        .map(|pin| ConnectionEnd::Pin(pin.id.clone()).vertex())
        .chain(
            graph
                .nodes()
                .iter()
                .map(|node| ConnectionEnd::node(node.id.clone(), 0).vertex()),
        )
        .collect();
    let index: HashMap<&str, usize> = vertices
        .iter()
        .enumerate()
        .map(|(i, vertex)| (vertex.as_str(), i))
        .collect();

    let mut edges = vec![Vec::new(); vertices.len()];
    for connection in graph.connections() {
        if connection.kind == ConnectionKind::Feedback {
            continue;
        }
        let from = index.get(connection.from.vertex().as_str()).copied();
        let to = index.get(connection.to.vertex().as_str()).copied();
        if let (Some(from), Some(to)) = (from, to) {
            edges[from].push(to);
        }
    }

    let mut marks = vec![Mark::Unvisited; vertices.len()];
    for start in 0..vertices.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }
        if let Some(cycle) = visit(start, &edges, &mut marks) {
            return Err(TopologyError::UnexpectedCycle {
                path: cycle.into_iter().map(|i| vertices[i].clone()).collect(),
            });
        }
    }
    Ok(())
}

/// Depth-first search from `root` with an explicit stack, so long chains of
/// nodes cannot overflow the thread stack. Each frame holds a vertex on the
/// current path and the index of its next outgoing edge.
fn visit(root: usize, edges: &[Vec<usize>], marks: &mut [Mark]) -> Option<Vec<usize>> {
    let mut stack = vec![(root, 0usize)];
    marks[root] = Mark::OnPath;

    while let Some(frame) = stack.last_mut() {
        let (vertex, cursor) = *frame;
        let Some(&next) = edges[vertex].get(cursor) else {
            marks[vertex] = Mark::Done;
            stack.pop();
            continue;
        };
        frame.1 += 1;

        match marks[next] {
            Mark::OnPath => {
                let start = stack.iter().position(|&(v, _)| v == next).unwrap_or(0);
                let mut cycle: Vec<usize> = stack[start..].iter().map(|&(v, _)| v).collect();
                cycle.push(next);
                return Some(cycle);
            }
            Mark::Unvisited => {
                marks[next] = Mark::OnPath;
                stack.push((next, 0));
            }
            Mark::Done => {}
        }
    }
    None
}

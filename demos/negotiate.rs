//! Format negotiation example.
//!
//! Registers a microphone array described in TOML and a speaker built from
//! static tables, then negotiates a few host requests against both.
//!
//! Run with: cargo run --example negotiate
//!
//! Set `RUST_LOG=pin_caps=debug` to see catalog sealing and negotiation logs.

use pin_caps::{
    intersect, CapabilityCatalog, CapabilityRange, Communication, Connection, ConnectionEnd,
    Encoding, EndpointConfig, EndpointRegistry, FormatRequest, Node, NodeKind, PinDirection,
    PinTopology, ProcessingMode, TopologyGraph,
};
use tracing_subscriber::EnvFilter;

fn speaker() -> Result<TopologyGraph, Box<dyn std::error::Error>> {
    let catalog = CapabilityCatalog::from_tables(
        &[
            (Encoding::Pcm, 2, 48000, 16, 16, 0x3),
            (Encoding::Pcm, 2, 48000, 24, 24, 0x3),
            (Encoding::Pcm, 6, 48000, 16, 16, 0x3F),
            (Encoding::Pcm, 8, 48000, 16, 16, 0xFF),
            (Encoding::IeeeFloat, 2, 48000, 32, 32, 0x3),
        ],
        &[
            (Encoding::Pcm, 1, 8, 8, 32, 8000, 384_000),
            (Encoding::IeeeFloat, 1, 8, 32, 32, 8000, 384_000),
        ],
        &[
            (ProcessingMode::Raw, 0, true),
            (ProcessingMode::Raw, 1, false),
            (ProcessingMode::Default, 0, true),
            (ProcessingMode::Movie, 2, true),
            (ProcessingMode::Movie, 3, false),
            (ProcessingMode::Media, 4, true),
        ],
    )?;

    let graph = TopologyGraph::builder()
        .pin(PinTopology::streaming(
            "host_render",
            PinDirection::In,
            Communication::Sink,
            catalog,
        ))
        .pin(PinTopology::bridge("line_out", PinDirection::Out))
        .node(Node::new("dac", NodeKind::Dac))
        .connect(Connection::new(
            ConnectionEnd::pin("host_render"),
            ConnectionEnd::node("dac", 1),
        ))
        .connect(Connection::new(
            ConnectionEnd::node("dac", 0),
            ConnectionEnd::pin("line_out"),
        ))
        .build()?;
    Ok(graph)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pin_caps=info")),
        )
        .init();

    let registry = EndpointRegistry::new();

    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/mic_array.toml");
    let mic = EndpointConfig::from_file(path)?.build()?;
    for pin in registry.register("mic_array".into(), mic)?.pins {
        println!(
            "mic_array/{}: {} ({} ranges, {} formats)",
            pin.id, pin.role, pin.ranges, pin.formats
        );
    }
    registry.register("speaker".into(), speaker()?)?;

    let requests = [
        ("mic_array", "host_capture", None, ProcessingMode::Speech),
        (
            "mic_array",
            "host_capture",
            Some(FormatRequest::pcm(2, 44100, 16)),
            ProcessingMode::Raw,
        ),
        (
            "mic_array",
            "host_capture",
            Some(FormatRequest::pcm(2, 44100, 20)),
            ProcessingMode::Raw,
        ),
        (
            "mic_array",
            "host_capture",
            Some(FormatRequest::pcm(2, 500_000, 16)),
            ProcessingMode::Raw,
        ),
        (
            "mic_array",
            "host_capture",
            Some(FormatRequest::float(2, 48000, 16)),
            ProcessingMode::Media,
        ),
        ("speaker", "host_render", None, ProcessingMode::Movie),
        ("speaker", "host_render", None, ProcessingMode::Notification),
        (
            "speaker",
            "host_render",
            Some(FormatRequest::pcm(12, 48000, 24).with_mask(0xFFF)),
            ProcessingMode::Raw,
        ),
    ];

    println!();
    for (endpoint, pin, request, mode) in requests {
        let result = registry.negotiate(&endpoint.into(), &pin.into(), request.as_ref(), mode)?;
        let asked = request.map_or_else(|| "default".to_string(), |r| r.to_string());
        println!("{endpoint}/{pin} [{mode}] {asked}");
        println!("    {result}");
        for adjustment in result.adjustments() {
            println!("    - {adjustment}");
        }
    }

    // A client that can only take 16-bit audio between 44.1 and 96 kHz.
    let client = CapabilityRange::new(Encoding::Pcm, 1..=8, 16..=16, 44100..=96000)?;
    if let Some(graph) = registry.get(&"speaker".into()) {
        if let Some(catalog) = graph.pin(&"host_render".into()).and_then(PinTopology::catalog) {
            match intersect(catalog, &client) {
                Some(format) => println!("\nspeaker intersection with {client}: {format}"),
                None => println!("\nspeaker has nothing in common with {client}"),
            }
        }
    }

    Ok(())
}

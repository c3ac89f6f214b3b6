//! Integration tests for pin-caps.
//!
//! Note: Tests that require actual audio hardware live behind the `cpal`
//! feature, are marked with `#[ignore]` and should be run manually.

use std::io::Write;
use std::sync::Arc;

use pin_caps::{
    negotiate, validate, Adjustment, CapabilityCatalog, CapabilityRange, Communication,
    Connection, ConnectionEnd, Encoding, EndpointConfig, EndpointRegistry, FormatDescriptor,
    FormatRequest, NegotiationResult, Node, NodeKind, PinDirection, PinRole, PinTopology,
    ProcessingMode, Rejection, TopologyError, TopologyGraph,
};

/// The capture pin of a two-channel microphone array.
fn mic_catalog() -> CapabilityCatalog {
    CapabilityCatalog::from_tables(
        &[
            (Encoding::Pcm, 2, 48000, 32, 32, 0x3),
            (Encoding::Pcm, 2, 44100, 16, 16, 0x3),
            (Encoding::Pcm, 2, 48000, 16, 16, 0x3),
            (Encoding::Pcm, 2, 16000, 16, 16, 0x3),
            (Encoding::Pcm, 2, 96000, 24, 24, 0x3),
            (Encoding::IeeeFloat, 2, 48000, 32, 32, 0x3),
        ],
        &[
            (Encoding::Pcm, 2, 2, 8, 32, 8000, 192_000),
            (Encoding::IeeeFloat, 2, 2, 32, 32, 8000, 192_000),
        ],
        &[
            (ProcessingMode::Raw, 0, true),
            (ProcessingMode::Raw, 1, false),
            (ProcessingMode::Raw, 4, false),
            (ProcessingMode::Communications, 2, true),
            (ProcessingMode::Speech, 3, true),
            (ProcessingMode::Media, 5, true),
            (ProcessingMode::Media, 1, false),
        ],
    )
    .unwrap()
}

/// Overlapping ranges, one of them without any container width, plus a
/// many-channel range whose layouts have no bitmask.
fn layered_catalog() -> CapabilityCatalog {
    CapabilityCatalog::from_tables(
        &[
            (Encoding::Pcm, 2, 48000, 16, 16, 0x3),
            (Encoding::Pcm, 1, 16000, 16, 16, 0x4),
            (Encoding::Pcm, 6, 48000, 24, 24, 0x3F),
            (Encoding::IeeeFloat, 2, 48000, 32, 32, 0x3),
        ],
        &[
            (Encoding::Pcm, 2, 2, 17, 20, 8000, 48000),
            (Encoding::Pcm, 1, 2, 16, 24, 8000, 48000),
            (Encoding::Pcm, 1, 64, 8, 32, 8000, 192_000),
            (Encoding::IeeeFloat, 1, 64, 32, 32, 8000, 192_000),
        ],
        &[(ProcessingMode::Raw, 0, true), (ProcessingMode::Speech, 1, true)],
    )
    .unwrap()
}

fn catalogs() -> [CapabilityCatalog; 2] {
    [mic_catalog(), layered_catalog()]
}

fn requests() -> Vec<FormatRequest> {
    let mut requests = Vec::new();
    for channels in [1, 2, 6] {
        for rate in [7000, 16000, 44100, 96000, 500_000] {
            for bits in [8, 12, 16, 20, 24, 32, 40] {
                requests.push(FormatRequest::pcm(channels, rate, bits));
            }
            requests.push(FormatRequest::float(channels, rate, 32));
            requests.push(FormatRequest::float(channels, rate, 16));
        }
    }
    requests.push(FormatRequest::pcm(2, 48000, 24).with_valid_bits(20));
    requests.push(FormatRequest::pcm(2, 48000, 16).with_valid_bits(24));
    requests.push(FormatRequest::pcm(2, 48000, 16).with_mask(0x30));
    requests.push(FormatRequest::pcm(2, 48000, 16).with_mask(0x7));
    requests.push(FormatRequest::pcm(2, 48000, 0));
    requests.push(FormatRequest::pcm(2, 48000, 18));
    requests.push(FormatRequest::pcm(2, 96000, 18));
    requests.push(FormatRequest::pcm(40, 48000, 16).with_mask(0x3));
    requests.push(FormatRequest::pcm(64, 48000, 24));
    requests.push(FormatRequest::pcm(64, 48000, 24).with_mask(0xFFFF_FFFF));
    requests.push(FormatRequest::float(64, 48000, 32));
    requests
}

// ============================================================================
// Negotiation properties
// ============================================================================

#[test]
fn test_discrete_formats_accepted_in_every_mode() {
    for catalog in catalogs() {
        for format in catalog.formats() {
            for mode in ProcessingMode::ALL {
                let result = negotiate(&catalog, Some(&format.into()), mode);
                assert_eq!(result, NegotiationResult::Accepted(*format), "mode {mode}");
            }
        }
    }
}

#[test]
fn test_in_range_requests_are_never_substituted() {
    for catalog in catalogs() {
        for request in requests() {
            if !catalog.ranges().iter().any(|range| range.contains(&request)) {
                continue;
            }
            let result = negotiate(&catalog, Some(&request), ProcessingMode::Raw);
            assert!(result.is_accepted(), "{request} gave {result}");
        }
    }
}

#[test]
fn test_renegotiation_is_a_fixed_point() {
    for catalog in catalogs() {
        for mode in [ProcessingMode::Raw, ProcessingMode::Speech] {
            for request in requests() {
                let first = negotiate(&catalog, Some(&request), mode);
                let Some(format) = first.format() else {
                    continue;
                };
                assert_ne!(format.valid_bits_per_sample(), 0, "{request}");
                let again = negotiate(&catalog, Some(&format.into()), mode);
                assert_eq!(again, NegotiationResult::Accepted(*format), "{request}");
            }
        }
    }
}

#[test]
fn test_negotiation_is_deterministic() {
    for catalog in catalogs() {
        for request in requests() {
            let first = negotiate(&catalog, Some(&request), ProcessingMode::Media);
            let second = negotiate(&catalog, Some(&request), ProcessingMode::Media);
            assert_eq!(first, second);
            assert_eq!(format!("{first:?}"), format!("{second:?}"));
        }
    }
}

#[test]
fn test_layered_ranges_skip_range_without_container() {
    let catalog = layered_catalog();

    let inside = FormatRequest::pcm(2, 48000, 18);
    let inside = negotiate(&catalog, Some(&inside), ProcessingMode::Raw);
    let format = inside.format().unwrap();
    assert!(matches!(inside, NegotiationResult::AcceptedWithCoercion { .. }));
    assert_eq!(format.bits_per_sample(), 24);
    assert_eq!(format.valid_bits_per_sample(), 18);

    let outside = FormatRequest::pcm(2, 384_000, 18);
    let outside = negotiate(&catalog, Some(&outside), ProcessingMode::Raw);
    let format = outside.format().unwrap();
    assert!(matches!(outside, NegotiationResult::Substituted { .. }));
    assert_eq!(format.bits_per_sample(), 24);
    assert_eq!(format.sample_rate(), 48000);
}

#[test]
fn test_earlier_range_governs_clamping() {
    let mut catalog = CapabilityCatalog::new();
    catalog
        .add_range(CapabilityRange::new(Encoding::Pcm, 1..=2, 16..=24, 8000..=48000).unwrap())
        .unwrap();
    catalog
        .add_range(CapabilityRange::new(Encoding::Pcm, 1..=8, 8..=32, 8000..=192_000).unwrap())
        .unwrap();

    let request = FormatRequest::pcm(8, 384_000, 32);
    let result = negotiate(&catalog, Some(&request), ProcessingMode::Raw);

    let format = result.format().unwrap();
    assert!(matches!(result, NegotiationResult::Substituted { .. }));
    assert_eq!(format.channels(), 2);
    assert_eq!(format.bits_per_sample(), 24);
    assert_eq!(format.sample_rate(), 48000);
}

#[test]
fn test_mode_defaults() {
    let catalog = mic_catalog();
    let default_rate = |mode| {
        negotiate(&catalog, None, mode)
            .format()
            .map(FormatDescriptor::sample_rate)
    };

    assert_eq!(default_rate(ProcessingMode::Raw), Some(48000));
    assert_eq!(default_rate(ProcessingMode::Communications), Some(48000));
    assert_eq!(default_rate(ProcessingMode::Speech), Some(16000));
    // No bindings: falls back to Raw.
    assert_eq!(default_rate(ProcessingMode::Notification), Some(48000));

    let media = negotiate(&catalog, None, ProcessingMode::Media);
    assert_eq!(media.format().map(FormatDescriptor::encoding), Some(Encoding::IeeeFloat));
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_scenario_a_known_good_format() {
    let catalog = mic_catalog();
    let request = FormatRequest::pcm(2, 44100, 16);

    let result = negotiate(&catalog, Some(&request), ProcessingMode::Raw);

    assert_eq!(
        result,
        NegotiationResult::Accepted(FormatDescriptor::pcm(2, 44100, 16).unwrap())
    );
}

#[test]
fn test_scenario_b_twenty_bit_request() {
    let catalog = mic_catalog();
    let request = FormatRequest::pcm(2, 44100, 20);

    let result = negotiate(&catalog, Some(&request), ProcessingMode::Raw);

    match result {
        NegotiationResult::AcceptedWithCoercion {
            format,
            original,
            adjustments,
        } => {
            assert_eq!(format.bits_per_sample(), 24);
            assert_eq!(format.valid_bits_per_sample(), 20);
            assert_eq!(format.sample_rate(), 44100);
            assert_eq!(original, request);
            assert_eq!(adjustments, vec![Adjustment::BitsPerSample { from: 20, to: 24 }]);
        }
        other => panic!("expected AcceptedWithCoercion, got {other:?}"),
    }
}

#[test]
fn test_scenario_c_rate_above_range() {
    let catalog = mic_catalog();
    let request = FormatRequest::pcm(2, 500_000, 16);

    let result = negotiate(&catalog, Some(&request), ProcessingMode::Raw);

    match result {
        NegotiationResult::Substituted { format, original, .. } => {
            assert_eq!(format.sample_rate(), 192_000);
            assert_eq!(format.bits_per_sample(), 16);
            assert_eq!(original.sample_rate, 500_000);
        }
        other => panic!("expected Substituted, got {other:?}"),
    }
}

#[test]
fn test_scenario_d_sixteen_bit_float() {
    let catalog = mic_catalog();
    let request = FormatRequest::float(2, 44100, 16);

    let result = negotiate(&catalog, Some(&request), ProcessingMode::Raw);

    match result {
        NegotiationResult::Substituted { format, .. } => {
            assert_eq!(format.encoding(), Encoding::IeeeFloat);
            assert_eq!(format.bits_per_sample(), 32);
            assert_eq!(format.valid_bits_per_sample(), 32);
            assert_eq!(format.sample_rate(), 44100);
        }
        other => panic!("expected Substituted, got {other:?}"),
    }
}

#[test]
fn test_scenario_e_dangling_node() {
    let graph = TopologyGraph::builder()
        .pin(PinTopology::bridge("bridge", PinDirection::In))
        .pin(PinTopology::streaming(
            "host",
            PinDirection::Out,
            Communication::Sink,
            mic_catalog(),
        ))
        .node(Node::new("adc", NodeKind::Adc))
        .connect(Connection::new(
            ConnectionEnd::pin("bridge"),
            ConnectionEnd::node("adc", 1),
        ))
        .connect(Connection::new(
            ConnectionEnd::node("aec", 0),
            ConnectionEnd::pin("host"),
        ))
        .build()
        .unwrap();

    let err = validate(&graph).unwrap_err();
    assert_eq!(
        err,
        TopologyError::DanglingConnection {
            id: "node:aec".to_string()
        }
    );
    assert!(err.to_string().contains("aec"));
}

#[test]
fn test_unsupported_encoding_is_rejected() {
    let mut catalog = CapabilityCatalog::new();
    catalog
        .add_range(CapabilityRange::new(Encoding::Pcm, 2..=2, 16..=16, 48000..=48000).unwrap())
        .unwrap();

    let result = negotiate(&catalog, Some(&FormatRequest::float(2, 48000, 32)), ProcessingMode::Raw);
    assert_eq!(
        result.into_result(),
        Err(Rejection::UnsupportedEncoding {
            encoding: Encoding::IeeeFloat
        })
    );
}

// ============================================================================
// Topology, registry and configuration
// ============================================================================

const MIC_ARRAY: &str = r#"
    [[pins]]
    id = "bridge"
    direction = "in"
    bridge = true

    [[pins]]
    id = "host_capture"
    direction = "out"
    communication = "sink"
    formats = [
        ["pcm", 2, 48000, 32, 32, 3],
        ["pcm", 2, 16000, 16, 16, 3],
    ]
    ranges = [
        ["pcm", 2, 2, 8, 32, 8000, 192000],
        ["ieee_float", 2, 2, 32, 32, 8000, 192000],
    ]
    modes = [
        ["raw", 0, true],
        ["speech", 1, true],
    ]

    [[nodes]]
    id = "adc"
    kind = "adc"

    [[connections]]
    from = "bridge"
    to = "adc:1"

    [[connections]]
    from = "adc:0"
    to = "host_capture"
"#;

#[test]
fn test_config_file_to_registry() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(MIC_ARRAY.as_bytes()).unwrap();

    let graph = EndpointConfig::from_file(file.path())
        .unwrap()
        .build()
        .unwrap();

    let registry = EndpointRegistry::new();
    let report = registry.register("mic_array".into(), graph).unwrap();

    let capture: Vec<_> = report.pins_with_role(PinRole::Capture).collect();
    assert_eq!(capture.len(), 1);
    assert_eq!(capture[0].formats, 2);
    assert_eq!(capture[0].ranges, 2);

    let result = registry
        .negotiate(
            &"mic_array".into(),
            &"host_capture".into(),
            None,
            ProcessingMode::Speech,
        )
        .unwrap();
    assert_eq!(
        result,
        NegotiationResult::Accepted(FormatDescriptor::pcm(2, 16000, 16).unwrap())
    );
}

#[test]
fn test_config_with_cycle_is_not_registered() {
    let config = EndpointConfig::from_toml_str(&format!(
        r#"{MIC_ARRAY}
        [[nodes]]
        id = "volume"
        kind = "volume"

        [[connections]]
        from = "adc:0"
        to = "volume:1"

        [[connections]]
        from = "volume:0"
        to = "adc:1"
        "#
    ))
    .unwrap();

    let registry = EndpointRegistry::new();
    let err = registry
        .register("mic_array".into(), config.build().unwrap())
        .unwrap_err();
    assert!(matches!(err, TopologyError::UnexpectedCycle { .. }));
    assert!(registry.is_empty());
}

#[test]
fn test_concurrent_negotiation() {
    let registry = Arc::new(EndpointRegistry::new());
    let graph = EndpointConfig::from_toml_str(MIC_ARRAY)
        .unwrap()
        .build()
        .unwrap();
    registry.register("mic_array".into(), graph).unwrap();

    let endpoint = "mic_array".into();
    let pin = "host_capture".into();
    let expected = registry
        .negotiate(&endpoint, &pin, Some(&FormatRequest::pcm(2, 500_000, 16)), ProcessingMode::Raw)
        .unwrap();

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..100 {
                    let result = registry
                        .negotiate(
                            &endpoint,
                            &pin,
                            Some(&FormatRequest::pcm(2, 500_000, 16)),
                            ProcessingMode::Raw,
                        )
                        .unwrap();
                    assert_eq!(result, expected);
                }
            });
        }
        // Registering another endpoint while readers run.
        scope.spawn(|| {
            let graph = EndpointConfig::from_toml_str(MIC_ARRAY)
                .unwrap()
                .build()
                .unwrap();
            registry.register("mic_array_2".into(), graph).unwrap();
        });
    });

    assert_eq!(registry.len(), 2);
}

#[test]
fn test_graph_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TopologyGraph>();
    assert_send_sync::<CapabilityCatalog>();
    assert_send_sync::<EndpointRegistry>();
}

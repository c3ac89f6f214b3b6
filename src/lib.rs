//! # pin-caps
//!
//! **Note:** This crate is under active development. The API may change before 1.0.
//!
//! Audio format-capability negotiation for the pins of a virtual audio endpoint.
//!
//! `pin-caps` decides which format a capture or render pin can stream. Given a
//! pin's [`CapabilityCatalog`], an optional [`FormatRequest`] and a
//! [`ProcessingMode`], [`negotiate`] either accepts the request, accepts it
//! with a normalised container, substitutes the closest supported format, or
//! rejects it with a reason. It also validates the pin/node/connection
//! topology of an endpoint before anything is negotiated against it.
//!
//! ## Quick Start
//!
//! ```rust
//! use pin_caps::{
//!     negotiate, CapabilityCatalog, Encoding, FormatRequest, NegotiationResult, ProcessingMode,
//! };
//!
//! // Tables shaped like a driver's static format arrays.
//! let catalog = CapabilityCatalog::from_tables(
//!     &[
//!         (Encoding::Pcm, 2, 48000, 16, 16, 0x3),
//!         (Encoding::Pcm, 2, 16000, 16, 16, 0x3),
//!     ],
//!     &[(Encoding::Pcm, 2, 2, 8, 32, 8000, 192_000)],
//!     &[(ProcessingMode::Raw, 0, true), (ProcessingMode::Speech, 1, true)],
//! )?;
//!
//! // No request: the mode's default.
//! let speech = negotiate(&catalog, None, ProcessingMode::Speech);
//! assert_eq!(speech.format().map(|f| f.sample_rate()), Some(16000));
//!
//! // A 20-bit request is re-containered to 24 bits with 20 valid bits.
//! let request = FormatRequest::pcm(2, 44100, 20);
//! let result = negotiate(&catalog, Some(&request), ProcessingMode::Raw);
//! assert!(matches!(result, NegotiationResult::AcceptedWithCoercion { .. }));
//! # Ok::<(), pin_caps::CapsError>(())
//! ```
//!
//! ## Architecture
//!
//! - **Values** ([`format`]): validated [`FormatDescriptor`]s, unvalidated
//!   [`FormatRequest`]s and [`CapabilityRange`] envelopes
//! - **Catalogs** ([`catalog`]): per-pin formats and mode defaults, sealed
//!   after construction and shared without locks
//! - **Engine**: [`negotiate`] and [`intersect`], pure functions over a catalog
//! - **Topology**: [`TopologyGraph`] and [`validate`]
//! - **Hosting**: [`EndpointRegistry`] and TOML [`EndpointConfig`] files

#![warn(missing_docs)]
// Format fields are small integers widened or narrowed on purpose
#![allow(clippy::cast_possible_truncation, clippy::cast_lossless)]
// unwrap/expect allowed in tests only
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
// These doc lints are too strict for internal implementation details
#![allow(clippy::missing_panics_doc, clippy::missing_errors_doc)]

pub mod catalog;
mod config;
mod error;
pub mod format;
#[cfg(feature = "cpal")]
pub mod host;
mod id;
mod negotiate;
mod registry;
pub mod topology;

pub use catalog::{
    CapabilityCatalog, DiscreteFormatRow, FormatId, ModeBinding, ModeRow, ProcessingMode, RangeRow,
};
pub use config::{
    ConnectionConfig, ContainerPolicy, EndpointConfig, NegotiationConfig, NodeConfig, PinConfig,
};
pub use error::{CapsError, ConfigError, RegistryError, Rejection, TopologyError};
pub use format::{CapabilityRange, ChannelMask, Encoding, FormatDescriptor, FormatRequest};
pub use id::{EndpointId, NodeId, PinId};
pub use negotiate::{intersect, negotiate, negotiate_with, Adjustment, NegotiationResult};
pub use registry::EndpointRegistry;
pub use topology::{
    validate, Cardinality, Communication, Connection, ConnectionEnd, ConnectionKind, Node,
    NodeKind, PinDirection, PinFormats, PinReport, PinRole, PinTopology, TopologyBuilder,
    TopologyGraph, ValidationReport,
};

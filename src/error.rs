//! Error types for pin-caps.
//!
//! Errors are split by the phase that detects them:
//! - **Construction errors** ([`CapsError`]): malformed formats or ranges and
//!   catalog integrity problems. A catalog that fails here is never usable.
//! - **Negotiation rejections** ([`Rejection`]): carried inside
//!   [`NegotiationResult::Rejected`](crate::NegotiationResult::Rejected). These
//!   are recoverable; the host falls back to a Raw/Default format or reports
//!   the format as unsupported.
//! - **Topology errors** ([`TopologyError`]): returned by graph building and
//!   [`validate`](crate::validate).
//! - **Registry and configuration errors** ([`RegistryError`], [`ConfigError`]).

use std::path::PathBuf;

use crate::catalog::ProcessingMode;
use crate::format::Encoding;

/// Errors raised while constructing formats, ranges and catalogs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapsError {
    /// A format descriptor or capability range violates an invariant.
    #[error("invalid format: {reason}")]
    InvalidFormat {
        /// Which invariant was violated.
        reason: String,
    },

    /// A mode binding references a format the catalog does not advertise,
    /// or a mode would end up with more than one default.
    #[error("catalog integrity error in mode {mode}: {reason}")]
    CatalogIntegrity {
        /// The processing mode whose binding is broken.
        mode: ProcessingMode,
        /// Description of the offending binding.
        reason: String,
    },

    /// The catalog was mutated after it had been sealed.
    #[error("catalog is sealed and can no longer be modified")]
    CatalogSealed,

    /// The host audio backend failed while describing its capabilities.
    #[error("audio backend error: {0}")]
    Backend(String),
}

impl CapsError {
    /// Creates an invalid format error with the given reason.
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            reason: reason.into(),
        }
    }

    /// Creates a catalog integrity error for the given mode.
    pub fn integrity(mode: ProcessingMode, reason: impl Into<String>) -> Self {
        Self::CatalogIntegrity {
            mode,
            reason: reason.into(),
        }
    }
}

/// Why a negotiation request could not be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Rejection {
    /// No default format exists for the requested mode, nor for the
    /// fallback modes.
    #[error("no default format available for mode {mode}")]
    NoDefaultAvailable {
        /// The mode that was asked for.
        mode: ProcessingMode,
    },

    /// The catalog declares no range with the requested encoding.
    #[error("no capability range supports encoding {encoding}")]
    UnsupportedEncoding {
        /// The encoding that was asked for.
        encoding: Encoding,
    },

    /// The governing range admits no 8/16/24/32-bit container.
    #[error("no natural container width between {bits_min} and {bits_max} bits")]
    NoNaturalContainer {
        /// Lower bit bound of the governing range.
        bits_min: u16,
        /// Upper bit bound of the governing range.
        bits_max: u16,
    },

    /// The request uses a non-container width and the policy forbids
    /// re-containering it.
    #[error("{bits}-bit samples are not a supported container width")]
    NonNaturalWidth {
        /// The requested bits per sample.
        bits: u16,
    },
}

/// Errors raised while building or validating a topology graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    /// A connection endpoint names a pin or node that is not declared.
    #[error("connection references undeclared endpoint: {id}")]
    DanglingConnection {
        /// The missing pin/node reference.
        id: String,
    },

    /// A streaming pin advertises neither ranges nor discrete formats.
    #[error("pin '{pin}' has an empty capability set")]
    EmptyCapabilitySet {
        /// The pin without capabilities.
        pin: String,
    },

    /// Data-flow connections form a loop not marked as feedback.
    #[error("unexpected cycle: {}", path.join(" -> "))]
    UnexpectedCycle {
        /// The vertices along the cycle, first vertex repeated at the end.
        path: Vec<String>,
    },

    /// A pin's instance bounds are inverted.
    #[error("pin '{pin}' has invalid cardinality {min}..={max}")]
    InvalidCardinality {
        /// The offending pin.
        pin: String,
        /// Minimum instance count.
        min: u32,
        /// Maximum instance count.
        max: u32,
    },

    /// A pin or node id was declared twice.
    #[error("duplicate id: {id}")]
    DuplicateId {
        /// The duplicated id.
        id: String,
    },

    /// A pin's catalog failed its integrity check while the graph was built.
    #[error("pin catalog error: {0}")]
    Catalog(#[from] CapsError),
}

/// Errors from [`EndpointRegistry`](crate::EndpointRegistry) lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No endpoint is registered under this id.
    #[error("unknown endpoint: {endpoint}")]
    UnknownEndpoint {
        /// The endpoint that wasn't found.
        endpoint: String,
    },

    /// The endpoint has no pin with this id.
    #[error("endpoint '{endpoint}' has no pin '{pin}'")]
    UnknownPin {
        /// The endpoint that was searched.
        endpoint: String,
        /// The pin that wasn't found.
        pin: String,
    },

    /// The pin is a bridge pin and carries no negotiable format set.
    #[error("pin '{pin}' is a bridge pin without a format catalog")]
    NotStreaming {
        /// The bridge pin.
        pin: String,
    },
}

/// Errors while loading an endpoint description.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("config file error: {path}: {source}")]
    Io {
        /// Path to the file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid.
    #[error("config parse error: {0}")]
    Parse(String),

    /// A catalog described by the configuration is malformed.
    #[error(transparent)]
    Caps(#[from] CapsError),

    /// The topology described by the configuration is malformed.
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

//! Configuration types for negotiation and endpoint descriptions.

mod endpoint;

pub use endpoint::{ConnectionConfig, EndpointConfig, NodeConfig, PinConfig};

use serde::{Deserialize, Serialize};

use crate::catalog::ProcessingMode;

/// How to treat a sample width that is not an 8/16/24/32-bit container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerPolicy {
    /// Move the samples into the next wider container the range allows,
    /// keeping the requested width as valid bits (20-bit → 24/20).
    ///
    /// Falls back to the next narrower container when nothing wider fits.
    #[default]
    Widen,

    /// Truncate to the next narrower container the range allows.
    ///
    /// Falls back to the next wider container when nothing narrower fits.
    Narrow,

    /// Reject requests that ask for a non-container width.
    Reject,
}

/// Tunables for [`negotiate_with`](crate::negotiate_with).
///
/// Use [`NegotiationConfig::default()`] for the standard behavior, or
/// customize as needed.
///
/// # Example
///
/// ```
/// use pin_caps::{ContainerPolicy, NegotiationConfig};
///
/// let config = NegotiationConfig {
///     container_policy: ContainerPolicy::Reject,
///     ..Default::default()
/// };
/// assert_eq!(config.fallback_modes.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationConfig {
    /// Modes searched, in order, when the requested mode has no default.
    ///
    /// Default: `[Default, Raw]`
    pub fallback_modes: Vec<ProcessingMode>,

    /// Treatment of non-container sample widths.
    ///
    /// Default: [`ContainerPolicy::Widen`]
    pub container_policy: ContainerPolicy,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            fallback_modes: vec![ProcessingMode::Default, ProcessingMode::Raw],
            container_policy: ContainerPolicy::Widen,
        }
    }
}

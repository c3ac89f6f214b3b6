//! Audio format value types.
//!
//! This module provides the values negotiation works on:
//! - [`FormatDescriptor`]: one concrete, validated format
//! - [`FormatRequest`]: an unvalidated format proposed by the host
//! - [`CapabilityRange`]: a continuous envelope of acceptable formats
//! - [`ChannelMask`]: speaker assignment of a format's channels

mod descriptor;
mod mask;
mod range;

pub use descriptor::{
    is_natural_width, Encoding, FormatDescriptor, FormatRequest, FLOAT_BITS, NATURAL_WIDTHS,
};
pub use mask::ChannelMask;
pub use range::CapabilityRange;

//! Negotiation outcomes.

use std::fmt;

use crate::format::{ChannelMask, FormatDescriptor, FormatRequest};
use crate::Rejection;

/// One field the engine changed on the way from a request to a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Adjustment {
    /// Channel count clamped into the governing range.
    Channels {
        /// Requested value.
        from: u16,
        /// Negotiated value.
        to: u16,
    },
    /// Container width clamped or re-containered.
    BitsPerSample {
        /// Requested value.
        from: u16,
        /// Negotiated value.
        to: u16,
    },
    /// Significant bits reduced to fit the container.
    ValidBitsPerSample {
        /// Requested value.
        from: u16,
        /// Negotiated value.
        to: u16,
    },
    /// Sample rate clamped into the governing range.
    SampleRate {
        /// Requested value.
        from: u32,
        /// Negotiated value.
        to: u32,
    },
    /// Channel mask replaced to match the channel count.
    ChannelMask {
        /// Requested value.
        from: ChannelMask,
        /// Negotiated value.
        to: ChannelMask,
    },
}

impl Adjustment {
    /// Lists the fields where `format` differs from `request`.
    pub(crate) fn between(request: &FormatRequest, format: &FormatDescriptor) -> Vec<Self> {
        let mut adjustments = Vec::new();
        if request.channels != format.channels() {
            adjustments.push(Self::Channels {
                from: request.channels,
                to: format.channels(),
            });
        }
        if request.bits_per_sample != format.bits_per_sample() {
            adjustments.push(Self::BitsPerSample {
                from: request.bits_per_sample,
                to: format.bits_per_sample(),
            });
        }
        if request.effective_valid_bits() != format.valid_bits_per_sample() {
            adjustments.push(Self::ValidBitsPerSample {
                from: request.effective_valid_bits(),
                to: format.valid_bits_per_sample(),
            });
        }
        if request.sample_rate != format.sample_rate() {
            adjustments.push(Self::SampleRate {
                from: request.sample_rate,
                to: format.sample_rate(),
            });
        }
        if request.channel_mask != format.channel_mask() {
            adjustments.push(Self::ChannelMask {
                from: request.channel_mask,
                to: format.channel_mask(),
            });
        }
        adjustments
    }
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channels { from, to } => write!(f, "channels {from} -> {to}"),
            Self::BitsPerSample { from, to } => write!(f, "bits {from} -> {to}"),
            Self::ValidBitsPerSample { from, to } => write!(f, "valid bits {from} -> {to}"),
            Self::SampleRate { from, to } => write!(f, "rate {from}Hz -> {to}Hz"),
            Self::ChannelMask { from, to } => write!(f, "mask {from} -> {to}"),
        }
    }
}

/// The outcome of [`negotiate`](crate::negotiate).
///
/// Every variant except `Accepted` keeps the original request so the host
/// can always tell that the format it gets is not the one it asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationResult {
    /// The request (or the mode default) is supported unchanged.
    Accepted(FormatDescriptor),

    /// The request lies inside a capability range but needed normalising,
    /// e.g. a 20-bit request re-containered to 24 bits.
    AcceptedWithCoercion {
        /// The normalised format.
        format: FormatDescriptor,
        /// What the host asked for.
        original: FormatRequest,
        /// Fields that were changed.
        adjustments: Vec<Adjustment>,
    },

    /// The request lies outside every range; this is the closest format
    /// the pin supports.
    Substituted {
        /// The substitute format.
        format: FormatDescriptor,
        /// What the host asked for.
        original: FormatRequest,
        /// Fields that were changed.
        adjustments: Vec<Adjustment>,
    },

    /// Nothing the pin supports can stand in for the request.
    Rejected(Rejection),
}

impl NegotiationResult {
    /// The negotiated format, unless rejected.
    #[must_use]
    pub fn format(&self) -> Option<&FormatDescriptor> {
        match self {
            Self::Accepted(format)
            | Self::AcceptedWithCoercion { format, .. }
            | Self::Substituted { format, .. } => Some(format),
            Self::Rejected(_) => None,
        }
    }

    /// The original request, for coerced and substituted results.
    #[must_use]
    pub fn original(&self) -> Option<&FormatRequest> {
        match self {
            Self::AcceptedWithCoercion { original, .. } | Self::Substituted { original, .. } => {
                Some(original)
            }
            Self::Accepted(_) | Self::Rejected(_) => None,
        }
    }

    /// Fields the engine changed; empty for accepted and rejected results.
    #[must_use]
    pub fn adjustments(&self) -> &[Adjustment] {
        match self {
            Self::AcceptedWithCoercion { adjustments, .. }
            | Self::Substituted { adjustments, .. } => adjustments,
            Self::Accepted(_) | Self::Rejected(_) => &[],
        }
    }

    /// Returns true for `Accepted` and `AcceptedWithCoercion`.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_) | Self::AcceptedWithCoercion { .. })
    }

    /// Returns true for `Rejected`.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Short name of the variant, for logs and metrics labels.
    #[must_use]
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Accepted(_) => "accepted",
            Self::AcceptedWithCoercion { .. } => "accepted_with_coercion",
            Self::Substituted { .. } => "substituted",
            Self::Rejected(_) => "rejected",
        }
    }

    /// Converts into the negotiated format or the rejection reason.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] of a rejected result.
    pub fn into_result(self) -> Result<FormatDescriptor, Rejection> {
        match self {
            Self::Accepted(format)
            | Self::AcceptedWithCoercion { format, .. }
            | Self::Substituted { format, .. } => Ok(format),
            Self::Rejected(reason) => Err(reason),
        }
    }
}

impl fmt::Display for NegotiationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted(format) => write!(f, "accepted {format}"),
            Self::AcceptedWithCoercion {
                format, original, ..
            } => write!(f, "accepted {format} (coerced from {original})"),
            Self::Substituted {
                format, original, ..
            } => write!(f, "substituted {format} for {original}"),
            Self::Rejected(reason) => write!(f, "rejected: {reason}"),
        }
    }
}

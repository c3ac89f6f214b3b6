//! The format negotiation engine.
//!
//! Given a pin's [`CapabilityCatalog`], an optional [`FormatRequest`] and a
//! [`ProcessingMode`], [`negotiate`] decides in this order:
//!
//! 1. **No request**: the mode's default format, falling back to the
//!    `Default` and then `Raw` mode defaults.
//! 2. **Exact match** against the discrete formats. Channel masks only have to
//!    agree when both sides set one.
//! 3. **Range containment**: the first declared range containing the request
//!    that holds a natural container accepts it, normalising the container
//!    width if needed.
//! 4. **Closest fit**: the request is clamped into the first declared range
//!    with its encoding that holds a natural container, and returned as a
//!    substitute.
//!
//! Every function here is pure: no logging, no shared state, a fresh result
//! per call. Only the catalog's seal flag is touched by the first query.

mod intersect;
mod result;

pub use intersect::intersect;
pub use result::{Adjustment, NegotiationResult};

use crate::catalog::{CapabilityCatalog, ProcessingMode};
use crate::config::{ContainerPolicy, NegotiationConfig};
use crate::format::{
    is_natural_width, CapabilityRange, ChannelMask, Encoding, FormatDescriptor, FormatRequest,
    FLOAT_BITS,
};
use crate::Rejection;

/// Negotiates a format with the default [`NegotiationConfig`].
///
/// # Example
///
/// ```
/// use pin_caps::{
///     negotiate, CapabilityCatalog, CapabilityRange, Encoding, FormatRequest,
///     NegotiationResult, ProcessingMode,
/// };
///
/// let mut catalog = CapabilityCatalog::new();
/// catalog.add_range(CapabilityRange::new(Encoding::Pcm, 2..=2, 8..=32, 8000..=192_000)?)?;
///
/// let request = FormatRequest::pcm(2, 500_000, 16);
/// let result = negotiate(&catalog, Some(&request), ProcessingMode::Raw);
/// assert!(matches!(result, NegotiationResult::Substituted { .. }));
/// assert_eq!(result.format().map(|f| f.sample_rate()), Some(192_000));
/// # Ok::<(), pin_caps::CapsError>(())
/// ```
#[must_use]
pub fn negotiate(
    catalog: &CapabilityCatalog,
    request: Option<&FormatRequest>,
    mode: ProcessingMode,
) -> NegotiationResult {
    negotiate_with(catalog, request, mode, &NegotiationConfig::default())
}

/// Negotiates a format using explicit tunables.
#[must_use]
pub fn negotiate_with(
    catalog: &CapabilityCatalog,
    request: Option<&FormatRequest>,
    mode: ProcessingMode,
    config: &NegotiationConfig,
) -> NegotiationResult {
    let Some(request) = request else {
        return resolve_default(catalog, mode, &config.fallback_modes);
    };

    if let Some(format) = exact_match(catalog, request) {
        return NegotiationResult::Accepted(*format);
    }

    if config.container_policy == ContainerPolicy::Reject
        && request.encoding == Encoding::Pcm
        && !is_natural_width(request.bits_per_sample)
    {
        return NegotiationResult::Rejected(Rejection::NonNaturalWidth {
            bits: request.bits_per_sample,
        });
    }

    // Containing ranges without a natural container are skipped.
    let contained = catalog
        .ranges()
        .iter()
        .filter(|range| range.contains(request))
        .find_map(|range| conform(request, range, config.container_policy).ok());
    if let Some(format) = contained {
        let format = settle(catalog, format);
        let adjustments = Adjustment::between(request, &format);
        if adjustments.is_empty() {
            return NegotiationResult::Accepted(format);
        }
        return NegotiationResult::AcceptedWithCoercion {
            format,
            original: *request,
            adjustments,
        };
    }

    closest_fit(catalog, request, config.container_policy)
}

fn resolve_default(
    catalog: &CapabilityCatalog,
    mode: ProcessingMode,
    fallback_modes: &[ProcessingMode],
) -> NegotiationResult {
    std::iter::once(mode)
        .chain(fallback_modes.iter().copied())
        .find_map(|candidate| catalog.default_for_mode(candidate))
        .map_or(
            NegotiationResult::Rejected(Rejection::NoDefaultAvailable { mode }),
            |format| NegotiationResult::Accepted(*format),
        )
}

fn exact_match<'a>(
    catalog: &'a CapabilityCatalog,
    request: &FormatRequest,
) -> Option<&'a FormatDescriptor> {
    let formats = catalog.formats();
    // An entry with the very same mask wins over one that merely leaves it open.
    formats
        .iter()
        .find(|format| {
            matches_exactly(format, request) && format.channel_mask() == request.channel_mask
        })
        .or_else(|| formats.iter().find(|format| matches_exactly(format, request)))
}

fn matches_exactly(format: &FormatDescriptor, request: &FormatRequest) -> bool {
    let masks_agree = format.channel_mask().is_empty()
        || request.channel_mask.is_empty()
        || format.channel_mask() == request.channel_mask;

    format.encoding() == request.encoding
        && format.channels() == request.channels
        && format.bits_per_sample() == request.bits_per_sample
        && format.valid_bits_per_sample() == request.effective_valid_bits()
        && format.sample_rate() == request.sample_rate
        && masks_agree
}

/// Prefers the catalog's own descriptor when a normalised format is also a
/// discrete format, so re-negotiating a result returns it unchanged.
fn settle(catalog: &CapabilityCatalog, format: FormatDescriptor) -> FormatDescriptor {
    exact_match(catalog, &FormatRequest::from(format))
        .copied()
        .unwrap_or(format)
}

fn closest_fit(
    catalog: &CapabilityCatalog,
    request: &FormatRequest,
    policy: ContainerPolicy,
) -> NegotiationResult {
    let mut first_error = None;
    for range in catalog.ranges_for(request.encoding) {
        match conform(request, range, policy) {
            Ok(format) => {
                let format = settle(catalog, format);
                return NegotiationResult::Substituted {
                    format,
                    original: *request,
                    adjustments: Adjustment::between(request, &format),
                };
            }
            Err(reason) => {
                first_error.get_or_insert(reason);
            }
        }
    }

    NegotiationResult::Rejected(first_error.unwrap_or(Rejection::UnsupportedEncoding {
        encoding: request.encoding,
    }))
}

/// Clamps every scalar of the request into `range` and picks a container.
fn conform(
    request: &FormatRequest,
    range: &CapabilityRange,
    policy: ContainerPolicy,
) -> Result<FormatDescriptor, Rejection> {
    let channels = range.clamp_channels(request.channels);
    let sample_rate = range.clamp_rate(request.sample_rate);

    let (bits, valid_bits) = if range.encoding() == Encoding::IeeeFloat {
        (FLOAT_BITS, FLOAT_BITS)
    } else {
        let clamped = range.clamp_bits(request.bits_per_sample);
        let container = select_container(clamped, range, policy)?;
        let valid_bits = match request.effective_valid_bits().min(clamped).min(container) {
            0 => container,
            valid_bits => valid_bits,
        };
        (container, valid_bits)
    };

    let channel_mask = if request.channel_mask.fits(channels) {
        request.channel_mask
    } else {
        ChannelMask::canonical(channels)
    };

    Ok(FormatDescriptor::from_parts(
        range.encoding(),
        channels,
        sample_rate,
        bits,
        valid_bits,
        channel_mask,
    ))
}

/// Picks a natural container for `bits`, which already lies inside `range`.
fn select_container(
    bits: u16,
    range: &CapabilityRange,
    policy: ContainerPolicy,
) -> Result<u16, Rejection> {
    if is_natural_width(bits) {
        return Ok(bits);
    }

    let wider = range.natural_widths().find(|&width| width > bits);
    let narrower = range.natural_widths().rev().find(|&width| width < bits);

    // Reject only applies to requested widths; a clamped bound is widened.
    let container = match policy {
        ContainerPolicy::Widen | ContainerPolicy::Reject => wider.or(narrower),
        ContainerPolicy::Narrow => narrower.or(wider),
    };

    container.ok_or_else(|| {
        let bounds = range.bits();
        Rejection::NoNaturalContainer {
            bits_min: *bounds.start(),
            bits_max: *bounds.end(),
        }
    })
}

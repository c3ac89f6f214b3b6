//! Intersection of a client-side range with a pin's catalog.

use crate::catalog::CapabilityCatalog;
use crate::format::{CapabilityRange, ChannelMask, FormatDescriptor};

/// Picks the preferred concrete format common to `client` and the catalog.
///
/// The first catalog range with the client's encoding that overlaps it wins.
/// Within the overlap the richest format is preferred: most channels,
/// highest sample rate and widest natural container. Returns `None` when no
/// range overlaps or the overlap holds no natural container width.
///
/// # Example
///
/// ```
/// use pin_caps::{intersect, CapabilityCatalog, CapabilityRange, Encoding};
///
/// let mut catalog = CapabilityCatalog::new();
/// catalog.add_range(CapabilityRange::new(Encoding::Pcm, 2..=2, 8..=32, 8000..=192_000)?)?;
///
/// let client = CapabilityRange::new(Encoding::Pcm, 1..=8, 16..=24, 44100..=48000)?;
/// let format = intersect(&catalog, &client).unwrap();
/// assert_eq!(format.channels(), 2);
/// assert_eq!(format.bits_per_sample(), 24);
/// assert_eq!(format.sample_rate(), 48000);
/// # Ok::<(), pin_caps::CapsError>(())
/// ```
#[must_use]
pub fn intersect(catalog: &CapabilityCatalog, client: &CapabilityRange) -> Option<FormatDescriptor> {
    catalog
        .ranges_for(client.encoding())
        .filter_map(|range| range.intersection(client))
        .find_map(|common| {
            let bits = common.natural_widths().next_back()?;
            let channels = *common.channels().end();
            Some(FormatDescriptor::from_parts(
                common.encoding(),
                channels,
                *common.rates().end(),
                bits,
                bits,
                ChannelMask::canonical(channels),
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Encoding;

    fn catalog() -> CapabilityCatalog {
        let mut catalog = CapabilityCatalog::new();
        catalog
            .add_range(CapabilityRange::new(Encoding::Pcm, 1..=2, 16..=16, 8000..=48000).unwrap())
            .unwrap();
        catalog
            .add_range(CapabilityRange::new(Encoding::Pcm, 2..=8, 8..=32, 8000..=384_000).unwrap())
            .unwrap();
        catalog
            .add_range(
                CapabilityRange::new(Encoding::IeeeFloat, 2..=8, 32..=32, 8000..=384_000).unwrap(),
            )
            .unwrap();
        catalog
    }

    #[test]
    fn test_first_overlapping_range_wins() {
        let client = CapabilityRange::new(Encoding::Pcm, 1..=8, 8..=32, 44100..=96000).unwrap();
        let format = intersect(&catalog(), &client).unwrap();

        assert_eq!(format.channels(), 2);
        assert_eq!(format.bits_per_sample(), 16);
        assert_eq!(format.sample_rate(), 48000);
        assert_eq!(format.channel_mask(), ChannelMask::STEREO);
    }

    #[test]
    fn test_skips_disjoint_range() {
        let client = CapabilityRange::new(Encoding::Pcm, 6..=6, 24..=24, 96000..=96000).unwrap();
        let format = intersect(&catalog(), &client).unwrap();

        assert_eq!(format.channels(), 6);
        assert_eq!(format.bits_per_sample(), 24);
        assert_eq!(format.channel_mask(), ChannelMask::SURROUND_5_1);
    }

    #[test]
    fn test_float_intersection() {
        let client =
            CapabilityRange::new(Encoding::IeeeFloat, 2..=2, 32..=32, 8000..=48000).unwrap();
        let format = intersect(&catalog(), &client).unwrap();
        assert_eq!(format.encoding(), Encoding::IeeeFloat);
        assert_eq!(format.valid_bits_per_sample(), 32);
    }

    #[test]
    fn test_no_overlap() {
        let client = CapabilityRange::new(Encoding::Pcm, 16..=16, 16..=16, 8000..=8000).unwrap();
        assert!(intersect(&catalog(), &client).is_none());

        let analog = CapabilityRange::analog_passthrough();
        assert!(intersect(&catalog(), &analog).is_none());
    }

    #[test]
    fn test_overlap_without_container_width() {
        let client = CapabilityRange::new(Encoding::Pcm, 2..=2, 17..=20, 8000..=48000).unwrap();
        // Overlaps the second PCM range, but 17..=20 holds no container width.
        assert!(intersect(&catalog(), &client).is_none());
    }

    #[test]
    fn test_wide_channel_overlap_has_empty_mask() {
        let mut catalog = CapabilityCatalog::new();
        catalog
            .add_range(CapabilityRange::new(Encoding::Pcm, 1..=64, 8..=32, 8000..=48000).unwrap())
            .unwrap();
        let client = CapabilityRange::new(Encoding::Pcm, 1..=64, 16..=16, 48000..=48000).unwrap();

        let format = intersect(&catalog, &client).unwrap();

        assert_eq!(format.channels(), 64);
        assert_eq!(format.channel_mask(), ChannelMask::NONE);
    }
}

//! Capability catalogs from the host audio backend (CPAL).
//!
//! Lets a host describe a real device with the same catalog type the
//! virtual endpoints use, so requests can be negotiated against it before a
//! stream is opened.

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, SupportedStreamConfigRange};

use crate::catalog::{CapabilityCatalog, ProcessingMode};
use crate::format::{
    is_natural_width, CapabilityRange, ChannelMask, Encoding, FormatDescriptor, FLOAT_BITS,
};
use crate::CapsError;

/// Builds a sealed catalog from CPAL's supported configuration ranges.
///
/// Integer sample formats become PCM ranges and `f32` becomes IEEE float.
/// Widths that are not a container (or 64-bit floats) are skipped.
///
/// # Errors
///
/// Propagates catalog errors from adding ranges or sealing.
pub fn catalog_from_config_ranges<I>(ranges: I) -> Result<CapabilityCatalog, CapsError>
where
    I: IntoIterator<Item = SupportedStreamConfigRange>,
{
    let mut catalog = CapabilityCatalog::new();
    add_config_ranges(&mut catalog, ranges)?;
    catalog.seal()?;
    Ok(catalog)
}

/// Describes an input device.
///
/// The device's default configuration, when it maps to a valid format, is
/// also advertised as the `Raw` mode default.
///
/// # Errors
///
/// Returns `Backend` if CPAL cannot enumerate the device's configurations.
pub fn input_catalog(device: &Device) -> Result<CapabilityCatalog, CapsError> {
    let ranges = device
        .supported_input_configs()
        .map_err(|e| CapsError::Backend(e.to_string()))?;

    let mut catalog = CapabilityCatalog::new();
    add_config_ranges(&mut catalog, ranges)?;

    match device.default_input_config() {
        Ok(config) => {
            let bits = sample_bits(config.sample_format());
            let encoding = if config.sample_format().is_float() {
                Encoding::IeeeFloat
            } else {
                Encoding::Pcm
            };
            let format = bits.and_then(|bits| {
                FormatDescriptor::new(
                    encoding,
                    config.channels(),
                    config.sample_rate().0,
                    bits,
                    bits,
                    ChannelMask::canonical(config.channels()),
                )
                .ok()
            });
            if let Some(format) = format {
                catalog.add_discrete_format(format)?;
                catalog.bind_mode_default(ProcessingMode::Raw, &format, true)?;
            } else {
                tracing::debug!(?config, "default input config is not a streamable format");
            }
        }
        Err(e) => tracing::warn!(error = %e, "no default input config"),
    }

    catalog.seal()?;
    Ok(catalog)
}

/// Describes the default input device.
///
/// # Errors
///
/// Returns `Backend` if there is no default input device or CPAL fails.
pub fn default_input_catalog() -> Result<CapabilityCatalog, CapsError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| CapsError::Backend("no default input device".to_string()))?;
    input_catalog(&device)
}

fn sample_bits(format: cpal::SampleFormat) -> Option<u16> {
    u16::try_from(format.sample_size() * 8).ok()
}

fn add_config_ranges<I>(catalog: &mut CapabilityCatalog, ranges: I) -> Result<(), CapsError>
where
    I: IntoIterator<Item = SupportedStreamConfigRange>,
{
    for config in ranges {
        let Some(bits) = sample_bits(config.sample_format()) else {
            continue;
        };
        let encoding = match (config.sample_format().is_float(), bits) {
            (true, FLOAT_BITS) => Encoding::IeeeFloat,
            (false, bits) if is_natural_width(bits) => Encoding::Pcm,
            _ => {
                tracing::debug!(format = ?config.sample_format(), "skipping sample format");
                continue;
            }
        };

        let channels = config.channels();
        match CapabilityRange::new(
            encoding,
            channels..=channels,
            bits..=bits,
            config.min_sample_rate().0..=config.max_sample_rate().0,
        ) {
            Ok(range) => catalog.add_range(range)?,
            Err(e) => tracing::debug!(error = %e, "skipping config range"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use cpal::{SampleFormat, SampleRate, SupportedBufferSize};

    use super::*;

    fn config_range(channels: u16, format: SampleFormat) -> SupportedStreamConfigRange {
        SupportedStreamConfigRange::new(
            channels,
            SampleRate(8000),
            SampleRate(96000),
            SupportedBufferSize::Unknown,
            format,
        )
    }

    #[test]
    fn test_maps_sample_formats() {
        let catalog = catalog_from_config_ranges([
            config_range(2, SampleFormat::I16),
            config_range(2, SampleFormat::I32),
            config_range(2, SampleFormat::F32),
            config_range(2, SampleFormat::F64),
        ])
        .unwrap();

        assert!(catalog.is_sealed());
        let ranges = catalog.ranges();
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0].bits(), 16..=16);
        assert_eq!(ranges[1].bits(), 32..=32);
        assert_eq!(ranges[2].encoding(), Encoding::IeeeFloat);
        assert_eq!(ranges[2].rates(), 8000..=96000);
    }

    #[test]
    fn test_skips_zero_channel_ranges() {
        let catalog = catalog_from_config_ranges([config_range(0, SampleFormat::I16)]).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    #[ignore = "requires audio hardware"]
    fn test_default_input_catalog() {
        let catalog = default_input_catalog().unwrap();
        assert!(!catalog.ranges().is_empty());
    }
}

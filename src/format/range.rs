//! Continuous capability envelopes.

use std::fmt;
use std::ops::RangeInclusive;

use super::{Encoding, FormatDescriptor, FormatRequest, FLOAT_BITS, NATURAL_WIDTHS};
use crate::CapsError;

/// A continuous envelope of acceptable format parameters.
///
/// A format lies *within* a range when its encoding matches and its channel
/// count, bits per sample and sample rate fall inside the closed bounds. The
/// channel mask is not constrained by a range.
///
/// # Example
///
/// ```
/// use pin_caps::{CapabilityRange, Encoding, FormatRequest};
///
/// let range = CapabilityRange::new(Encoding::Pcm, 2..=2, 8..=32, 8000..=192_000)?;
/// assert!(range.contains(&FormatRequest::pcm(2, 44100, 16)));
/// assert!(!range.contains(&FormatRequest::pcm(2, 384_000, 16)));
/// # Ok::<(), pin_caps::CapsError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityRange {
    encoding: Encoding,
    channels_min: u16,
    channels_max: u16,
    bits_min: u16,
    bits_max: u16,
    rate_min: u32,
    rate_max: u32,
}

impl CapabilityRange {
    /// Creates a range from inclusive bounds.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if a bound pair is inverted, a lower bound is
    /// zero, or an IEEE float range is anything but 32 bits.
    pub fn new(
        encoding: Encoding,
        channels: RangeInclusive<u16>,
        bits: RangeInclusive<u16>,
        rate: RangeInclusive<u32>,
    ) -> Result<Self, CapsError> {
        let range = Self {
            encoding,
            channels_min: *channels.start(),
            channels_max: *channels.end(),
            bits_min: *bits.start(),
            bits_max: *bits.end(),
            rate_min: *rate.start(),
            rate_max: *rate.end(),
        };
        range.check()?;
        Ok(range)
    }

    /// The envelope of an analog bridge pin: any channel count, width and rate.
    #[must_use]
    pub fn analog_passthrough() -> Self {
        Self {
            encoding: Encoding::Analog,
            channels_min: 1,
            channels_max: u16::MAX,
            bits_min: 1,
            bits_max: u16::MAX,
            rate_min: 1,
            rate_max: u32::MAX,
        }
    }

    fn check(&self) -> Result<(), CapsError> {
        if self.channels_min == 0 || self.bits_min == 0 || self.rate_min == 0 {
            return Err(CapsError::invalid_format(format!(
                "range {self} has a zero lower bound"
            )));
        }
        if self.channels_min > self.channels_max
            || self.bits_min > self.bits_max
            || self.rate_min > self.rate_max
        {
            return Err(CapsError::invalid_format(format!(
                "range {self} has an inverted bound"
            )));
        }
        if self.encoding == Encoding::IeeeFloat
            && (self.bits_min != FLOAT_BITS || self.bits_max != FLOAT_BITS)
        {
            return Err(CapsError::invalid_format(
                "IEEE float ranges must be exactly 32 bits",
            ));
        }
        Ok(())
    }

    /// Sample encoding accepted by this range.
    #[must_use]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Accepted channel counts.
    #[must_use]
    pub fn channels(&self) -> RangeInclusive<u16> {
        self.channels_min..=self.channels_max
    }

    /// Accepted container widths.
    #[must_use]
    pub fn bits(&self) -> RangeInclusive<u16> {
        self.bits_min..=self.bits_max
    }

    /// Accepted sample rates.
    #[must_use]
    pub fn rates(&self) -> RangeInclusive<u32> {
        self.rate_min..=self.rate_max
    }

    /// Returns true if the request lies within this range.
    ///
    /// An IEEE float request with anything but 32 bits counts as a different
    /// encoding and is never contained.
    #[must_use]
    pub fn contains(&self, request: &FormatRequest) -> bool {
        if request.encoding != self.encoding {
            return false;
        }
        if request.encoding == Encoding::IeeeFloat && request.bits_per_sample != FLOAT_BITS {
            return false;
        }
        self.channels().contains(&request.channels)
            && self.bits().contains(&request.bits_per_sample)
            && self.rates().contains(&request.sample_rate)
    }

    /// Returns true if the descriptor lies within this range.
    #[must_use]
    pub fn contains_format(&self, format: &FormatDescriptor) -> bool {
        self.contains(&FormatRequest::from(format))
    }

    /// Clamps a channel count into this range.
    #[must_use]
    pub fn clamp_channels(&self, channels: u16) -> u16 {
        channels.clamp(self.channels_min, self.channels_max)
    }

    /// Clamps a container width into this range.
    #[must_use]
    pub fn clamp_bits(&self, bits: u16) -> u16 {
        bits.clamp(self.bits_min, self.bits_max)
    }

    /// Clamps a sample rate into this range.
    #[must_use]
    pub fn clamp_rate(&self, rate: u32) -> u32 {
        rate.clamp(self.rate_min, self.rate_max)
    }

    /// Natural container widths inside this range, narrowest first.
    pub fn natural_widths(&self) -> impl DoubleEndedIterator<Item = u16> + '_ {
        NATURAL_WIDTHS
            .iter()
            .copied()
            .filter(move |bits| self.bits().contains(bits))
    }

    /// The overlap of two ranges with the same encoding, if any.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if self.encoding != other.encoding {
            return None;
        }
        let range = Self {
            encoding: self.encoding,
            channels_min: self.channels_min.max(other.channels_min),
            channels_max: self.channels_max.min(other.channels_max),
            bits_min: self.bits_min.max(other.bits_min),
            bits_max: self.bits_max.min(other.bits_max),
            rate_min: self.rate_min.max(other.rate_min),
            rate_max: self.rate_max.min(other.rate_max),
        };
        range.check().ok().map(|()| range)
    }
}

impl fmt::Display for CapabilityRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}..={}ch {}..={}-bit {}..={}Hz",
            self.encoding,
            self.channels_min,
            self.channels_max,
            self.bits_min,
            self.bits_max,
            self.rate_min,
            self.rate_max
        )
    }
}

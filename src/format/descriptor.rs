//! Concrete audio formats and format requests.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ChannelMask;
use crate::CapsError;

/// Container widths a device can stream, in bits per sample.
pub const NATURAL_WIDTHS: [u16; 4] = [8, 16, 24, 32];

/// Bits per sample of every IEEE float format.
pub const FLOAT_BITS: u16 = 32;

/// Returns true if `bits` is one of the [`NATURAL_WIDTHS`].
#[must_use]
pub fn is_natural_width(bits: u16) -> bool {
    NATURAL_WIDTHS.contains(&bits)
}

/// Sample encoding of an audio stream.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Integer PCM.
    #[default]
    Pcm,
    /// 32-bit IEEE floating point.
    IeeeFloat,
    /// Analog signal on a bridge pin; never streamed by the host.
    Analog,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pcm => "PCM",
            Self::IeeeFloat => "IEEE float",
            Self::Analog => "analog",
        })
    }
}

/// One fully concrete audio format.
///
/// A `FormatDescriptor` always satisfies its invariants: the container width
/// is 8, 16, 24 or 32 bits, valid bits never exceed the container, channels
/// and sample rate are nonzero, a nonzero channel mask assigns exactly
/// `channels` speakers, and IEEE float is 32-bit.
///
/// Descriptors order canonically by encoding, then sample rate, then bits,
/// then channels, which gives deterministic tie-breaking.
///
/// # Example
///
/// ```
/// use pin_caps::{ChannelMask, Encoding, FormatDescriptor};
///
/// let cd = FormatDescriptor::pcm(2, 44100, 16)?;
/// assert_eq!(cd.channel_mask(), ChannelMask::STEREO);
/// assert_eq!(cd.block_align(), 4);
/// assert_eq!(cd.avg_bytes_per_sec(), 176_400);
///
/// assert!(FormatDescriptor::new(Encoding::Pcm, 2, 48000, 16, 24, ChannelMask::STEREO).is_err());
/// # Ok::<(), pin_caps::CapsError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatDescriptor {
    encoding: Encoding,
    channels: u16,
    channel_mask: ChannelMask,
    bits_per_sample: u16,
    valid_bits_per_sample: u16,
    sample_rate: u32,
}

impl FormatDescriptor {
    /// Creates a descriptor, checking every invariant.
    ///
    /// A `valid_bits_per_sample` of zero means "the whole container".
    pub fn new(
        encoding: Encoding,
        channels: u16,
        sample_rate: u32,
        bits_per_sample: u16,
        valid_bits_per_sample: u16,
        channel_mask: impl Into<ChannelMask>,
    ) -> Result<Self, CapsError> {
        let valid_bits_per_sample = if valid_bits_per_sample == 0 {
            bits_per_sample
        } else {
            valid_bits_per_sample
        };
        let format = Self {
            encoding,
            channels,
            channel_mask: channel_mask.into(),
            bits_per_sample,
            valid_bits_per_sample,
            sample_rate,
        };
        format.check()?;
        Ok(format)
    }

    /// Creates a PCM format with the canonical channel mask and all bits valid.
    pub fn pcm(channels: u16, sample_rate: u32, bits_per_sample: u16) -> Result<Self, CapsError> {
        Self::new(
            Encoding::Pcm,
            channels,
            sample_rate,
            bits_per_sample,
            bits_per_sample,
            ChannelMask::canonical(channels),
        )
    }

    /// Creates a 32-bit IEEE float format with the canonical channel mask.
    pub fn float(channels: u16, sample_rate: u32) -> Result<Self, CapsError> {
        Self::new(
            Encoding::IeeeFloat,
            channels,
            sample_rate,
            FLOAT_BITS,
            FLOAT_BITS,
            ChannelMask::canonical(channels),
        )
    }

    /// Builds a descriptor from fields the caller has already normalised.
    pub(crate) fn from_parts(
        encoding: Encoding,
        channels: u16,
        sample_rate: u32,
        bits_per_sample: u16,
        valid_bits_per_sample: u16,
        channel_mask: ChannelMask,
    ) -> Self {
        let format = Self {
            encoding,
            channels,
            channel_mask,
            bits_per_sample,
            valid_bits_per_sample,
            sample_rate,
        };
        debug_assert!(format.check().is_ok(), "unnormalised format {format:?}");
        format
    }

    fn check(&self) -> Result<(), CapsError> {
        if self.channels == 0 {
            return Err(CapsError::invalid_format("channel count must be at least 1"));
        }
        if self.sample_rate == 0 {
            return Err(CapsError::invalid_format("sample rate must be nonzero"));
        }
        if !is_natural_width(self.bits_per_sample) {
            return Err(CapsError::invalid_format(format!(
                "{} bits per sample is not a container width (8/16/24/32)",
                self.bits_per_sample
            )));
        }
        if self.valid_bits_per_sample == 0 {
            return Err(CapsError::invalid_format("valid bits must be nonzero"));
        }
        if self.valid_bits_per_sample > self.bits_per_sample {
            return Err(CapsError::invalid_format(format!(
                "{} valid bits exceed the {}-bit container",
                self.valid_bits_per_sample, self.bits_per_sample
            )));
        }
        if self.encoding == Encoding::IeeeFloat
            && (self.bits_per_sample != FLOAT_BITS || self.valid_bits_per_sample != FLOAT_BITS)
        {
            return Err(CapsError::invalid_format(
                "IEEE float formats are always 32-bit",
            ));
        }
        if !self.channel_mask.fits(self.channels) {
            return Err(CapsError::invalid_format(format!(
                "channel mask {} does not describe {} channels",
                self.channel_mask, self.channels
            )));
        }
        Ok(())
    }

    /// Sample encoding.
    #[must_use]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Number of interleaved channels.
    #[must_use]
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Speaker assignment of the channels.
    #[must_use]
    pub fn channel_mask(&self) -> ChannelMask {
        self.channel_mask
    }

    /// Container width in bits.
    #[must_use]
    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// Significant bits within the container.
    #[must_use]
    pub fn valid_bits_per_sample(&self) -> u16 {
        self.valid_bits_per_sample
    }

    /// Frames per second.
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Bytes per interleaved frame.
    #[must_use]
    pub fn block_align(&self) -> u32 {
        u32::from(self.channels) * u32::from(self.bits_per_sample / 8)
    }

    /// Bytes per second of audio.
    #[must_use]
    pub fn avg_bytes_per_sec(&self) -> u64 {
        u64::from(self.sample_rate) * u64::from(self.block_align())
    }

    fn sort_key(&self) -> (Encoding, u32, u16, u16, u16, ChannelMask) {
        (
            self.encoding,
            self.sample_rate,
            self.bits_per_sample,
            self.channels,
            self.valid_bits_per_sample,
            self.channel_mask,
        )
    }
}

impl PartialOrd for FormatDescriptor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FormatDescriptor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}ch {}/{}-bit {}Hz",
            self.encoding,
            self.channels,
            self.valid_bits_per_sample,
            self.bits_per_sample,
            self.sample_rate
        )?;
        if !self.channel_mask.is_empty() {
            write!(f, " mask {}", self.channel_mask)?;
        }
        Ok(())
    }
}

/// A format proposed by the host, before negotiation.
///
/// Unlike [`FormatDescriptor`], a request is not validated: it may ask for a
/// 20-bit container, more valid bits than the container holds, or a channel
/// mask that does not match its channel count. Negotiation decides what to do
/// with such requests.
///
/// A `valid_bits_per_sample` of zero means "the whole container".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatRequest {
    /// Requested sample encoding.
    pub encoding: Encoding,
    /// Requested channel count.
    pub channels: u16,
    /// Requested speaker assignment, or empty for "don't care".
    pub channel_mask: ChannelMask,
    /// Requested container width.
    pub bits_per_sample: u16,
    /// Requested significant bits.
    pub valid_bits_per_sample: u16,
    /// Requested frames per second.
    pub sample_rate: u32,
}

impl FormatRequest {
    /// Creates a request without a channel mask.
    #[must_use]
    pub fn new(
        encoding: Encoding,
        channels: u16,
        sample_rate: u32,
        bits_per_sample: u16,
        valid_bits_per_sample: u16,
    ) -> Self {
        Self {
            encoding,
            channels,
            channel_mask: ChannelMask::NONE,
            bits_per_sample,
            valid_bits_per_sample,
            sample_rate,
        }
    }

    /// Creates a PCM request with all bits valid.
    #[must_use]
    pub fn pcm(channels: u16, sample_rate: u32, bits_per_sample: u16) -> Self {
        Self::new(
            Encoding::Pcm,
            channels,
            sample_rate,
            bits_per_sample,
            bits_per_sample,
        )
    }

    /// Creates an IEEE float request with the given container width.
    #[must_use]
    pub fn float(channels: u16, sample_rate: u32, bits_per_sample: u16) -> Self {
        Self::new(
            Encoding::IeeeFloat,
            channels,
            sample_rate,
            bits_per_sample,
            bits_per_sample,
        )
    }

    /// Sets the requested speaker assignment.
    #[must_use]
    pub fn with_mask(mut self, mask: impl Into<ChannelMask>) -> Self {
        self.channel_mask = mask.into();
        self
    }

    /// Sets the requested significant bits.
    #[must_use]
    pub fn with_valid_bits(mut self, valid_bits_per_sample: u16) -> Self {
        self.valid_bits_per_sample = valid_bits_per_sample;
        self
    }

    /// Valid bits with the zero shorthand resolved.
    #[must_use]
    pub fn effective_valid_bits(&self) -> u16 {
        if self.valid_bits_per_sample == 0 {
            self.bits_per_sample
        } else {
            self.valid_bits_per_sample
        }
    }
}

impl From<FormatDescriptor> for FormatRequest {
    fn from(format: FormatDescriptor) -> Self {
        Self {
            encoding: format.encoding,
            channels: format.channels,
            channel_mask: format.channel_mask,
            bits_per_sample: format.bits_per_sample,
            valid_bits_per_sample: format.valid_bits_per_sample,
            sample_rate: format.sample_rate,
        }
    }
}

impl From<&FormatDescriptor> for FormatRequest {
    fn from(format: &FormatDescriptor) -> Self {
        Self::from(*format)
    }
}

impl fmt::Display for FormatRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}ch {}/{}-bit {}Hz",
            self.encoding,
            self.channels,
            self.effective_valid_bits(),
            self.bits_per_sample,
            self.sample_rate
        )
    }
}

//! Speaker channel masks.

use serde::{Deserialize, Serialize};

/// A speaker-position bitmask, one bit per channel.
///
/// Bit positions follow the usual WAVE extensible speaker layout
/// (front left = bit 0, front right = bit 1, front center = bit 2, ...).
/// An empty mask means "no particular speaker assignment".
///
/// # Example
///
/// ```
/// use pin_caps::ChannelMask;
///
/// assert_eq!(ChannelMask::canonical(2), ChannelMask::STEREO);
/// assert_eq!(ChannelMask::STEREO.count(), 2);
/// assert!(ChannelMask::NONE.is_empty());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChannelMask(u32);

impl ChannelMask {
    /// No speaker assignment.
    pub const NONE: Self = Self(0);
    /// Front left.
    pub const FRONT_LEFT: Self = Self(0x1);
    /// Front right.
    pub const FRONT_RIGHT: Self = Self(0x2);
    /// Front center.
    pub const FRONT_CENTER: Self = Self(0x4);
    /// Low-frequency effects.
    pub const LOW_FREQUENCY: Self = Self(0x8);
    /// Back left.
    pub const BACK_LEFT: Self = Self(0x10);
    /// Back right.
    pub const BACK_RIGHT: Self = Self(0x20);
    /// Front left of center.
    pub const FRONT_LEFT_OF_CENTER: Self = Self(0x40);
    /// Front right of center.
    pub const FRONT_RIGHT_OF_CENTER: Self = Self(0x80);

    /// Mono: front center only.
    pub const MONO: Self = Self::FRONT_CENTER;
    /// Stereo: front left and right.
    pub const STEREO: Self = Self(0x3);
    /// Quadraphonic: front and back pairs.
    pub const QUAD: Self = Self(0x33);
    /// 5.1 surround (back speakers).
    pub const SURROUND_5_1: Self = Self(0x3F);
    /// 7.1 surround (front-of-center speakers).
    pub const SURROUND_7_1: Self = Self(0xFF);

    /// Creates a mask from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Number of speaker positions set.
    #[must_use]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns true if no speaker position is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if this mask is empty or assigns exactly `channels` speakers.
    #[must_use]
    pub const fn fits(self, channels: u16) -> bool {
        self.is_empty() || self.count() == channels as u32
    }

    /// The standard layout for a channel count.
    ///
    /// Layouts without a named standard take the lowest `channels` bits.
    /// Counts above 32 have no bitmask layout and get an empty mask.
    #[must_use]
    pub const fn canonical(channels: u16) -> Self {
        match channels {
            0 => Self::NONE,
            1 => Self::MONO,
            2 => Self::STEREO,
            4 => Self::QUAD,
            6 => Self::SURROUND_5_1,
            8 => Self::SURROUND_7_1,
            32 => Self(u32::MAX),
            n if n > 32 => Self::NONE,
            n => Self((1u32 << n) - 1),
        }
    }
}

impl From<u32> for ChannelMask {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl std::fmt::Display for ChannelMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

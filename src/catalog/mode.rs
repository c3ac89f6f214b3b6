//! Signal processing modes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named signal-processing profile that selects a default format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    /// Unprocessed stream, no platform effects.
    Raw,
    /// The endpoint's general-purpose mode.
    Default,
    /// Voice calls.
    Communications,
    /// Speech recognition.
    Speech,
    /// Music and media playback or recording.
    Media,
    /// Movie playback.
    Movie,
    /// Notification sounds.
    Notification,
    /// Far-field speech capture.
    FarFieldSpeech,
}

impl ProcessingMode {
    /// Every mode, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Raw,
        Self::Default,
        Self::Communications,
        Self::Speech,
        Self::Media,
        Self::Movie,
        Self::Notification,
        Self::FarFieldSpeech,
    ];

    /// Lower-case name, as used in configuration files.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Default => "default",
            Self::Communications => "communications",
            Self::Speech => "speech",
            Self::Media => "media",
            Self::Movie => "movie",
            Self::Notification => "notification",
            Self::FarFieldSpeech => "far_field_speech",
        }
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

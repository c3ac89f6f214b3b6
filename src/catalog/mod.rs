//! Per-pin capability catalogs.
//!
//! A [`CapabilityCatalog`] is what one streaming pin advertises: ordered
//! capability ranges, ordered discrete "known-good" formats, and for each
//! [`ProcessingMode`] an ordered list of formats with at most one default.
//!
//! Catalogs are mutable only until they are sealed, either explicitly with
//! [`CapabilityCatalog::seal`] or implicitly by the first query. After that
//! they are plain shared data and may be read from any number of threads.

mod mode;

pub use mode::ProcessingMode;

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::format::{CapabilityRange, ChannelMask, Encoding, FormatDescriptor};
use crate::CapsError;

/// One discrete format row: `(encoding, channels, sample_rate, bits, valid_bits, channel_mask)`.
pub type DiscreteFormatRow = (Encoding, u16, u32, u16, u16, u32);

/// One range row: `(encoding, channels_min, channels_max, bits_min, bits_max, rate_min, rate_max)`.
pub type RangeRow = (Encoding, u16, u16, u16, u16, u32, u32);

/// One mode binding row: `(mode, index into the discrete formats, is_default)`.
pub type ModeRow = (ProcessingMode, usize, bool);

/// Stable handle to a discrete format inside one catalog.
///
/// Handles are only created by the catalog that owns the format, so a
/// binding can never point past the end of the format list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormatId(usize);

impl FormatId {
    /// Position of the format in declaration order.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A format advertised for a processing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModeBinding {
    /// The processing mode.
    pub mode: ProcessingMode,
    /// The advertised format.
    pub format: FormatId,
    /// Whether this is the mode's default format.
    pub is_default: bool,
}

/// The formats one streaming pin can negotiate.
///
/// # Example
///
/// ```
/// use pin_caps::{CapabilityCatalog, CapabilityRange, Encoding, FormatDescriptor, ProcessingMode};
///
/// let mut catalog = CapabilityCatalog::new();
/// catalog.add_range(CapabilityRange::new(Encoding::Pcm, 2..=2, 8..=32, 8000..=192_000)?)?;
/// let cd = FormatDescriptor::pcm(2, 44100, 16)?;
/// catalog.add_discrete_format(cd)?;
/// catalog.bind_mode_default(ProcessingMode::Raw, &cd, true)?;
/// catalog.seal()?;
///
/// assert_eq!(catalog.default_for_mode(ProcessingMode::Raw), Some(&cd));
/// assert!(catalog.add_discrete_format(cd).is_err());
/// # Ok::<(), pin_caps::CapsError>(())
/// ```
#[derive(Debug, Default)]
pub struct CapabilityCatalog {
    ranges: Vec<CapabilityRange>,
    formats: Vec<FormatDescriptor>,
    bindings: Vec<ModeBinding>,
    sealed: AtomicBool,
}

impl CapabilityCatalog {
    /// Creates an empty, unsealed catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds and seals a catalog from tables shaped like a driver's static arrays.
    ///
    /// Mode rows refer to formats by their index in `formats`. Nothing is
    /// returned unless every row is valid.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` for a malformed format or range row and
    /// `CatalogIntegrity` for a mode row that points past the format table or
    /// breaks the single-default rule.
    pub fn from_tables(
        formats: &[DiscreteFormatRow],
        ranges: &[RangeRow],
        modes: &[ModeRow],
    ) -> Result<Self, CapsError> {
        let mut catalog = Self::new();

        for &(encoding, cmin, cmax, bmin, bmax, rmin, rmax) in ranges {
            catalog.add_range(CapabilityRange::new(
                encoding,
                cmin..=cmax,
                bmin..=bmax,
                rmin..=rmax,
            )?)?;
        }

        let mut ids = Vec::with_capacity(formats.len());
        for &(encoding, channels, rate, bits, valid_bits, mask) in formats {
            let format = FormatDescriptor::new(
                encoding,
                channels,
                rate,
                bits,
                valid_bits,
                ChannelMask::from_bits(mask),
            )?;
            ids.push(catalog.add_discrete_format(format)?);
        }

        for &(mode, index, is_default) in modes {
            let id = ids.get(index).copied().ok_or_else(|| {
                CapsError::integrity(
                    mode,
                    format!(
                        "format index {index} is out of range ({} formats declared)",
                        ids.len()
                    ),
                )
            })?;
            catalog.bind_mode_format(mode, id, is_default)?;
        }

        catalog.seal()?;
        Ok(catalog)
    }

    fn ensure_unsealed(&self) -> Result<(), CapsError> {
        if self.sealed.load(Ordering::Acquire) {
            return Err(CapsError::CatalogSealed);
        }
        Ok(())
    }

    /// Appends a capability range. Earlier ranges take priority.
    ///
    /// # Errors
    ///
    /// Returns `CatalogSealed` once the catalog is sealed.
    pub fn add_range(&mut self, range: CapabilityRange) -> Result<(), CapsError> {
        self.ensure_unsealed()?;
        self.ranges.push(range);
        Ok(())
    }

    /// Appends a discrete format and returns its handle.
    ///
    /// Adding a format that is already advertised returns the existing handle.
    ///
    /// # Errors
    ///
    /// Returns `CatalogSealed` once the catalog is sealed.
    pub fn add_discrete_format(&mut self, format: FormatDescriptor) -> Result<FormatId, CapsError> {
        self.ensure_unsealed()?;
        if let Some(id) = self.find(&format) {
            tracing::debug!(%format, "discrete format already advertised");
            return Ok(id);
        }
        self.formats.push(format);
        Ok(FormatId(self.formats.len() - 1))
    }

    /// Advertises an already-declared format for a processing mode.
    ///
    /// # Errors
    ///
    /// Returns `CatalogIntegrity` if the format is not in the discrete format
    /// list, and `CatalogSealed` once the catalog is sealed.
    pub fn bind_mode_default(
        &mut self,
        mode: ProcessingMode,
        format: &FormatDescriptor,
        is_default: bool,
    ) -> Result<(), CapsError> {
        self.ensure_unsealed()?;
        let id = self.find(format).ok_or_else(|| {
            CapsError::integrity(mode, format!("format {format} is not a discrete format"))
        })?;
        self.bind_mode_format(mode, id, is_default)
    }

    /// Advertises the format behind `id` for a processing mode.
    ///
    /// # Errors
    ///
    /// Returns `CatalogIntegrity` if `id` does not belong to this catalog,
    /// the pair is already bound, or the mode already has a default; returns
    /// `CatalogSealed` once the catalog is sealed.
    pub fn bind_mode_format(
        &mut self,
        mode: ProcessingMode,
        id: FormatId,
        is_default: bool,
    ) -> Result<(), CapsError> {
        self.ensure_unsealed()?;
        let Some(format) = self.formats.get(id.0) else {
            return Err(CapsError::integrity(
                mode,
                format!("format handle {} does not exist", id.0),
            ));
        };
        if self
            .bindings
            .iter()
            .any(|b| b.mode == mode && b.format == id)
        {
            return Err(CapsError::integrity(
                mode,
                format!("format {format} is bound twice"),
            ));
        }
        if is_default {
            if let Some(existing) = self.bindings.iter().find(|b| b.mode == mode && b.is_default) {
                return Err(CapsError::integrity(
                    mode,
                    format!(
                        "format {format} flagged default but {} already is",
                        self.formats[existing.format.0]
                    ),
                ));
            }
        }
        self.bindings.push(ModeBinding {
            mode,
            format: id,
            is_default,
        });
        Ok(())
    }

    /// Verifies integrity and forbids further mutation.
    ///
    /// Sealing twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns `CatalogIntegrity` if a mode binding is dangling or a mode has
    /// more than one default.
    pub fn seal(&self) -> Result<(), CapsError> {
        self.verify_integrity()?;
        if !self.sealed.swap(true, Ordering::AcqRel) {
            tracing::debug!(
                ranges = self.ranges.len(),
                formats = self.formats.len(),
                bindings = self.bindings.len(),
                "capability catalog sealed"
            );
        }
        Ok(())
    }

    /// Returns true once the catalog no longer accepts mutation.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    // Mutators check integrity on every call, so a query can seal without
    // re-verifying. Once sealed, queries never write the flag again.
    fn seal_on_query(&self) {
        if !self.sealed.load(Ordering::Acquire) {
            self.sealed.store(true, Ordering::Release);
        }
    }

    fn verify_integrity(&self) -> Result<(), CapsError> {
        let mut defaults = HashSet::new();
        let mut pairs = HashSet::new();
        for binding in &self.bindings {
            if binding.format.0 >= self.formats.len() {
                return Err(CapsError::integrity(
                    binding.mode,
                    format!("format handle {} does not exist", binding.format.0),
                ));
            }
            if !pairs.insert((binding.mode, binding.format)) {
                return Err(CapsError::integrity(
                    binding.mode,
                    format!("format {} is bound twice", self.formats[binding.format.0]),
                ));
            }
            if binding.is_default && !defaults.insert(binding.mode) {
                return Err(CapsError::integrity(
                    binding.mode,
                    "more than one default format",
                ));
            }
        }
        Ok(())
    }

    /// Capability ranges in priority order.
    pub fn ranges(&self) -> &[CapabilityRange] {
        self.seal_on_query();
        &self.ranges
    }

    /// Discrete formats in declaration order.
    pub fn formats(&self) -> &[FormatDescriptor] {
        self.seal_on_query();
        &self.formats
    }

    /// The format behind a handle.
    pub fn format(&self, id: FormatId) -> Option<&FormatDescriptor> {
        self.seal_on_query();
        self.formats.get(id.0)
    }

    /// Handle of a discrete format equal to `format`.
    pub fn find(&self, format: &FormatDescriptor) -> Option<FormatId> {
        self.formats.iter().position(|f| f == format).map(FormatId)
    }

    /// All mode bindings in declaration order.
    pub fn bindings(&self) -> &[ModeBinding] {
        self.seal_on_query();
        &self.bindings
    }

    /// Modes with at least one binding, in order of first appearance.
    pub fn modes(&self) -> Vec<ProcessingMode> {
        let mut modes = Vec::new();
        for binding in self.bindings() {
            if !modes.contains(&binding.mode) {
                modes.push(binding.mode);
            }
        }
        modes
    }

    /// Formats advertised for a mode, with their default flag.
    pub fn formats_for_mode(
        &self,
        mode: ProcessingMode,
    ) -> impl Iterator<Item = (&FormatDescriptor, bool)> + '_ {
        self.bindings()
            .iter()
            .filter(move |b| b.mode == mode)
            .map(move |b| (&self.formats[b.format.0], b.is_default))
    }

    /// The default format of a mode.
    ///
    /// This is the entry flagged default, or the first format bound to the
    /// mode when none is flagged. `None` if the mode has no bindings.
    pub fn default_for_mode(&self, mode: ProcessingMode) -> Option<&FormatDescriptor> {
        let mut first = None;
        for (format, is_default) in self.formats_for_mode(mode) {
            if is_default {
                return Some(format);
            }
            first.get_or_insert(format);
        }
        first
    }

    /// Ranges with the given encoding, in priority order.
    pub fn ranges_for(&self, encoding: Encoding) -> impl Iterator<Item = &CapabilityRange> + '_ {
        self.ranges()
            .iter()
            .filter(move |range| range.encoding() == encoding)
    }

    /// Returns true if the catalog advertises neither ranges nor formats.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty() && self.formats.is_empty()
    }
}

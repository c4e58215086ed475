//! Slice stacks and binary mask stacks.
//!
//! A [`Volume`] is an ordered, non-empty sequence of equally sized [`GrayImage`]
//! slices. Slice order is acquisition (z) order. Public numbering of slices in
//! logs, errors and configuration is 1-based; the accessors here are 0-based.

use image::GrayImage;

use crate::error::ConfigError;

/// Sample value marking pixels inside a binary mask.
pub const IN_VALUE: u8 = 255;
/// Sample value marking pixels outside a binary mask.
pub const OUT_VALUE: u8 = 0;

/// An ordered stack of equally sized 8-bit slices.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    slices: Vec<GrayImage>,
}

impl Volume {
    /// Builds a volume, rejecting empty stacks and slices of differing size.
    pub fn new(slices: Vec<GrayImage>) -> Result<Self, ConfigError> {
        let first = slices.first().ok_or(ConfigError::EmptyVolume)?;
        let expected = first.dimensions();

        for (i, slice) in slices.iter().enumerate() {
            let found = slice.dimensions();
            if found.0 == 0 || found.1 == 0 {
                return Err(ConfigError::ZeroSizedSlice { slice: i + 1 });
            }
            if found != expected {
                return Err(ConfigError::SliceDimensions {
                    slice: i + 1,
                    expected,
                    found,
                });
            }
        }

        Ok(Self { slices })
    }

    /// Number of slices in the stack.
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// Always `false`; construction rejects empty stacks.
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn width(&self) -> u32 {
        self.slices[0].width()
    }

    pub fn height(&self) -> u32 {
        self.slices[0].height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.slices[0].dimensions()
    }

    /// The slice at 0-based `index`.
    pub fn slice(&self, index: usize) -> Option<&GrayImage> {
        self.slices.get(index)
    }

    pub fn slices(&self) -> &[GrayImage] {
        &self.slices
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GrayImage> {
        self.slices.iter()
    }

    pub fn into_slices(self) -> Vec<GrayImage> {
        self.slices
    }

    /// Checks that `other` has the same slice count and slice dimensions.
    pub fn ensure_same_shape(&self, other: &Volume) -> Result<(), ConfigError> {
        if self.len() != other.len() {
            return Err(ConfigError::SliceCount {
                expected: self.len(),
                found: other.len(),
            });
        }
        if self.dimensions() != other.dimensions() {
            return Err(ConfigError::SliceDimensions {
                slice: 1,
                expected: self.dimensions(),
                found: other.dimensions(),
            });
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Volume {
    type Item = &'a GrayImage;
    type IntoIter = std::slice::Iter<'a, GrayImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.slices.iter()
    }
}

/// A [`Volume`] whose samples are all [`IN_VALUE`] or [`OUT_VALUE`].
#[derive(Debug, Clone, PartialEq)]
pub struct MaskVolume(Volume);

impl MaskVolume {
    /// Wraps already binary slices, rejecting any other sample value.
    pub fn new(slices: Vec<GrayImage>) -> Result<Self, ConfigError> {
        let volume = Volume::new(slices)?;
        for (i, slice) in volume.iter().enumerate() {
            if let Some((x, y, pixel)) = slice
                .enumerate_pixels()
                .find(|(_, _, p)| !is_binary(p.0[0]))
            {
                return Err(ConfigError::NonBinaryMask {
                    slice: i + 1,
                    x,
                    y,
                    value: pixel.0[0],
                });
            }
        }
        Ok(Self(volume))
    }

    /// Converts arbitrary slices into a mask, `IN_VALUE` where a sample is at
    /// least the midpoint 128.
    pub fn binarize(slices: Vec<GrayImage>) -> Result<Self, ConfigError> {
        let slices = slices.into_iter().map(|s| binarize_slice(&s)).collect();
        Ok(Self(Volume::new(slices)?))
    }

    pub(crate) fn from_volume_unchecked(volume: Volume) -> Self {
        debug_assert!(
            volume
                .iter()
                .all(|s| s.pixels().all(|p| is_binary(p.0[0])))
        );
        Self(volume)
    }

    pub fn as_volume(&self) -> &Volume {
        &self.0
    }

    pub fn into_volume(self) -> Volume {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    pub fn slice(&self, index: usize) -> Option<&GrayImage> {
        self.0.slice(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GrayImage> {
        self.0.iter()
    }

    /// Number of `IN_VALUE` samples across all slices.
    pub fn foreground_count(&self) -> usize {
        self.0
            .iter()
            .map(|s| s.pixels().filter(|p| p.0[0] == IN_VALUE).count())
            .sum()
    }
}

fn is_binary(value: u8) -> bool {
    value == IN_VALUE || value == OUT_VALUE
}

pub(crate) fn binarize_slice(slice: &GrayImage) -> GrayImage {
    let mut out = slice.clone();
    for p in out.pixels_mut() {
        p.0[0] = if p.0[0] >= 128 { IN_VALUE } else { OUT_VALUE };
    }
    out
}

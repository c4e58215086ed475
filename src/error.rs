use std::fmt;

/// A configuration problem detected before any processing starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The source volume holds no slices.
    #[error("source volume is empty")]
    EmptyVolume,

    /// A slice has zero width or height.
    #[error("slice {slice} has zero width or height")]
    ZeroSizedSlice { slice: usize },

    /// A slice does not have the dimensions of the first slice.
    #[error("slice {slice} is {found:?}, expected {expected:?}")]
    SliceDimensions {
        slice: usize,
        expected: (u32, u32),
        found: (u32, u32),
    },

    /// Two volumes that must line up have different slice counts.
    #[error("volume holds {found} slices, expected {expected}")]
    SliceCount { expected: usize, found: usize },

    /// A mask sample is neither the in nor the out value.
    #[error("slice {slice} holds non-binary value {value} at ({x}, {y})")]
    NonBinaryMask { slice: usize, x: u32, y: u32, value: u8 },

    /// A lower bound exceeds its upper bound.
    #[error("{name}: minimum {min} exceeds maximum {max}")]
    InvertedRange { name: &'static str, min: f64, max: f64 },

    /// A scalar parameter is outside its domain.
    #[error("invalid value {value} for {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// The reference slice is not within `1..=slices`.
    #[error("reference slice {slice} is outside 1..={slices}")]
    ReferenceSlice { slice: usize, slices: usize },
}

/// A primitive operation rejected its input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PrimitiveError {
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("image dimensions {found:?} do not match {expected:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },
}

/// Pipeline stage names used in error reports and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    SeedFinding,
    ContourGrowth,
    MaskStack,
    MaskApplication,
    NestedSegmentation,
    Catalog,
    Morphometrics,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::SeedFinding => "seed finding",
            Stage::ContourGrowth => "contour growth",
            Stage::MaskStack => "mask stack building",
            Stage::MaskApplication => "mask application",
            Stage::NestedSegmentation => "nested segmentation",
            Stage::Catalog => "object catalog",
            Stage::Morphometrics => "object morphometrics",
        };
        f.write_str(name)
    }
}

/// Top-level error returned by the segmentation pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NucleusError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A primitive failed while processing `slice` (1-based) of `stage`.
    #[error("{stage} failed{}: {source}", SliceSuffix(.slice))]
    Stage {
        stage: Stage,
        slice: Option<usize>,
        #[source]
        source: PrimitiveError,
    },
}

impl NucleusError {
    pub(crate) fn stage(stage: Stage, slice: Option<usize>) -> impl FnOnce(PrimitiveError) -> Self {
        move |source| NucleusError::Stage {
            stage,
            slice,
            source,
        }
    }
}

struct SliceSuffix<'a>(&'a Option<usize>);

impl fmt::Display for SliceSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self.0 {
            Some(slice) => write!(f, " on slice {slice}"),
            None => Ok(()),
        }
    }
}

pub type Result<T, E = NucleusError> = std::result::Result<T, E>;

//! Segmentation of nuclei and nucleoli in 8-bit slice stacks, with per-object
//! morphometrics (volume, area, circularity) across the stack.
//!
//! [`pipeline::run`] takes a [`Volume`] and a [`SegmentationConfig`] and
//! returns the primary and nested masks, the masked intensity volumes and a
//! [`ResultsTable`] with one [`ObjectRecord`] per object. The stages are also
//! usable on their own; each is generic over the [`PrimitiveLibrary`] that
//! supplies the image-processing operations.
//!
//! Logging goes through the [`log`] facade. No logger is installed.

mod colors;
pub mod catalog;
pub mod config;
pub mod contours;
pub mod error;
pub mod growth;
pub mod mask_apply;
pub mod mask_stack;
pub mod morphometrics;
pub mod nested;
pub mod pipeline;
pub mod primitives;
pub mod rect;
pub mod render;
pub mod results;
pub mod seeds;
pub mod volume;

pub use config::SegmentationConfig;
pub use error::{ConfigError, NucleusError, PrimitiveError, Result, Stage};
pub use pipeline::{SegmentationOutput, run, run_with};
pub use primitives::{PrimitiveLibrary, StandardPrimitives};
pub use results::{ObjectRecord, ResultsTable, SliceStatistics};
pub use volume::{IN_VALUE, MaskVolume, OUT_VALUE, Volume};

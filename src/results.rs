//! Per-object measurement records and the results table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Measurements of one object on one slice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliceStatistics {
    pub area: f64,
    pub perimeter: f64,
    /// Not clamped; degenerate outlines may exceed 1.
    pub circularity: f64,
}

/// Aggregated measurements of one object across the whole stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub id: usize,
    /// Centroid on the reference slice.
    pub centroid: (f64, f64),
    /// 1-based slice the object was catalogued on.
    pub reference_slice: usize,
    pub volume: f64,
    pub max_area: f64,
    /// Mean over all slices, including those where the object is absent.
    pub avg_circularity: f64,
    pub max_circularity: f64,
    /// Never computed.
    pub density: Option<f64>,
    pub slices: Vec<SliceStatistics>,
}

/// Ordered object records of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsTable {
    records: Vec<ObjectRecord>,
}

impl ResultsTable {
    pub const COLUMNS: [&'static str; 8] = [
        "ID",
        "X",
        "Y",
        "Volume",
        "Max. Area",
        "Avg. Circularity",
        "Max. Circularity",
        "Density",
    ];

    pub fn new(records: Vec<ObjectRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ObjectRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ObjectRecord> {
        self.records.iter()
    }

    /// Record with the given `id`.
    pub fn get(&self, id: usize) -> Option<&ObjectRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn into_records(self) -> Vec<ObjectRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a ResultsTable {
    type Item = &'a ObjectRecord;
    type IntoIter = std::slice::Iter<'a, ObjectRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Tab separated, one header line and one line per record.
impl fmt::Display for ResultsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", Self::COLUMNS.join("\t"))?;
        for r in &self.records {
            writeln!(
                f,
                "{}\t{:.3}\t{:.3}\t{:.3}\t{:.3}\t{:.4}\t{:.4}\t{:.3}",
                r.id,
                r.centroid.0,
                r.centroid.1,
                r.volume,
                r.max_area,
                r.avg_circularity,
                r.max_circularity,
                r.density.unwrap_or(f64::NAN),
            )?;
        }
        Ok(())
    }
}

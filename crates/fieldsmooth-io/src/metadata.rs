use std::{collections::BTreeMap, fmt, str::FromStr};

use fieldsmooth_grid::AnyGrid;

use crate::error::IoError;

/// Free-form key/value annotations stored alongside a grid.
pub type GridMetadata = BTreeMap<String, String>;

/// The precision samples are stored with on disk.
///
/// In memory every grid read from a file is held in `f64`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    bincode::Encode,
    bincode::Decode,
)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    /// Single precision.
    F32,
    /// Double precision.
    #[default]
    F64,
}

impl DType {
    /// The lowercase name used on the command line and in JSON files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DType {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "f32" | "float32" => Ok(Self::F32),
            "f64" | "float64" => Ok(Self::F64),
            _ => Err(IoError::UnsupportedDType(s.to_string())),
        }
    }
}

/// A grid together with its storage precision and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct GridFile {
    /// The samples.
    pub grid: AnyGrid,
    /// The precision used when the grid is written.
    pub dtype: DType,
    /// Annotations carried through a smoothing run.
    pub metadata: GridMetadata,
}

impl GridFile {
    /// Wrap a grid with double precision storage and no metadata.
    pub fn new(grid: impl Into<AnyGrid>) -> Self {
        Self {
            grid: grid.into(),
            dtype: DType::F64,
            metadata: GridMetadata::new(),
        }
    }

    /// Set the storage precision.
    pub fn with_dtype(mut self, dtype: DType) -> Self {
        self.dtype = dtype;
        self
    }

    /// Add or replace one metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.metadata.insert(key.into(), value.to_string());
        self
    }

    /// The samples rounded to the storage precision, widened back to `f64`.
    pub(crate) fn stored_samples(&self) -> Vec<f64> {
        match self.dtype {
            DType::F64 => self.grid.as_slice().to_vec(),
            DType::F32 => self
                .grid
                .as_slice()
                .iter()
                .map(|&v| v as f32 as f64)
                .collect(),
        }
    }
}

use std::path::Path;

use fieldsmooth_grid::AnyGrid;
use serde::{Deserialize, Serialize};

use crate::{
    error::IoError,
    metadata::{DType, GridFile, GridMetadata},
};

#[derive(Serialize, Deserialize)]
struct JsonGrid {
    shape: Vec<usize>,
    spacing: Vec<f64>,
    #[serde(default)]
    dtype: DType,
    #[serde(default)]
    metadata: GridMetadata,
    data: Vec<f64>,
}

/// Parse a grid file from JSON text.
///
/// `dtype` and `metadata` are optional and default to `f64` and empty.
pub fn decode_grid_json(text: &str) -> Result<GridFile, IoError> {
    let parsed: JsonGrid = serde_json::from_str(text)?;
    let data = match parsed.dtype {
        DType::F64 => parsed.data,
        DType::F32 => parsed.data.into_iter().map(|v| v as f32 as f64).collect(),
    };
    Ok(GridFile {
        grid: AnyGrid::from_parts(&parsed.shape, &parsed.spacing, data)?,
        dtype: parsed.dtype,
        metadata: parsed.metadata,
    })
}

/// Render a grid file as pretty-printed JSON text.
pub fn encode_grid_json(file: &GridFile) -> Result<String, IoError> {
    let out = JsonGrid {
        shape: file.grid.shape(),
        spacing: file.grid.spacing(),
        dtype: file.dtype,
        metadata: file.metadata.clone(),
        data: file.stored_samples(),
    };
    Ok(serde_json::to_string_pretty(&out)?)
}

/// Reads a JSON grid file.
///
/// # Arguments
///
/// * `file_path` - The path to the `.json` file.
pub fn read_grid_json(file_path: impl AsRef<Path>) -> Result<GridFile, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let text = std::fs::read_to_string(file_path)?;
    decode_grid_json(&text)
}

/// Writes a grid to a JSON file.
///
/// # Arguments
///
/// * `file_path` - The path to the `.json` file.
/// * `file` - The grid, its storage precision and metadata.
pub fn write_grid_json(file_path: impl AsRef<Path>, file: &GridFile) -> Result<(), IoError> {
    let text = encode_grid_json(file)?;
    std::fs::write(file_path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_minimal() -> Result<(), IoError> {
        let file = decode_grid_json(r#"{"shape": [5], "spacing": [1.0], "data": [1, 0, 0, 0, 0]}"#)?;
        assert_eq!(file.dtype, DType::F64);
        assert!(file.metadata.is_empty());
        assert_eq!(file.grid.shape(), vec![5]);
        assert_eq!(file.grid.as_slice(), &[1.0, 0.0, 0.0, 0.0, 0.0]);
        Ok(())
    }

    #[test]
    fn test_encode_decode_3d() -> Result<(), IoError> {
        let text = r#"{
            "shape": [1, 2, 2],
            "spacing": [1.0, 0.25, 0.25],
            "dtype": "f32",
            "metadata": {"survey": "mock"},
            "data": [0.5, 1.5, 2.5, 3.5]
        }"#;
        let file = decode_grid_json(text)?;
        assert_eq!(file.grid.ndim(), 3);
        assert_eq!(file.dtype, DType::F32);
        assert_eq!(decode_grid_json(&encode_grid_json(&file)?)?, file);
        Ok(())
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(
            decode_grid_json(r#"{"shape": [3], "spacing": [1.0], "data": [1.0]}"#),
            Err(IoError::GridCreationError(_))
        ));
        assert!(matches!(
            decode_grid_json(r#"{"shape": [1, 1, 1, 1], "spacing": [1.0, 1.0, 1.0, 1.0], "data": [1.0]}"#),
            Err(IoError::GridCreationError(_))
        ));
        assert!(matches!(
            decode_grid_json(r#"{"shape": [2], "spacing": [1.0], "dtype": "u8", "data": [1.0, 2.0]}"#),
            Err(IoError::JsonError(_))
        ));
        assert!(matches!(decode_grid_json("not json"), Err(IoError::JsonError(_))));
        assert!(matches!(
            decode_grid_json(r#"{"shape": [4294967296, 4294967296, 1], "spacing": [1.0, 1.0, 1.0], "data": []}"#),
            Err(IoError::GridCreationError(fieldsmooth_grid::GridError::ShapeOverflow(_)))
        ));
    }
}

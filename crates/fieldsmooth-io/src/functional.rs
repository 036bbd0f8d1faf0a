use std::path::Path;

use crate::{
    binary::{read_grid_binary, write_grid_binary},
    error::IoError,
    json::{read_grid_json, write_grid_json},
    metadata::GridFile,
};

/// The on-disk formats understood by [`read_grid`] and [`write_grid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridFormat {
    /// bincode encoded, `.grid` extension.
    Binary,
    /// JSON text, `.json` extension.
    Json,
}

impl GridFormat {
    /// Pick the format from the file extension, case-insensitively.
    pub fn from_path(file_path: impl AsRef<Path>) -> Result<Self, IoError> {
        let file_path = file_path.as_ref();
        match file_path
            .extension()
            .map(|ext| ext.to_ascii_lowercase())
            .as_ref()
            .and_then(|ext| ext.to_str())
        {
            Some("grid") => Ok(Self::Binary),
            Some("json") => Ok(Self::Json),
            _ => Err(IoError::InvalidFileExtension(file_path.to_path_buf())),
        }
    }
}

/// Reads a grid file in any supported format.
///
/// # Arguments
///
/// * `file_path` - The path to a `.grid` or `.json` file.
///
/// # Returns
///
/// The grid with its samples in `f64`, the stored precision and the metadata.
///
/// # Example
///
/// ```no_run
/// use fieldsmooth_io::functional as F;
///
/// let file = F::read_grid("density.grid").unwrap();
/// println!("{:?}", file.grid.shape());
/// ```
pub fn read_grid(file_path: impl AsRef<Path>) -> Result<GridFile, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let file = match GridFormat::from_path(file_path)? {
        GridFormat::Binary => read_grid_binary(file_path)?,
        GridFormat::Json => read_grid_json(file_path)?,
    };
    log::debug!(
        "read {} grid {:?} from {}",
        file.dtype,
        file.grid.shape(),
        file_path.display()
    );
    Ok(file)
}

/// Writes a grid file, the format chosen by the extension.
///
/// # Arguments
///
/// * `file_path` - The path to a `.grid` or `.json` file.
/// * `file` - The grid, its storage precision and metadata.
pub fn write_grid(file_path: impl AsRef<Path>, file: &GridFile) -> Result<(), IoError> {
    let file_path = file_path.as_ref();
    match GridFormat::from_path(file_path)? {
        GridFormat::Binary => write_grid_binary(file_path, file)?,
        GridFormat::Json => write_grid_json(file_path, file)?,
    }
    log::debug!(
        "wrote {} grid {:?} to {}",
        file.dtype,
        file.grid.shape(),
        file_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() -> Result<(), IoError> {
        assert_eq!(GridFormat::from_path("a/b.grid")?, GridFormat::Binary);
        assert_eq!(GridFormat::from_path("field.JSON")?, GridFormat::Json);
        assert!(matches!(
            GridFormat::from_path("field.npy"),
            Err(IoError::InvalidFileExtension(_))
        ));
        assert!(matches!(
            GridFormat::from_path("field"),
            Err(IoError::InvalidFileExtension(_))
        ));
        Ok(())
    }

    #[test]
    fn test_read_missing_file() {
        assert!(matches!(
            read_grid("/definitely/not/here.grid"),
            Err(IoError::FileDoesNotExist(_))
        ));
    }
}

use std::path::Path;

use bincode::{Decode, Encode};
use fieldsmooth_grid::AnyGrid;

use crate::{
    error::IoError,
    metadata::{DType, GridFile, GridMetadata},
};

/// The magic bytes opening every binary grid file.
pub const GRID_MAGIC: [u8; 4] = *b"FSGD";

/// The binary layout version written by this crate.
pub const GRID_VERSION: u16 = 1;

/// Upper bound on the decoded size of the header (shape, spacing and metadata).
pub const MAX_HEADER_BYTES: usize = 1 << 20;

/// Header written before the samples.
///
/// The samples follow as a bincode `Vec<f32>` or `Vec<f64>`, as given by `dtype`.
#[derive(Encode, Decode)]
struct GridHeader {
    magic: [u8; 4],
    version: u16,
    dtype: DType,
    shape: Vec<u64>,
    spacing: Vec<f64>,
    metadata: GridMetadata,
}

/// Encode a grid file into its binary representation.
pub fn encode_grid_binary(file: &GridFile) -> Result<Vec<u8>, IoError> {
    let config = bincode::config::standard();
    let header = GridHeader {
        magic: GRID_MAGIC,
        version: GRID_VERSION,
        dtype: file.dtype,
        shape: file.grid.shape().iter().map(|&s| s as u64).collect(),
        spacing: file.grid.spacing(),
        metadata: file.metadata.clone(),
    };

    let mut bytes = bincode::encode_to_vec(&header, config)?;
    let payload = match file.dtype {
        DType::F32 => bincode::encode_to_vec(
            file.grid
                .as_slice()
                .iter()
                .map(|&v| v as f32)
                .collect::<Vec<_>>(),
            config,
        )?,
        DType::F64 => bincode::encode_to_vec(file.grid.as_slice(), config)?,
    };
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Decode the samples following the header, after checking that their declared
/// count matches the shape and fits in the remaining bytes.
fn decode_payload<T>(bytes: &[u8], numel: usize) -> Result<(Vec<T>, usize), IoError>
where
    T: Decode<()> + 'static,
{
    let config = bincode::config::standard();
    let (declared, _): (u64, usize) = bincode::decode_from_slice(bytes, config)?;
    if declared != numel as u64 {
        return Err(IoError::MalformedHeader(format!(
            "payload holds {declared} samples, shape needs {numel}"
        )));
    }
    // every sample takes at least size_of::<T>() bytes in the standard encoding
    if numel
        .checked_mul(std::mem::size_of::<T>())
        .map_or(true, |needed| needed > bytes.len())
    {
        return Err(IoError::MalformedHeader(format!(
            "payload of {numel} samples truncated to {} bytes",
            bytes.len()
        )));
    }
    Ok(bincode::decode_from_slice(bytes, config)?)
}

/// Decode a grid file from its binary representation.
///
/// # Errors
///
/// Fails on foreign magic bytes, an unknown version, an oversized header, trailing
/// bytes, or a header whose shape does not match the payload. Declared lengths are
/// checked before anything is allocated for them.
pub fn decode_grid_binary(bytes: &[u8]) -> Result<GridFile, IoError> {
    let (header, header_len): (GridHeader, usize) = bincode::decode_from_slice(
        bytes,
        bincode::config::standard().with_limit::<MAX_HEADER_BYTES>(),
    )?;

    if header.magic != GRID_MAGIC {
        return Err(IoError::InvalidMagic(header.magic));
    }
    if header.version != GRID_VERSION {
        return Err(IoError::UnsupportedVersion(header.version));
    }

    let shape = header
        .shape
        .iter()
        .map(|&s| {
            usize::try_from(s)
                .map_err(|_| IoError::MalformedHeader(format!("extent {s} does not fit in memory")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let numel = shape
        .iter()
        .try_fold(1usize, |acc, &extent| acc.checked_mul(extent))
        .ok_or_else(|| IoError::MalformedHeader(format!("shape {shape:?} is too large")))?;

    let rest = &bytes[header_len..];
    let (data, payload_len) = match header.dtype {
        DType::F32 => {
            let (values, len) = decode_payload::<f32>(rest, numel)?;
            (values.into_iter().map(f64::from).collect(), len)
        }
        DType::F64 => decode_payload::<f64>(rest, numel)?,
    };
    if payload_len != rest.len() {
        return Err(IoError::MalformedHeader(format!(
            "{} trailing bytes after the payload",
            rest.len() - payload_len
        )));
    }

    Ok(GridFile {
        grid: AnyGrid::from_parts(&shape, &header.spacing, data)?,
        dtype: header.dtype,
        metadata: header.metadata,
    })
}

/// Reads a binary grid file.
///
/// # Arguments
///
/// * `file_path` - The path to the `.grid` file.
///
/// # Returns
///
/// The grid with its samples widened to `f64`, the stored precision and the metadata.
pub fn read_grid_binary(file_path: impl AsRef<Path>) -> Result<GridFile, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let bytes = std::fs::read(file_path)?;
    decode_grid_binary(&bytes)
}

/// Writes a grid to a binary file.
///
/// # Arguments
///
/// * `file_path` - The path to the `.grid` file.
/// * `file` - The grid, its storage precision and metadata.
pub fn write_grid_binary(file_path: impl AsRef<Path>, file: &GridFile) -> Result<(), IoError> {
    // encode fully before touching the file
    let bytes = encode_grid_binary(file)?;
    std::fs::write(file_path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsmooth_grid::Grid;

    #[test]
    fn test_binary_keeps_everything() -> Result<(), IoError> {
        let grid = Grid::<f64, 2>::new([2, 3], [0.5, 2.0], vec![1.0, -2.0, 3.5, 0.0, 1e-3, 7.0])?;
        let file = GridFile::new(grid).with_metadata("origin", "test");

        let decoded = decode_grid_binary(&encode_grid_binary(&file)?)?;
        assert_eq!(decoded, file);
        Ok(())
    }

    #[test]
    fn test_binary_f32_payload() -> Result<(), IoError> {
        let grid = Grid::<f64, 1>::from_shape_vec([3], vec![0.1, 0.2, 0.3])?;
        let file = GridFile::new(grid).with_dtype(DType::F32);

        let f32_bytes = encode_grid_binary(&file)?;
        let f64_bytes = encode_grid_binary(&file.clone().with_dtype(DType::F64))?;
        assert!(f32_bytes.len() < f64_bytes.len());

        let decoded = decode_grid_binary(&f32_bytes)?;
        assert_eq!(decoded.dtype, DType::F32);
        assert_eq!(decoded.grid.as_slice(), file.stored_samples().as_slice());
        Ok(())
    }

    fn header(shape: Vec<u64>, version: u16) -> GridHeader {
        GridHeader {
            magic: GRID_MAGIC,
            version,
            dtype: DType::F64,
            shape,
            spacing: vec![1.0, 1.0],
            metadata: GridMetadata::new(),
        }
    }

    fn encode_parts(header: &GridHeader, values: &[f64]) -> Result<Vec<u8>, IoError> {
        let config = bincode::config::standard();
        let mut bytes = bincode::encode_to_vec(header, config)?;
        bytes.extend(bincode::encode_to_vec(values, config)?);
        Ok(bytes)
    }

    #[test]
    fn test_binary_rejects_foreign_data() -> Result<(), IoError> {
        let grid = Grid::<f64, 1>::from_shape_vec([2], vec![1.0, 2.0])?;
        let mut bytes = encode_grid_binary(&GridFile::new(grid))?;

        let mut wrong_magic = bytes.clone();
        wrong_magic[0] = b'X';
        assert!(matches!(
            decode_grid_binary(&wrong_magic),
            Err(IoError::InvalidMagic(_))
        ));

        bytes.push(0);
        assert!(matches!(
            decode_grid_binary(&bytes),
            Err(IoError::MalformedHeader(_))
        ));

        assert!(matches!(
            decode_grid_binary(&[]),
            Err(IoError::BinaryDecodeError(_))
        ));
        Ok(())
    }

    #[test]
    fn test_binary_rejects_huge_declared_lengths() -> Result<(), IoError> {
        let config = bincode::config::standard();

        // a shape vector claiming 2^40 extents in a handful of bytes
        let bytes = bincode::encode_to_vec((GRID_MAGIC, GRID_VERSION, DType::F64, 1u64 << 40), config)?;
        assert!(bytes.len() < 32);
        assert!(matches!(
            decode_grid_binary(&bytes),
            Err(IoError::BinaryDecodeError(_))
        ));

        // a valid header followed by a payload claiming 2^40 samples
        let mut bytes = bincode::encode_to_vec(header(vec![2, 2], GRID_VERSION), config)?;
        bytes.extend(bincode::encode_to_vec(1u64 << 40, config)?);
        assert!(matches!(
            decode_grid_binary(&bytes),
            Err(IoError::MalformedHeader(_))
        ));

        // a shape whose sample count matches the declared payload but not the file size
        let mut bytes = bincode::encode_to_vec(header(vec![1 << 20, 1 << 20], GRID_VERSION), config)?;
        bytes.extend(bincode::encode_to_vec(1u64 << 40, config)?);
        assert!(matches!(
            decode_grid_binary(&bytes),
            Err(IoError::MalformedHeader(_))
        ));

        // a shape whose sample count overflows
        let bytes = encode_parts(&header(vec![u64::MAX, 2], GRID_VERSION), &[])?;
        assert!(matches!(
            decode_grid_binary(&bytes),
            Err(IoError::MalformedHeader(_))
        ));
        Ok(())
    }

    #[test]
    fn test_binary_rejects_inconsistent_shape() -> Result<(), IoError> {
        let bytes = encode_parts(&header(vec![2, 2], GRID_VERSION), &[0.0; 3])?;
        assert!(matches!(
            decode_grid_binary(&bytes),
            Err(IoError::MalformedHeader(_))
        ));

        let bytes = encode_parts(&header(vec![2, 2], 7), &[0.0; 4])?;
        assert!(matches!(
            decode_grid_binary(&bytes),
            Err(IoError::UnsupportedVersion(7))
        ));

        let bytes = encode_parts(&header(vec![2, 0], GRID_VERSION), &[])?;
        assert!(matches!(
            decode_grid_binary(&bytes),
            Err(IoError::GridCreationError(_))
        ));
        Ok(())
    }
}

/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Invalid file extension.
    #[error("File does not have a valid extension, expected .grid or .json: {0}")]
    InvalidFileExtension(std::path::PathBuf),

    /// Error to open, read or write the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error to decode a binary grid.
    #[error("Failed to decode the binary grid. {0}")]
    BinaryDecodeError(#[from] bincode::error::DecodeError),

    /// Error to encode a binary grid.
    #[error("Failed to encode the binary grid. {0}")]
    BinaryEncodeError(#[from] bincode::error::EncodeError),

    /// Error to decode or encode a JSON grid.
    #[error("Failed to process the json grid. {0}")]
    JsonError(#[from] serde_json::Error),

    /// The binary file does not start with the grid magic bytes.
    #[error("Not a grid file: unexpected magic bytes {0:?}")]
    InvalidMagic([u8; 4]),

    /// The binary file was written by an unsupported format version.
    #[error("Unsupported grid format version {0}")]
    UnsupportedVersion(u16),

    /// The precision string is not recognized.
    #[error("Unsupported sample type '{0}', expected 'f32' or 'f64'")]
    UnsupportedDType(String),

    /// The header describes a layout that cannot be represented.
    #[error("Malformed grid header: {0}")]
    MalformedHeader(String),

    /// Error to create the grid from the decoded parts.
    #[error("Failed to create grid. {0}")]
    GridCreationError(#[from] fieldsmooth_grid::GridError),
}

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error types for the image-fingerprint library
#[derive(Error, Debug)]
pub enum Error {
    /// Pixel buffer does not describe a usable image
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Textual hash could not be parsed
    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    /// Two perceptual hashes of different bit lengths were compared
    #[error("Hash length mismatch: {left} bits vs {right} bits")]
    HashLengthMismatch { left: usize, right: usize },

    /// Upstream codec failed to decode the supplied bytes
    #[error("Decode error: {0}")]
    Decode(String),

    /// Upstream codec failed to encode a pixel buffer
    #[error("Encode error: {0}")]
    Encode(String),

    /// Unsupported image format
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Invalid configuration error
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// I/O operation error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

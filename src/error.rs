use qrcode::types::QrError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while resolving a context or rendering a tag.
#[derive(Error, Debug)]
pub enum Error {
    /// A key along a lookup path is absent.
    #[error("Could not find '{segment}' while looking up '{path}'")]
    MissingKey { path: String, segment: String },

    /// An intermediate value along a lookup path is not an object.
    #[error("Could not look up '{segment}' in '{path}', parent value is not an object")]
    NotTraversable { path: String, segment: String },

    /// The looked up value cannot be turned into text.
    #[error("Value at '{path}' is not a string, number or boolean")]
    NotScalar { path: String },

    #[error("URL of {len} bytes does not fit in a QR code")]
    CapacityExceeded { len: usize },

    #[error("Could not encode QR code: {0}")]
    Encoding(QrError),

    #[error("Could not rasterize QR code: {0}")]
    Rasterization(String),

    #[error("Could not encode QR image as PNG")]
    Image(#[from] image::ImageError),

    #[error("Invalid template syntax at byte {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("Unknown tag '{0}'")]
    UnknownTag(String),
}

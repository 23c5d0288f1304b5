use thiserror::Error;

/// Failure reported by a [`CodeEncoder`](crate::encoder::CodeEncoder).
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("nothing to encode")]
    EmptyInput,
    #[error("failed to build QR code: {0}")]
    Qr(String),
    #[error("encoder task failed: {0}")]
    Task(String),
}

/// Failure reported by a [`DocumentSink`](crate::sink::DocumentSink).
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("no page is open; start a page before drawing")]
    NoOpenPage,
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a sheet document could not be produced.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("invalid sheet layout: {0}")]
    InvalidLayout(String),
    #[error("card {index} is malformed: {reason}")]
    MalformedRecord { index: usize, reason: String },
    #[error("failed to encode code for card {index}: {source}")]
    Encode {
        index: usize,
        #[source]
        source: EncodeError,
    },
    #[error(transparent)]
    Sink(#[from] SinkError),
}

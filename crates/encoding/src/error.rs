/// Failure in one of the byte-level pipeline stages.
///
/// Any of these is fatal to the test case being encoded, but never to
/// the batch: the driver drops the case and moves on.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("CBOR serialization failed: {0}")]
    Cbor(String),

    #[error("COSE_Sign1 encoding failed: {0}")]
    Cose(String),

    #[error("ECDSA signing failed: {0}")]
    Sign(#[from] p256::ecdsa::Error),

    #[error("compression failed: {0}")]
    Compression(#[from] std::io::Error),
}

/// Failure while rendering the QR stage.
///
/// Kept separate from [`EncodingError`] because the visual stage is
/// optional and sits outside the byte-exact part of the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum VisualEncodingError {
    #[error("QR code construction failed: {0}")]
    Qr(String),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),
}

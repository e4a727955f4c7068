//! Error types for pass building, packaging, and the web-service router.
//!
//! This module defines the [`enum@Error`] enum covering all failure cases:
//! I/O, serialization, archive writing, certificate handling, signing, and
//! web-service contract violations.
//!
//! # See Also
//!
//! - [`crate::Result`] - Convenience type alias using this error

use thiserror::Error;

/// Error type for pass packaging operations.
///
/// All public fallible functions in this crate return [`crate::Result<T>`],
/// which uses this error type. Match on variants to handle specific failure
/// cases.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Occurs when reading a stream-backed package entry or writing the
    /// output archive.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or parsing failed.
    ///
    /// Raised when the pass document or a web-service payload cannot be
    /// rendered or parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ZIP archive operation failed.
    ///
    /// Occurs while writing the final `.pkpass` container.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A package entry with the same file name was already registered.
    ///
    /// Entry names inside a pass package must be unique; see
    /// [`crate::PassPackage::add_file`].
    #[error("Duplicate package entry: {0}")]
    DuplicateEntry(String),

    /// Invalid or malformed certificate.
    ///
    /// The provided certificate or private key could not be parsed. See
    /// [`crate::SigningCredentials`] for valid formats.
    #[error("Invalid certificate: {0}")]
    Certificate(String),

    /// The signing certificate has no private key.
    ///
    /// A PKCS#12 container without a key bag cannot be used to sign a pass.
    #[error("Signing certificate has no private key")]
    MissingPrivateKey,

    /// CMS signature generation failed.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// The external pass service violated its contract with the router.
    ///
    /// For example, returning status 200 from a pass fetch without pass
    /// content. This indicates a broken collaborator, not a bad request.
    #[error("Web service contract violation: {0}")]
    ServiceContract(String),

    /// HTTP response construction failed.
    #[error("HTTP error: {0}")]
    Http(#[from] http::Error),
}

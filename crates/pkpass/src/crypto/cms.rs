//! Detached CMS (PKCS#7) signature generation.
//!
//! Produces the `signature` entry of a pass package: a `SignedData`
//! structure over the manifest bytes with detached content, the leaf and
//! intermediate certificates attached, and a signing-time authenticated
//! attribute. Apart from that timestamp the output is deterministic for a
//! given manifest and credential set.

use crate::crypto::SigningCredentials;
use crate::{Error, Result};
use cryptographic_message_syntax::{SignedDataBuilder, SignerBuilder};

/// Signs `content` with the given credentials, returning the DER-encoded
/// CMS `SignedData` blob.
///
/// The content itself is not embedded in the structure, only its digest and
/// the signature over it; a verifier must be handed the content separately.
///
/// # Errors
///
/// Returns [`Error::Signing`] if the CMS structure cannot be built, for
/// example when the private key and certificate do not match.
pub fn sign_detached(content: &[u8], credentials: &SigningCredentials) -> Result<Vec<u8>> {
    let signer = SignerBuilder::new(&credentials.signing_key, credentials.certificate.clone());

    // content_external keeps the manifest out of the structure; the builder
    // still digests it and adds the message-digest and signing-time signed
    // attributes.
    let mut builder = SignedDataBuilder::default()
        .content_external(content.to_vec())
        .signer(signer)
        .certificate(credentials.certificate.clone());

    for certificate in &credentials.chain {
        builder = builder.certificate(certificate.clone());
    }

    builder
        .build_der()
        .map_err(|e| Error::Signing(format!("Failed to build CMS signature: {e}")))
}

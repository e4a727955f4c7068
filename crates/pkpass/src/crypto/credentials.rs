//! Certificate and private key handling for pass signing.
//!
//! Loads signing credentials from PEM-encoded files or PKCS#12 (.p12)
//! containers. A credential always couples the pass type certificate with
//! its private key; the Apple WWDR intermediate certificate is loaded
//! separately and attached with
//! [`with_intermediate`](SigningCredentials::with_intermediate).
//!
//! # Supported Formats
//!
//! - **PEM**: Separate certificate and PKCS#8 private key files
//! - **PKCS#12**: Combined certificate and key in a password-protected
//!   container, as exported from Keychain Access
//!
//! # Examples
//!
//! ```no_run
//! use pkpass::SigningCredentials;
//!
//! let p12_data = std::fs::read("pass.p12")?;
//! let wwdr = std::fs::read("AppleWWDRCA.cer")?;
//! let credentials = SigningCredentials::from_p12(&p12_data, "password")?
//!     .with_intermediate_bytes(&wwdr)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::{Error, Result};
use x509_certificate::{CapturedX509Certificate, InMemorySigningKeyPair};

/// Pass signing credentials: leaf certificate, private key, and the
/// intermediate certificates chaining it to the Apple root.
///
/// # Security
///
/// The private key contained in this struct is sensitive; avoid logging or
/// exposing instances.
pub struct SigningCredentials {
    pub(crate) certificate: CapturedX509Certificate,
    pub(crate) signing_key: InMemorySigningKeyPair,
    pub(crate) chain: Vec<CapturedX509Certificate>,
}

impl SigningCredentials {
    /// Builds credentials from already-parsed material.
    pub fn new(certificate: CapturedX509Certificate, signing_key: InMemorySigningKeyPair) -> Self {
        Self {
            certificate,
            signing_key,
            chain: Vec::new(),
        }
    }

    /// Attaches an intermediate authority certificate to the chain.
    pub fn with_intermediate(mut self, certificate: CapturedX509Certificate) -> Self {
        self.chain.push(certificate);
        self
    }

    /// Attaches an intermediate certificate from PEM or DER bytes.
    ///
    /// Tries PEM first, then falls back to DER, matching how Apple
    /// distributes the WWDR certificate (`.cer`, DER-encoded).
    pub fn with_intermediate_bytes(self, data: &[u8]) -> Result<Self> {
        let certificate = CapturedX509Certificate::from_pem(data)
            .or_else(|_| CapturedX509Certificate::from_der(data.to_vec()))
            .map_err(|e| Error::Certificate(format!("Failed to parse intermediate: {e}")))?;
        Ok(self.with_intermediate(certificate))
    }

    /// Loads credentials from PEM-encoded certificate and PKCS#8 private key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Certificate`] if either input is malformed or the
    /// key is not valid PKCS#8.
    pub fn from_pem(cert_pem: &[u8], key_pem: &[u8]) -> Result<Self> {
        let certificate = CapturedX509Certificate::from_pem(cert_pem)
            .map_err(|e| Error::Certificate(format!("Failed to parse certificate PEM: {e}")))?;

        let signing_key = InMemorySigningKeyPair::from_pkcs8_pem(key_pem)
            .map_err(|e| Error::Certificate(format!("Failed to parse private key PEM: {e}")))?;

        Ok(Self::new(certificate, signing_key))
    }

    /// Loads credentials from a PKCS#12 (.p12) container.
    ///
    /// The first certificate bag is taken as the signing (leaf) certificate;
    /// any remaining certificates become the intermediate chain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Certificate`] if the container is malformed or the
    /// password is wrong, and [`Error::MissingPrivateKey`] if the container
    /// holds no key bag.
    pub fn from_p12(p12_data: &[u8], password: &str) -> Result<Self> {
        let pfx = p12::PFX::parse(p12_data)
            .map_err(|e| Error::Certificate(format!("Failed to parse PKCS#12: {e:?}")))?;

        let keys = pfx
            .key_bags(password)
            .map_err(|e| Error::Certificate(format!("Failed to extract keys from PKCS#12: {e:?}")))?;

        let certs = pfx
            .cert_x509_bags(password)
            .map_err(|e| Error::Certificate(format!("Failed to extract certs from PKCS#12: {e:?}")))?;

        if certs.is_empty() {
            return Err(Error::Certificate("No certificate in PKCS#12".into()));
        }
        if keys.is_empty() {
            return Err(Error::MissingPrivateKey);
        }

        let certificate = CapturedX509Certificate::from_der(certs[0].clone())
            .map_err(|e| Error::Certificate(format!("Failed to parse certificate DER: {e}")))?;

        let signing_key = InMemorySigningKeyPair::from_pkcs8_der(&keys[0])
            .map_err(|e| Error::Certificate(format!("Failed to parse private key DER: {e}")))?;

        let chain: Vec<CapturedX509Certificate> = certs
            .iter()
            .skip(1)
            .filter_map(|der| CapturedX509Certificate::from_der(der.clone()).ok())
            .collect();

        Ok(Self {
            certificate,
            signing_key,
            chain,
        })
    }

    /// The signing (leaf) certificate.
    pub fn certificate(&self) -> &CapturedX509Certificate {
        &self.certificate
    }

    /// The intermediate certificate chain.
    pub fn chain(&self) -> &[CapturedX509Certificate] {
        &self.chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credentials() -> SigningCredentials {
        let certified = rcgen::generate_simple_self_signed(["pass.test".to_string()]).unwrap();
        let certificate =
            CapturedX509Certificate::from_der(certified.cert.der().to_vec()).unwrap();
        let signing_key =
            InMemorySigningKeyPair::from_pkcs8_der(&certified.key_pair.serialize_der()).unwrap();
        SigningCredentials::new(certificate, signing_key)
    }

    #[test]
    fn test_new_from_generated_material() {
        let credentials = test_credentials();
        assert!(credentials.chain().is_empty());
    }

    #[test]
    fn test_with_intermediate_extends_chain() {
        let other = rcgen::generate_simple_self_signed(["ca.test".to_string()]).unwrap();
        let intermediate =
            CapturedX509Certificate::from_der(other.cert.der().to_vec()).unwrap();
        let credentials = test_credentials().with_intermediate(intermediate);
        assert_eq!(credentials.chain().len(), 1);
    }

    #[test]
    fn test_with_intermediate_bytes_accepts_der_and_pem() {
        let other = rcgen::generate_simple_self_signed(["ca.test".to_string()]).unwrap();
        let der = other.cert.der().to_vec();
        let pem = other.cert.pem();

        let from_der = test_credentials().with_intermediate_bytes(&der).unwrap();
        assert_eq!(from_der.chain().len(), 1);

        let from_pem = test_credentials().with_intermediate_bytes(pem.as_bytes()).unwrap();
        assert_eq!(from_pem.chain().len(), 1);
    }

    #[test]
    fn test_from_pem_invalid_inputs() {
        let result = SigningCredentials::from_pem(b"not a cert", b"not a key");
        assert!(matches!(result, Err(Error::Certificate(_))));
    }

    #[test]
    fn test_from_pem_valid_cert_invalid_key() {
        let certified = rcgen::generate_simple_self_signed(["pass.test".to_string()]).unwrap();
        let pem = certified.cert.pem();
        let result = SigningCredentials::from_pem(pem.as_bytes(), b"garbage");
        assert!(matches!(result, Err(Error::Certificate(_))));
    }

    #[test]
    fn test_from_p12_invalid_data() {
        let result = SigningCredentials::from_p12(b"not valid p12 data", "password");
        assert!(matches!(result, Err(Error::Certificate(_))));
    }
}
